//! Lexical scopes for the semantic analyzer.
//!
//! Scopes are strictly nested, so a flat stack of depth-tagged bindings
//! is all the structure needed: entering a scope bumps the depth,
//! leaving it pops every binding tagged with that depth. Lookup walks
//! the stack back to front, which makes inner bindings shadow outer
//! ones for free.

use anemo_par::ast::Type;

/// A variable visible at some point of the checked procedure.
#[derive(Clone, Debug)]
pub struct VarBinding {
    pub name: String,
    pub ty: Type,
    pub mutable: bool,
    depth: u32,
}

/// The scope stack for one procedure body.
#[derive(Debug, Default)]
pub struct ScopeStack {
    vars: Vec<VarBinding>,
    depth: u32,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything; used when the analyzer moves to the next
    /// procedure.
    pub fn reset(&mut self) {
        self.vars.clear();
        self.depth = 0;
    }

    pub fn enter(&mut self) {
        self.depth += 1;
    }

    pub fn exit(&mut self) {
        while self
            .vars
            .last()
            .is_some_and(|v| v.depth == self.depth)
        {
            self.vars.pop();
        }
        self.depth -= 1;
    }

    /// Declares a name at the current depth. Fails (returns `false`)
    /// when the name already exists at this exact depth; shadowing an
    /// outer depth is allowed.
    pub fn define(&mut self, name: &str, ty: Type, mutable: bool) -> bool {
        let clash = self
            .vars
            .iter()
            .rev()
            .take_while(|v| v.depth == self.depth)
            .any(|v| v.name == name);
        if clash {
            return false;
        }

        self.vars.push(VarBinding {
            name: name.to_string(),
            ty,
            mutable,
            depth: self.depth,
        });
        true
    }

    /// The nearest enclosing binding for `name`, if any.
    pub fn lookup(&self, name: &str) -> Option<&VarBinding> {
        self.vars.iter().rev().find(|v| v.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_and_lookup() {
        let mut scope = ScopeStack::new();
        scope.enter();
        assert!(scope.define("x", Type::Int, false));

        let x = scope.lookup("x").unwrap();
        assert_eq!(x.ty, Type::Int);
        assert!(!x.mutable);
        assert!(scope.lookup("y").is_none());
    }

    #[test]
    fn test_redeclaration_at_same_depth_fails() {
        let mut scope = ScopeStack::new();
        scope.enter();
        assert!(scope.define("x", Type::Int, false));
        assert!(!scope.define("x", Type::Bool, true));
    }

    #[test]
    fn test_shadowing_outer_depth_is_allowed() {
        let mut scope = ScopeStack::new();
        scope.enter();
        assert!(scope.define("x", Type::Int, false));

        scope.enter();
        assert!(scope.define("x", Type::Text, true));
        assert_eq!(scope.lookup("x").unwrap().ty, Type::Text);

        scope.exit();
        assert_eq!(scope.lookup("x").unwrap().ty, Type::Int);
    }

    #[test]
    fn test_exit_drops_only_the_innermost_scope() {
        let mut scope = ScopeStack::new();
        scope.enter();
        scope.define("a", Type::Int, false);
        scope.enter();
        scope.define("b", Type::Int, false);
        scope.exit();

        assert!(scope.lookup("a").is_some());
        assert!(scope.lookup("b").is_none());
    }

    #[test]
    fn test_sibling_scopes_may_reuse_names() {
        let mut scope = ScopeStack::new();
        scope.enter();
        scope.enter();
        assert!(scope.define("tmp", Type::Int, false));
        scope.exit();
        scope.enter();
        assert!(scope.define("tmp", Type::Bool, false));
        scope.exit();
    }
}

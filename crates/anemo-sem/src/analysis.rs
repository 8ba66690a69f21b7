//! The semantic analyzer proper.

use anemo_par::ast::{
    BinaryOp, Block, Expr, ExprKind, Function, Program, Stmt, StmtKind, Type, UnaryOp,
};
use anemo_util::{target, Diagnostic, Span};
use indexmap::IndexMap;

use crate::scope::ScopeStack;

/// A collected procedure signature.
struct FnSig {
    params: Vec<Type>,
    ret: Type,
}

/// Checks the whole program, annotating every expression with its
/// inferred type. The first violation aborts.
pub fn check_program(file: &str, program: &mut Program) -> Result<(), Diagnostic> {
    let mut fns: IndexMap<String, FnSig> = IndexMap::new();
    for f in &program.functions {
        if fns.contains_key(&f.name) {
            return Err(Diagnostic::at(
                file,
                f.span,
                format!("duplicate glyph '{}'", f.name),
            ));
        }
        fns.insert(
            f.name.clone(),
            FnSig {
                params: f.params.iter().map(|p| p.ty).collect(),
                ret: f.return_type,
            },
        );
    }

    match fns.get("main") {
        None => return Err(Diagnostic::fatal("program must define glyph main")),
        Some(main) => {
            if !main.params.is_empty() {
                return Err(Diagnostic::fatal("glyph main must have [] parameter list"));
            }
            if main.ret != Type::Int {
                return Err(Diagnostic::fatal("glyph main must yield ember"));
            }
        }
    }

    let mut analyzer = Analyzer {
        file,
        fns,
        scope: ScopeStack::new(),
        current_ret: Type::Unit,
        saw_offer: false,
        loop_depth: 0,
    };
    for f in &mut program.functions {
        analyzer.check_function(f)?;
    }
    Ok(())
}

struct Analyzer<'a> {
    file: &'a str,
    fns: IndexMap<String, FnSig>,
    scope: ScopeStack,
    /// Declared return type of the procedure being checked.
    current_ret: Type,
    /// Whether the procedure being checked contains any offer.
    saw_offer: bool,
    loop_depth: u32,
}

impl<'a> Analyzer<'a> {
    fn error(&self, span: Span, message: impl Into<String>) -> Diagnostic {
        Diagnostic::at(self.file, span, message)
    }

    fn check_function(&mut self, f: &mut Function) -> Result<(), Diagnostic> {
        self.scope.reset();
        self.current_ret = f.return_type;
        self.saw_offer = false;
        self.loop_depth = 0;

        self.scope.enter();
        for p in &f.params {
            if !self.scope.define(&p.name, p.ty, false) {
                return Err(self.error(
                    p.span,
                    format!("'{}' already declared in this scope", p.name),
                ));
            }
        }
        self.check_block(&mut f.body)?;
        self.scope.exit();

        if f.return_type != Type::Unit && !self.saw_offer {
            return Err(self.error(
                f.span,
                format!(
                    "glyph '{}' yields {} but has no offer",
                    f.name,
                    f.return_type.name()
                ),
            ));
        }
        Ok(())
    }

    fn check_block(&mut self, block: &mut Block) -> Result<(), Diagnostic> {
        for stmt in &mut block.stmts {
            self.check_stmt(stmt)?;
        }
        Ok(())
    }

    fn check_stmt(&mut self, stmt: &mut Stmt) -> Result<(), Diagnostic> {
        let span = stmt.span;
        match &mut stmt.kind {
            StmtKind::Bind { name, value } => {
                let ty = self.check_expr(value)?;
                if !self.scope.define(name, ty, false) {
                    return Err(
                        self.error(span, format!("'{name}' already declared in this scope"))
                    );
                }
            }
            StmtKind::Morph { name, value } => {
                let ty = self.check_expr(value)?;
                if !self.scope.define(name, ty, true) {
                    return Err(
                        self.error(span, format!("'{name}' already declared in this scope"))
                    );
                }
            }
            StmtKind::Shift { name, value } => {
                let (var_ty, mutable) = match self.scope.lookup(name) {
                    Some(v) => (v.ty, v.mutable),
                    None => {
                        return Err(self.error(span, format!("unknown symbol '{name}'")));
                    }
                };
                if !mutable {
                    return Err(
                        self.error(span, format!("cannot shift immutable symbol '{name}'"))
                    );
                }
                let ty = self.check_expr(value)?;
                if ty != var_ty {
                    return Err(self.error(
                        span,
                        format!(
                            "shift type mismatch for '{name}': expected {}, got {}",
                            var_ty.name(),
                            ty.name()
                        ),
                    ));
                }
            }
            StmtKind::Fork {
                cond,
                then_block,
                else_block,
            } => {
                if self.check_expr(cond)? != Type::Bool {
                    return Err(self.error(span, "fork condition must be pulse"));
                }
                self.scope.enter();
                self.check_block(then_block)?;
                self.scope.exit();

                if let Some(else_block) = else_block {
                    self.scope.enter();
                    self.check_block(else_block)?;
                    self.scope.exit();
                }
            }
            StmtKind::Cycle { cond, body } => {
                if self.check_expr(cond)? != Type::Bool {
                    return Err(self.error(span, "cycle condition must be pulse"));
                }
                self.loop_depth += 1;
                self.scope.enter();
                self.check_block(body)?;
                self.scope.exit();
                self.loop_depth -= 1;
            }
            StmtKind::Break => {
                if self.loop_depth == 0 {
                    return Err(self.error(span, "break can only be used inside cycle"));
                }
            }
            StmtKind::Continue => {
                if self.loop_depth == 0 {
                    return Err(self.error(span, "continue can only be used inside cycle"));
                }
            }
            StmtKind::Offer { value } => {
                self.saw_offer = true;
                if self.current_ret == Type::Unit {
                    if value.is_some() {
                        return Err(self.error(span, "mist glyph cannot offer a value"));
                    }
                } else {
                    let Some(value) = value else {
                        return Err(self.error(
                            span,
                            format!("glyph must offer {} value", self.current_ret.name()),
                        ));
                    };
                    let ty = self.check_expr(value)?;
                    if ty != self.current_ret {
                        return Err(self.error(
                            span,
                            format!(
                                "offer mismatch: glyph yields {} but offered {}",
                                self.current_ret.name(),
                                ty.name()
                            ),
                        ));
                    }
                }
            }
            StmtKind::Chant { value } => {
                let ty = self.check_expr(value)?;
                if !matches!(ty, Type::Int | Type::Bool | Type::Text) {
                    return Err(self.error(span, "chant supports ember|pulse|text"));
                }
            }
            StmtKind::Expr { value } => {
                self.check_expr(value)?;
            }
        }
        Ok(())
    }

    fn check_expr(&mut self, e: &mut Expr) -> Result<Type, Diagnostic> {
        let span = e.span;
        let ty = match &mut e.kind {
            ExprKind::Int(_) => Type::Int,
            ExprKind::Bool(_) => Type::Bool,
            ExprKind::Str(_) => Type::Text,
            ExprKind::Var(name) => match self.scope.lookup(name) {
                Some(v) => v.ty,
                None => {
                    return Err(self.error(span, format!("unknown symbol '{name}'")));
                }
            },
            ExprKind::Call { .. } => self.check_call(e)?,
            ExprKind::Unary { op, operand } => {
                let op = *op;
                let inner = self.check_expr(operand)?;
                match op {
                    UnaryOp::Neg => {
                        self.require_type(operand, inner, Type::Int, "negation")?;
                        Type::Int
                    }
                    UnaryOp::Flip => {
                        self.require_type(operand, inner, Type::Bool, "flip")?;
                        Type::Bool
                    }
                }
            }
            ExprKind::Binary { op, left, right } => {
                let op = *op;
                let lt = self.check_expr(left)?;
                let rt = self.check_expr(right)?;
                match op {
                    BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
                        if lt != Type::Int || rt != Type::Int {
                            return Err(self.error(span, "arithmetic needs ember operands"));
                        }
                        Type::Int
                    }
                    BinaryOp::Both | BinaryOp::Either => {
                        if lt != Type::Bool || rt != Type::Bool {
                            return Err(self.error(span, "boolean chaining needs pulse operands"));
                        }
                        Type::Bool
                    }
                    BinaryOp::Less | BinaryOp::More | BinaryOp::AtMost | BinaryOp::AtLeast => {
                        if lt != Type::Int || rt != Type::Int {
                            return Err(self.error(span, "comparison needs ember operands"));
                        }
                        Type::Bool
                    }
                    BinaryOp::Same | BinaryOp::Diff => {
                        if lt != rt {
                            return Err(self.error(span, "same/diff operands must share type"));
                        }
                        Type::Bool
                    }
                }
            }
        };

        e.inferred_type = ty;
        Ok(ty)
    }

    fn check_call(&mut self, e: &mut Expr) -> Result<Type, Diagnostic> {
        let span = e.span;
        let ExprKind::Call { name, args } = &mut e.kind else {
            unreachable!("check_call on a non-call expression");
        };

        let (param_types, ret) = match self.fns.get(name.as_str()) {
            Some(sig) => (sig.params.clone(), sig.ret),
            None => {
                return Err(self.error(span, format!("unknown glyph '{name}'")));
            }
        };

        if args.len() > target::MAX_CALL_ARGS {
            return Err(self.error(
                span,
                format!(
                    "glyph calls currently support at most {} arguments on this target",
                    target::MAX_CALL_ARGS
                ),
            ));
        }

        if param_types.len() != args.len() {
            return Err(self.error(
                span,
                format!(
                    "glyph '{}' expects {} arguments, got {}",
                    name,
                    param_types.len(),
                    args.len()
                ),
            ));
        }

        let name = name.clone();
        for (i, (arg, expected)) in args.iter_mut().zip(param_types.iter()).enumerate() {
            let got = self.check_expr(arg)?;
            if got != *expected {
                return Err(self.error(
                    arg.span,
                    format!(
                        "argument {} of '{}' expects {}, got {}",
                        i + 1,
                        name,
                        expected.name(),
                        got.name()
                    ),
                ));
            }
        }

        Ok(ret)
    }

    fn require_type(
        &self,
        operand: &Expr,
        got: Type,
        expected: Type,
        what: &str,
    ) -> Result<(), Diagnostic> {
        if got != expected {
            return Err(self.error(
                operand.span,
                format!("{what} expects {}, got {}", expected.name(), got.name()),
            ));
        }
        Ok(())
    }
}

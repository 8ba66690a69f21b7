//! AST to IR lowering.
//!
//! A straight post-order traversal with no optimization: every
//! expression ends by writing its value into a fresh temporary and
//! hands that temporary's index upward. The builder keeps its own
//! scope stack mapping names to variable slot indices; it is parallel
//! to, and independent from, the semantic analyzer's scope stack,
//! because this one answers "which slot" while that one answered
//! "which type".
//!
//! Failures here are internal errors: every construct that reaches the
//! builder already passed the semantic pass.

use anemo_par::ast::{Block, Expr, ExprKind, Function, Program, Stmt, StmtKind, Type};
use anemo_util::{target, Diagnostic, Span};

use crate::ir::{Instr, InstrKind, IrFunction, IrProgram, IrVar, LabelId, StringTable, Temp};

/// Lowers a semantically verified program.
pub fn lower_program(program: &Program) -> Result<IrProgram, Diagnostic> {
    let mut out = IrProgram::default();
    for f in &program.functions {
        let lowered = FunctionLowering::new(&mut out.strings).lower(f)?;
        out.functions.push(lowered);
    }
    Ok(out)
}

/// A name visible to the builder, resolved to its stack slot.
struct SlotBinding {
    name: String,
    slot: usize,
    depth: u32,
}

/// Jump targets of the innermost enclosing cycles.
struct LoopLabels {
    head: LabelId,
    end: LabelId,
}

struct FunctionLowering<'a> {
    strings: &'a mut StringTable,
    vars: Vec<IrVar>,
    code: Vec<Instr>,
    scope: Vec<SlotBinding>,
    depth: u32,
    next_temp: Temp,
    next_label: LabelId,
    loops: Vec<LoopLabels>,
}

impl<'a> FunctionLowering<'a> {
    fn new(strings: &'a mut StringTable) -> Self {
        Self {
            strings,
            vars: Vec::new(),
            code: Vec::new(),
            scope: Vec::new(),
            depth: 0,
            next_temp: 0,
            next_label: 0,
            loops: Vec::new(),
        }
    }

    fn lower(mut self, f: &Function) -> Result<IrFunction, Diagnostic> {
        self.enter_scope();
        for p in &f.params {
            let slot = self.add_var(&p.name, p.ty, false, true);
            self.bind_slot(&p.name, slot);
        }
        let param_count = f.params.len();

        self.lower_block(&f.body)?;
        self.exit_scope();

        // A mist glyph always terminates through a return opcode, even
        // when the source body just runs off the end.
        if f.return_type == Type::Unit {
            self.emit(InstrKind::Return { value: None }, Span::DUMMY);
        }

        Ok(IrFunction {
            name: f.name.clone(),
            return_type: f.return_type,
            vars: self.vars,
            param_count,
            temp_count: self.next_temp,
            code: self.code,
        })
    }

    fn emit(&mut self, kind: InstrKind, span: Span) {
        self.code.push(Instr::new(kind, span));
    }

    fn new_temp(&mut self) -> Temp {
        let t = self.next_temp;
        self.next_temp += 1;
        t
    }

    fn new_label(&mut self) -> LabelId {
        let l = self.next_label;
        self.next_label += 1;
        l
    }

    fn add_var(&mut self, name: &str, ty: Type, mutable: bool, is_param: bool) -> usize {
        let slot = self.vars.len();
        self.vars.push(IrVar {
            name: name.to_string(),
            ty,
            mutable,
            is_param,
        });
        slot
    }

    fn bind_slot(&mut self, name: &str, slot: usize) {
        self.scope.push(SlotBinding {
            name: name.to_string(),
            slot,
            depth: self.depth,
        });
    }

    fn find_slot(&self, name: &str) -> Option<usize> {
        self.scope
            .iter()
            .rev()
            .find(|b| b.name == name)
            .map(|b| b.slot)
    }

    fn enter_scope(&mut self) {
        self.depth += 1;
    }

    fn exit_scope(&mut self) {
        while self
            .scope
            .last()
            .is_some_and(|b| b.depth == self.depth)
        {
            self.scope.pop();
        }
        self.depth -= 1;
    }

    fn lower_block(&mut self, block: &Block) -> Result<(), Diagnostic> {
        for stmt in &block.stmts {
            self.lower_stmt(stmt)?;
        }
        Ok(())
    }

    fn lower_stmt(&mut self, stmt: &Stmt) -> Result<(), Diagnostic> {
        let span = stmt.span;
        match &stmt.kind {
            StmtKind::Bind { name, value } | StmtKind::Morph { name, value } => {
                let mutable = matches!(stmt.kind, StmtKind::Morph { .. });
                let src = self.lower_expr(value)?;
                let slot = self.add_var(name, value.inferred_type, mutable, false);
                self.bind_slot(name, slot);
                self.emit(InstrKind::StoreVar { var: slot, src }, span);
            }
            StmtKind::Shift { name, value } => {
                let Some(slot) = self.find_slot(name) else {
                    return Err(Diagnostic::internal(
                        span,
                        format!("unknown var in IR gen: {name}"),
                    ));
                };
                let src = self.lower_expr(value)?;
                self.emit(InstrKind::StoreVar { var: slot, src }, span);
            }
            StmtKind::Fork {
                cond,
                then_block,
                else_block,
            } => {
                let cond_temp = self.lower_expr(cond)?;
                let l_else = self.new_label();
                let l_end = self.new_label();
                self.emit(
                    InstrKind::JumpIfZero {
                        cond: cond_temp,
                        target: l_else,
                    },
                    Span::DUMMY,
                );

                self.enter_scope();
                self.lower_block(then_block)?;
                self.exit_scope();
                self.emit(InstrKind::Jump(l_end), Span::DUMMY);

                self.emit(InstrKind::Label(l_else), Span::DUMMY);
                if let Some(else_block) = else_block {
                    self.enter_scope();
                    self.lower_block(else_block)?;
                    self.exit_scope();
                }
                self.emit(InstrKind::Label(l_end), Span::DUMMY);
            }
            StmtKind::Cycle { cond, body } => {
                let l_head = self.new_label();
                let l_end = self.new_label();
                self.loops.push(LoopLabels {
                    head: l_head,
                    end: l_end,
                });

                self.emit(InstrKind::Label(l_head), Span::DUMMY);
                let cond_temp = self.lower_expr(cond)?;
                self.emit(
                    InstrKind::JumpIfZero {
                        cond: cond_temp,
                        target: l_end,
                    },
                    Span::DUMMY,
                );

                self.enter_scope();
                self.lower_block(body)?;
                self.exit_scope();
                self.emit(InstrKind::Jump(l_head), Span::DUMMY);
                self.emit(InstrKind::Label(l_end), Span::DUMMY);
                self.loops.pop();
            }
            StmtKind::Break => {
                let Some(labels) = self.loops.last() else {
                    return Err(Diagnostic::internal(
                        span,
                        "break used outside loop during IR gen",
                    ));
                };
                let end = labels.end;
                self.emit(InstrKind::Jump(end), Span::DUMMY);
            }
            StmtKind::Continue => {
                let Some(labels) = self.loops.last() else {
                    return Err(Diagnostic::internal(
                        span,
                        "continue used outside loop during IR gen",
                    ));
                };
                let head = labels.head;
                self.emit(InstrKind::Jump(head), Span::DUMMY);
            }
            StmtKind::Offer { value } => {
                let value = match value {
                    Some(value) => Some(self.lower_expr(value)?),
                    None => None,
                };
                self.emit(InstrKind::Return { value }, span);
            }
            StmtKind::Chant { value } => {
                let src = self.lower_expr(value)?;
                self.emit(
                    InstrKind::Chant {
                        src,
                        ty: value.inferred_type,
                    },
                    span,
                );
            }
            StmtKind::Expr { value } => {
                if let ExprKind::Call { .. } = value.kind {
                    self.lower_call(value)?;
                } else {
                    self.lower_expr(value)?;
                }
            }
        }
        Ok(())
    }

    fn lower_expr(&mut self, e: &Expr) -> Result<Temp, Diagnostic> {
        let span = e.span;
        match &e.kind {
            ExprKind::Int(value) => {
                let dst = self.new_temp();
                self.emit(InstrKind::ConstInt { dst, value: *value }, span);
                Ok(dst)
            }
            ExprKind::Bool(value) => {
                let dst = self.new_temp();
                self.emit(InstrKind::ConstBool { dst, value: *value }, span);
                Ok(dst)
            }
            ExprKind::Str(value) => {
                let id = self.strings.intern(value);
                let dst = self.new_temp();
                self.emit(InstrKind::ConstStr { dst, id }, span);
                Ok(dst)
            }
            ExprKind::Var(name) => {
                let Some(slot) = self.find_slot(name) else {
                    return Err(Diagnostic::internal(
                        span,
                        format!("unknown var in IR gen: {name}"),
                    ));
                };
                let dst = self.new_temp();
                self.emit(InstrKind::LoadVar { dst, var: slot }, span);
                Ok(dst)
            }
            ExprKind::Call { .. } => match self.lower_call(e)? {
                Some(dst) => Ok(dst),
                None => {
                    // A mist call in value position has nothing to hand
                    // upward; materialize a defined zero so every read
                    // temporary has a writer.
                    let dst = self.new_temp();
                    self.emit(InstrKind::ConstInt { dst, value: 0 }, span);
                    Ok(dst)
                }
            },
            ExprKind::Unary { op, operand } => {
                let src = self.lower_expr(operand)?;
                let dst = self.new_temp();
                self.emit(
                    InstrKind::Unary { dst, op: *op, src },
                    span,
                );
                Ok(dst)
            }
            ExprKind::Binary { op, left, right } => {
                let lhs = self.lower_expr(left)?;
                let rhs = self.lower_expr(right)?;
                let dst = self.new_temp();
                self.emit(
                    InstrKind::Binary {
                        dst,
                        op: *op,
                        lhs,
                        rhs,
                    },
                    span,
                );
                Ok(dst)
            }
        }
    }

    /// Lowers a call; mist callees get no destination temporary.
    fn lower_call(&mut self, e: &Expr) -> Result<Option<Temp>, Diagnostic> {
        let span = e.span;
        let ExprKind::Call { name, args } = &e.kind else {
            unreachable!("lower_call on a non-call expression");
        };

        if args.len() > target::MAX_CALL_ARGS {
            return Err(Diagnostic::internal(
                span,
                format!(
                    "codegen currently supports up to {} call arguments on this target",
                    target::MAX_CALL_ARGS
                ),
            ));
        }

        let mut arg_temps = Vec::with_capacity(args.len());
        for arg in args {
            arg_temps.push(self.lower_expr(arg)?);
        }

        let dst = if e.inferred_type == Type::Unit {
            None
        } else {
            Some(self.new_temp())
        };

        self.emit(
            InstrKind::Call {
                dst,
                name: name.clone(),
                args: arg_temps,
            },
            span,
        );
        Ok(dst)
    }
}

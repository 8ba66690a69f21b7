//! The linear three-address IR.
//!
//! Instructions are a flat vector per procedure. Temporaries and labels
//! are dense zero-based indices, counted per procedure; variables are
//! stack-slot indices into the procedure's variable list, with
//! parameters occupying the leading slots in declaration order.

use anemo_par::ast::{BinaryOp, Type, UnaryOp};
use anemo_util::Span;
use indexmap::IndexSet;

/// A per-procedure temporary, written exactly once by the instruction
/// that defines it.
pub type Temp = u32;

/// A per-procedure label id.
pub type LabelId = u32;

/// An id into the program's string table.
pub type StrId = u32;

/// A stack slot backing a source-level local or parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IrVar {
    /// Diagnostic only; slot index is what identifies the variable.
    pub name: String,
    pub ty: Type,
    pub mutable: bool,
    pub is_param: bool,
}

/// One IR instruction plus its originating source position.
#[derive(Clone, Debug, PartialEq)]
pub struct Instr {
    pub kind: InstrKind,
    pub span: Span,
}

impl Instr {
    pub fn new(kind: InstrKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum InstrKind {
    /// Defines a jump target. Each label id is defined exactly once per
    /// procedure.
    Label(LabelId),
    /// Unconditional jump.
    Jump(LabelId),
    /// Branch to `target` when `cond` is zero.
    JumpIfZero { cond: Temp, target: LabelId },

    /// Load an integer immediate.
    ConstInt { dst: Temp, value: i64 },
    /// Load a boolean immediate.
    ConstBool { dst: Temp, value: bool },
    /// Load the address of an interned string.
    ConstStr { dst: Temp, id: StrId },
    /// Load a variable slot into a temporary.
    LoadVar { dst: Temp, var: usize },
    /// Store a temporary into a variable slot.
    StoreVar { var: usize, src: Temp },

    Binary {
        dst: Temp,
        op: BinaryOp,
        lhs: Temp,
        rhs: Temp,
    },
    Unary {
        dst: Temp,
        op: UnaryOp,
        src: Temp,
    },

    /// Call a glyph. `dst` is absent for mist callees.
    Call {
        dst: Option<Temp>,
        name: String,
        args: Vec<Temp>,
    },
    /// Print a value; `ty` selects the format.
    Chant { src: Temp, ty: Type },
    /// Return, optionally carrying a value.
    Return { value: Option<Temp> },
}

/// A lowered procedure.
#[derive(Clone, Debug, PartialEq)]
pub struct IrFunction {
    pub name: String,
    pub return_type: Type,
    /// All stack slots, parameters first.
    pub vars: Vec<IrVar>,
    /// Number of leading `vars` entries that are parameters.
    pub param_count: usize,
    /// Total temporaries used; sizes the stack frame.
    pub temp_count: u32,
    pub code: Vec<Instr>,
}

/// Deduplicated string literals with dense, insertion-ordered ids.
#[derive(Clone, Debug, Default)]
pub struct StringTable {
    entries: IndexSet<String>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns `value`, returning its id. Equal contents always map to
    /// the same id; ids are assigned in insertion order and are stable
    /// for the lifetime of the IR program.
    pub fn intern(&mut self, value: &str) -> StrId {
        match self.entries.get_index_of(value) {
            Some(index) => index as StrId,
            None => {
                let (index, _) = self.entries.insert_full(value.to_string());
                index as StrId
            }
        }
    }

    pub fn get(&self, id: StrId) -> Option<&str> {
        self.entries.get_index(id as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(id, content)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (StrId, &str)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, s)| (i as StrId, s.as_str()))
    }
}

/// A whole lowered program.
#[derive(Clone, Debug, Default)]
pub struct IrProgram {
    pub functions: Vec<IrFunction>,
    pub strings: StringTable,
}

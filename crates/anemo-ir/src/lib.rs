//! anemo-ir - Linear three-address IR and AST lowering.
//!
//! The IR is deliberately naive: one flat instruction vector per
//! procedure, a fresh temporary per expression value, and string
//! literals interned into a program-wide table. No control-flow graph
//! is built and nothing is optimized; the point is a representation
//! the stack-slot code emitter can walk in one pass.

mod ir;
mod lower;

pub use ir::{
    Instr, InstrKind, IrFunction, IrProgram, IrVar, LabelId, StrId, StringTable, Temp,
};
pub use lower::lower_program;

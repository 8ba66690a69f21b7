//! anemo-gen - x86-64 code emission and toolchain invocation.
//!
//! Turns the linear IR into one GNU-as translation unit using a
//! stack-slot model (no register allocation), then drives the system
//! assembler and linker to produce a native executable. The calling
//! convention is fixed when the compiler is built: System V AMD64 or
//! Microsoft x64.

pub mod abi;
mod asm;
mod error;
mod linker;

pub use asm::emit_program;
pub use error::BuildError;
pub use linker::{assemble, link};

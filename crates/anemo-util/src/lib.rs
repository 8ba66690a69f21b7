//! anemo-util - Shared infrastructure for the Anemo compiler.
//!
//! This crate holds the pieces every pipeline stage needs: source
//! positions, the diagnostic type that all stages fail with, and the
//! host-target facts that are fixed when the compiler itself is built.

pub mod diagnostic;
pub mod span;
pub mod target;

pub use diagnostic::Diagnostic;
pub use span::Span;

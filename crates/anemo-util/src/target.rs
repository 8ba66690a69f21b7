//! Host-target facts fixed at compiler build time.
//!
//! The code emitter speaks either the System V AMD64 or the Microsoft
//! x64 calling convention, chosen by the platform the compiler itself is
//! built for. The one fact shared by several stages lives here so the
//! semantic analyzer, the IR builder and the emitter agree by
//! construction.

/// Maximum number of call arguments, equal to the number of integer
/// argument registers of the host calling convention.
#[cfg(windows)]
pub const MAX_CALL_ARGS: usize = 4;

/// Maximum number of call arguments, equal to the number of integer
/// argument registers of the host calling convention.
#[cfg(not(windows))]
pub const MAX_CALL_ARGS: usize = 6;

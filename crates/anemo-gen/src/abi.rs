//! Host calling-convention facts.
//!
//! The emitter is specialized for the platform the compiler itself was
//! built on: System V AMD64 everywhere except Windows, Microsoft x64
//! there. The differences are confined to the argument-register table,
//! the 32-byte shadow space Microsoft requires around every call, and
//! the spelling of the printf symbol.

/// The calling convention the emitted code follows.
pub struct HostAbi;

#[cfg(not(windows))]
impl HostAbi {
    /// Integer argument registers in order.
    pub const ARG_REGS: [&'static str; 6] = ["%rdi", "%rsi", "%rdx", "%rcx", "%r8", "%r9"];

    /// Bytes of shadow space required around calls.
    pub const SHADOW_SPACE: u32 = 0;

    /// How the libc print symbol is referenced.
    pub const PRINTF: &'static str = "printf@PLT";
}

#[cfg(windows)]
impl HostAbi {
    /// Integer argument registers in order.
    pub const ARG_REGS: [&'static str; 4] = ["%rcx", "%rdx", "%r8", "%r9"];

    /// Bytes of shadow space required around calls.
    pub const SHADOW_SPACE: u32 = 32;

    /// How the libc print symbol is referenced.
    pub const PRINTF: &'static str = "printf";
}

impl HostAbi {
    /// Maximum call arity: one argument per register, nothing spills.
    pub const MAX_CALL_ARGS: usize = Self::ARG_REGS.len();

    /// The register carrying argument `index`.
    pub fn arg_register(index: usize) -> &'static str {
        Self::ARG_REGS[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_cap_matches_the_shared_constant() {
        assert_eq!(HostAbi::MAX_CALL_ARGS, anemo_util::target::MAX_CALL_ARGS);
    }

    #[test]
    fn test_first_argument_register() {
        #[cfg(not(windows))]
        assert_eq!(HostAbi::arg_register(0), "%rdi");
        #[cfg(windows)]
        assert_eq!(HostAbi::arg_register(0), "%rcx");
    }

    #[test]
    fn test_shadow_space_only_on_microsoft() {
        #[cfg(not(windows))]
        assert_eq!(HostAbi::SHADOW_SPACE, 0);
        #[cfg(windows)]
        assert_eq!(HostAbi::SHADOW_SPACE, 32);
    }
}

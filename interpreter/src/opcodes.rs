use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::{Display, EnumCount, EnumIter, EnumString, IntoStaticStr};

/// The closed set of supported mnemonics.
///
/// The discriminants are dense so that an opcode can index per-opcode tables
/// such as [`crate::ExecutionStats`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumCount,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Display,
    TryFromPrimitive,
    IntoPrimitive,
)]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum Opcode {
    // Loads and moves
    Li = 0,
    La,
    Move,

    // Arithmetic
    Add,
    Addi,
    Sub,
    Mul,
    Div,
    Andi,

    // Set-compare
    Slt,
    Sgt,
    Sle,
    Sge,
    Sne,

    // Jumps
    J,
    Jal,
    Jr,

    // Zero-test branches
    Beqz,
    Bnez,
    Bltz,
    Bgtz,
    Blez,
    Bgez,

    // Two-operand branches
    Beq,
    Bne,
    Blt,
    Bgt,
    Ble,
    Bge,

    // Memory access
    Sw,
    Lw,

    // System
    Syscall,
    Halt,
}

impl Opcode {
    /// Parses a mnemonic, ignoring ASCII case.
    pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        mnemonic.to_ascii_lowercase().parse().ok()
    }

    pub fn mnemonic(self) -> &'static str {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use strum::{EnumCount, IntoEnumIterator};

    use super::*;

    #[test]
    fn test_mnemonics_roundtrip() {
        for opcode in Opcode::iter() {
            assert_eq!(Opcode::from_mnemonic(opcode.mnemonic()), Some(opcode));
            assert_eq!(
                Opcode::try_from(u8::from(opcode)).unwrap(),
                opcode,
                "discriminants must be dense"
            );
        }
        assert_eq!(Opcode::COUNT, 33);
    }

    #[test]
    fn test_case_insensitive_and_unknown() {
        assert_eq!(Opcode::from_mnemonic("LW"), Some(Opcode::Lw));
        assert_eq!(Opcode::from_mnemonic("Syscall"), Some(Opcode::Syscall));
        assert_eq!(Opcode::from_mnemonic("xor"), None);
        assert_eq!(Opcode::from_mnemonic(""), None);
    }
}

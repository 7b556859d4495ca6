//! The register file and its fixed name table.

use std::str::FromStr;

use ahash::AHashMap;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use once_cell::sync::Lazy;
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumCount, EnumIter, IntoStaticStr};

use crate::execution::InterpreterError;

pub const REGISTER_COUNT: usize = Register::COUNT;

/// A general purpose register, named by MIPS convention.
///
/// The discriminant is the register's position in the [`RegisterFile`] and
/// the index reported in register patches.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumCount,
    EnumIter,
    IntoStaticStr,
    Display,
    TryFromPrimitive,
    IntoPrimitive,
)]
#[repr(u8)]
pub enum Register {
    #[strum(serialize = "$zero")]
    Zero = 0,
    #[strum(serialize = "$at")]
    At,
    #[strum(serialize = "$v0")]
    V0,
    #[strum(serialize = "$v1")]
    V1,
    #[strum(serialize = "$a0")]
    A0,
    #[strum(serialize = "$a1")]
    A1,
    #[strum(serialize = "$a2")]
    A2,
    #[strum(serialize = "$a3")]
    A3,
    #[strum(serialize = "$t0")]
    T0,
    #[strum(serialize = "$t1")]
    T1,
    #[strum(serialize = "$t2")]
    T2,
    #[strum(serialize = "$t3")]
    T3,
    #[strum(serialize = "$t4")]
    T4,
    #[strum(serialize = "$t5")]
    T5,
    #[strum(serialize = "$t6")]
    T6,
    #[strum(serialize = "$t7")]
    T7,
    #[strum(serialize = "$s0")]
    S0,
    #[strum(serialize = "$s1")]
    S1,
    #[strum(serialize = "$s2")]
    S2,
    #[strum(serialize = "$s3")]
    S3,
    #[strum(serialize = "$s4")]
    S4,
    #[strum(serialize = "$s5")]
    S5,
    #[strum(serialize = "$s6")]
    S6,
    #[strum(serialize = "$s7")]
    S7,
    #[strum(serialize = "$t8")]
    T8,
    #[strum(serialize = "$t9")]
    T9,
    #[strum(serialize = "$k0")]
    K0,
    #[strum(serialize = "$k1")]
    K1,
    #[strum(serialize = "$gp")]
    Gp,
    #[strum(serialize = "$sp")]
    Sp,
    #[strum(serialize = "$s8")]
    S8,
    #[strum(serialize = "$ra")]
    Ra,
}

/// Every accepted spelling: conventional names, `$fp` and `$0`..`$31`.
static REGISTER_NAMES: Lazy<AHashMap<String, Register>> = Lazy::new(|| {
    let mut names = AHashMap::with_capacity(REGISTER_COUNT * 2 + 1);
    for register in Register::iter() {
        let name: &'static str = register.into();
        names.insert(name.to_string(), register);
        names.insert(format!("${}", register.index()), register);
    }
    names.insert("$fp".to_string(), Register::S8);
    names
});

impl Register {
    /// Resolves a register by name, failing with `UnknownRegister`.
    pub fn from_name(name: &str) -> Result<Self, InterpreterError> {
        REGISTER_NAMES
            .get(name)
            .copied()
            .ok_or_else(|| InterpreterError::UnknownRegister(name.to_string()))
    }

    pub fn index(self) -> usize {
        u8::from(self) as usize
    }

    pub fn name(self) -> &'static str {
        self.into()
    }
}

impl FromStr for Register {
    type Err = InterpreterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

/// 32 signed 32-bit slots. `$zero` is an ordinary writable slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterFile([i32; REGISTER_COUNT]);

impl RegisterFile {
    pub const fn get(&self, register: Register) -> i32 {
        self.0[register as usize]
    }

    pub fn set(&mut self, register: Register, value: i32) {
        self.0[register.index()] = value;
    }

    /// Writes the slot at `index`, as recorded in a register patch.
    pub fn set_index(&mut self, index: usize, value: i32) -> Result<(), InterpreterError> {
        let slot = self
            .0
            .get_mut(index)
            .ok_or_else(|| InterpreterError::UnknownRegister(format!("${index}")))?;
        *slot = value;
        Ok(())
    }

    /// Reads a register by name.
    pub fn get_named(&self, name: &str) -> Result<i32, InterpreterError> {
        Register::from_name(name).map(|register| self.get(register))
    }

    /// Writes a register by name.
    pub fn set_named(&mut self, name: &str, value: i32) -> Result<(), InterpreterError> {
        let register = Register::from_name(name)?;
        self.set(register, value);
        Ok(())
    }

    pub const fn as_array(&self) -> &[i32; REGISTER_COUNT] {
        &self.0
    }

    pub fn clear(&mut self) {
        self.0 = [0; REGISTER_COUNT];
    }
}

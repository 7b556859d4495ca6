mod cstring;
mod error;

pub use cstring::{decode_cstring, encode_asciiz};
pub use error::MemoryError;

/// Size in bytes of a memory word.
pub(crate) const WORD_SIZE: usize = 4;

/// A flat, fixed-size, byte-addressable memory.
///
/// The data segment is placed at offset 0 by the loader; the rest is unused
/// space available to the program. Words are little-endian. Any access that
/// touches a byte outside `[0, size)` fails with [`MemoryError::OutOfBounds`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    bytes: Vec<u8>,
}

impl Memory {
    /// Creates a zero-filled memory of `size` bytes.
    pub fn new(size: usize) -> Self {
        Self {
            bytes: vec![0; size],
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Zeroes every byte, keeping the size.
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    /// Checks that `len` bytes starting at `address` are addressable and
    /// returns the start as an index.
    pub(crate) fn check_range(&self, address: i64, len: usize) -> Result<usize, MemoryError> {
        let out_of_bounds = || MemoryError::OutOfBounds {
            address,
            len,
            size: self.size(),
        };
        let start = usize::try_from(address).map_err(|_| out_of_bounds())?;
        match start.checked_add(len) {
            Some(end) if end <= self.size() => Ok(start),
            _ => Err(out_of_bounds()),
        }
    }

    pub fn read_byte(&self, address: u32) -> Result<u8, MemoryError> {
        let start = self.check_range(address.into(), 1)?;
        Ok(self.bytes[start])
    }

    pub fn read_word(&self, address: u32) -> Result<i32, MemoryError> {
        let start = self.check_range(address.into(), WORD_SIZE)?;
        let mut word = [0; WORD_SIZE];
        word.copy_from_slice(&self.bytes[start..start + WORD_SIZE]);
        Ok(i32::from_le_bytes(word))
    }

    pub fn write_byte(&mut self, address: u32, value: u8) -> Result<(), MemoryError> {
        let start = self.check_range(address.into(), 1)?;
        self.bytes[start] = value;
        Ok(())
    }

    pub fn write_word(&mut self, address: u32, value: i32) -> Result<(), MemoryError> {
        let start = self.check_range(address.into(), WORD_SIZE)?;
        self.bytes[start..start + WORD_SIZE].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Decodes the null-terminated string starting at `address`.
    ///
    /// Stops at the first null byte or at the end of memory.
    pub fn read_cstring(&self, address: u32) -> Result<String, MemoryError> {
        let start = self.check_range(address.into(), 1)?;
        Ok(decode_cstring(&self.bytes[start..]))
    }
}

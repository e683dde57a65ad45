//! Backing storage of a register's on-wire bytes.

use alloc::vec;
use alloc::vec::Vec;

use crate::{ConfigError, RegisterError, RegisterResult};

/// Fixed-length, zero-initialized byte storage.
///
/// Bytes are addressed 1-based, matching datasheet numbering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterBuffer {
    bytes: Vec<u8>,
}

impl RegisterBuffer {
    /// Allocate `size` zero bytes.
    pub fn new(size: usize) -> RegisterResult<Self> {
        if size == 0 {
            return Err(ConfigError::ZeroSize.into());
        }

        Ok(Self {
            bytes: vec![0; size],
        })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Never true; buffers are at least one byte long.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Read byte `index` (1-based).
    ///
    /// # Panics
    /// If `index` is 0 or past the end: that is a malformed field description.
    pub fn get_byte(&self, index: usize) -> u8 {
        self.bytes[self.offset(index)]
    }

    /// Write byte `index` (1-based).
    ///
    /// # Panics
    /// If `index` is 0 or past the end.
    pub fn set_byte(&mut self, index: usize, value: u8) {
        let offset = self.offset(index);
        self.bytes[offset] = value;
    }

    /// Contents, ready for transmission.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Replace all bytes with data received from the bus.
    pub fn load(&mut self, bytes: &[u8]) -> RegisterResult<()> {
        if bytes.len() != self.bytes.len() {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "register load: expected {} bytes, got {}",
                self.bytes.len(),
                bytes.len()
            );
            return Err(RegisterError::LengthMismatch {
                expected: self.bytes.len(),
                actual: bytes.len(),
            });
        }

        self.bytes.copy_from_slice(bytes);
        Ok(())
    }

    fn offset(&self, index: usize) -> usize {
        assert!(
            index >= 1 && index <= self.bytes.len(),
            "byte {index} outside 1..={}",
            self.bytes.len()
        );
        index - 1
    }
}

//! Where a field lives: a byte span and the bits it covers at each end.
//!
//! Bytes are numbered from 1 and bits from 7 (high) down to 0, as in datasheets. A field that
//! crosses bytes is read high byte first: `start_byte` holds the most significant chunk and
//! `end_byte` the least significant one.

use crate::ConfigError;

/// Byte/bit span of a field. Built with one of the constructors, checked by [`Position::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Position {
    start_byte: usize,
    msb: u8,
    end_byte: usize,
    lsb: u8,
}

/// The part of one byte covered by a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    /// 1-based byte index
    pub byte: usize,
    pub msb: u8,
    pub lsb: u8,
}

impl Chunk {
    pub fn width(&self) -> u32 {
        u32::from(self.msb - self.lsb) + 1
    }
}

impl Position {
    /// Single bit `bit` of byte `byte`.
    pub const fn bit(byte: usize, bit: u8) -> Self {
        Self::bits(byte, bit, bit)
    }

    /// Bits `msb..=lsb` of byte `byte`.
    pub const fn bits(byte: usize, msb: u8, lsb: u8) -> Self {
        Self::span(byte, msb, byte, lsb)
    }

    /// From bit `msb` of `significant_byte` down to bit `lsb` of `minor_byte`.
    pub const fn span(significant_byte: usize, msb: u8, minor_byte: usize, lsb: u8) -> Self {
        Self {
            start_byte: significant_byte,
            msb,
            end_byte: minor_byte,
            lsb,
        }
    }

    /// Register-relative numbering: bits `msb..=lsb` of a `length`-byte register whose bits are
    /// numbered `8 * length - 1` down to 0, first byte most significant.
    ///
    /// `in_register(2, 12, 0)` is bits 4..0 of byte 1 followed by all of byte 2.
    pub fn in_register(length: usize, msb: usize, lsb: usize) -> Result<Self, ConfigError> {
        if length == 0 {
            return Err(ConfigError::ZeroSize);
        }
        if msb >= length * 8 || lsb >= length * 8 {
            return Err(ConfigError::BitOutOfRange);
        }
        if msb < lsb {
            return Err(ConfigError::MisorderedSpan);
        }

        Ok(Self::span(
            length - msb / 8,
            (msb % 8) as u8,
            length - lsb / 8,
            (lsb % 8) as u8,
        ))
    }

    pub fn start_byte(&self) -> usize {
        self.start_byte
    }

    pub fn end_byte(&self) -> usize {
        self.end_byte
    }

    pub fn msb(&self) -> u8 {
        self.msb
    }

    pub fn lsb(&self) -> u8 {
        self.lsb
    }

    /// Check the span and return its width in bits.
    pub fn validate(&self) -> Result<u32, ConfigError> {
        if self.start_byte == 0 || self.end_byte == 0 {
            return Err(ConfigError::ByteIndexZero);
        }
        if self.msb > 7 || self.lsb > 7 {
            return Err(ConfigError::BitOutOfRange);
        }
        if self.end_byte < self.start_byte
            || (self.end_byte == self.start_byte && self.lsb > self.msb)
        {
            return Err(ConfigError::MisorderedSpan);
        }
        // Ten or more bytes hold at least 66 bits
        if self.end_byte - self.start_byte > 8 {
            return Err(ConfigError::TooWide);
        }

        let width = self.width();
        if width > 64 {
            return Err(ConfigError::TooWide);
        }
        Ok(width)
    }

    /// Width in bits. Only meaningful once [`Position::validate`] passed.
    pub fn width(&self) -> u32 {
        self.chunks().map(|chunk| chunk.width()).sum()
    }

    /// Covered bits of each byte, most significant byte first.
    pub fn chunks(&self) -> impl DoubleEndedIterator<Item = Chunk> + '_ {
        (self.start_byte..=self.end_byte).map(move |byte| Chunk {
            byte,
            msb: if byte == self.start_byte { self.msb } else { 7 },
            lsb: if byte == self.end_byte { self.lsb } else { 0 },
        })
    }

    /// Do the two spans share any bit?
    pub fn overlaps(&self, other: &Position) -> bool {
        if self.end_byte < other.start_byte || other.end_byte < self.start_byte {
            return false;
        }

        self.chunks().any(|mine| {
            other
                .chunks()
                .any(|theirs| theirs.byte == mine.byte && mine.lsb <= theirs.msb && theirs.lsb <= mine.msb)
        })
    }
}

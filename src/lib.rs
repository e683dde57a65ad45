#![cfg_attr(not(test), no_std)]

//! Declarative bit-field register codec.
//!
//! A register (or a multi-byte command/response block) is described as a set of named fields,
//! each living at an explicit byte/bit span of a shared [`RegisterBuffer`]. Fields are read and
//! written in the byte order written in the chip's datasheet, regardless of host endianness.

extern crate alloc;
// Lets the derive output name `::register_layout` from inside this crate as well
extern crate self as register_layout;

use alloc::vec::Vec;
use core::fmt;

pub mod buffer;
pub mod field;
pub mod layout;
pub mod link;
pub mod position;
pub mod value;

#[cfg(feature = "derive")]
pub mod devices;

pub use buffer::RegisterBuffer;
pub use field::{EnumCases, FieldKind, FieldSpec, Overflow};
pub use layout::{FieldDef, RegisterLayout, Shape};
pub use link::{DataLink, I2cLink, LinkError};
pub use position::Position;
pub use value::{ClosedEnum, FieldValue};

#[cfg(feature = "derive")]
pub use register_layout_derive::*;
pub use intbits::*;

/// Paths used by the derive output.
#[doc(hidden)]
pub mod __private {
    pub use alloc::vec::Vec;
}

/// A register with a fixed description.
pub trait Register: Sized {
    /// Number of bytes to read/ write
    const LENGTH: usize;

    /// Field definitions, in declaration order.
    fn field_defs() -> Vec<FieldDef>;

    /// Fresh layout holding every field's default value.
    fn layout() -> RegisterResult<RegisterLayout> {
        RegisterLayout::new(Self::LENGTH, Self::field_defs())
    }
}

/// Register selected by a pointer/command byte before the payload is transferred.
pub trait AddressedRegister: Register {
    /// Register address
    const ADDRESS: u8;
}

/// Register is readable
pub trait ReadableRegister: Register {
    /// Decode every field out of a live layout.
    fn from_layout(layout: &RegisterLayout) -> RegisterResult<Self>;

    /// Convert buffer into type.
    /// Fails with [`RegisterError::LengthMismatch`] if the buffer length is incorrect
    fn from_bytes(buffer: &[u8]) -> RegisterResult<Self> {
        let mut layout = Self::layout()?;
        layout.load(buffer)?;
        Self::from_layout(&layout)
    }

    /// Value on reset
    fn reset_value() -> RegisterResult<Self> {
        Self::from_layout(&Self::layout()?)
    }
}

/// Register is writeable
pub trait WriteableRegister: Register {
    /// Encode every field into a fresh layout.
    fn to_layout(&self) -> RegisterResult<RegisterLayout>;

    fn into_bytes(&self) -> RegisterResult<Vec<u8>> {
        Ok(self.to_layout()?.bytes().to_vec())
    }
}

/// Alias for `Result<T, RegisterError>`
pub type RegisterResult<T> = Result<T, RegisterError>;

/// Possible error types
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterError {
    /// The register description itself is wrong
    InvalidConfiguration(ConfigError),
    /// Failed to perform conversion from bits into the requested type (e.g. no enum variant)
    ConversionError { field: &'static str, raw: i128 },
    /// The value does not fit the field
    OutOfRange {
        field: &'static str,
        value: i128,
        min: i128,
        max: i128,
    },
    /// `load()` received the wrong number of bytes
    LengthMismatch { expected: usize, actual: usize },
    /// No field with this name in the layout
    UnknownField(&'static str),
    /// The accessor's type cannot carry this field's kind
    KindMismatch { field: &'static str },
}

/// Mistakes in a register description. Detected when the layout is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Buffer of zero bytes
    ZeroSize,
    /// Byte indices are 1-based
    ByteIndexZero,
    /// Bit number above 7 within a byte, or above the register width
    BitOutOfRange,
    /// End of the span comes before its start
    MisorderedSpan,
    /// More than 64 bits
    TooWide,
    /// Field refers to a byte past the end of the buffer
    BeyondBuffer { byte: usize, length: usize },
    /// Two fields share a bit
    Overlap {
        first: &'static str,
        second: &'static str,
    },
    /// Two fields share a name
    DuplicateName(&'static str),
    /// Flags occupy exactly one bit
    FlagWidth,
    /// Sign extension requested on a field that is not a signed integer
    SignExtendUnsigned,
    /// An enum case does not fit the field width
    CaseTooWide,
    /// Two enum cases share a raw value
    DuplicateCase,
}

impl RegisterError {
    /// Attach a field name to errors raised below the layout, where names are not known.
    pub(crate) fn for_field(self, name: &'static str) -> Self {
        match self {
            Self::ConversionError { raw, .. } => Self::ConversionError { field: name, raw },
            Self::OutOfRange {
                value, min, max, ..
            } => Self::OutOfRange {
                field: name,
                value,
                min,
                max,
            },
            Self::KindMismatch { .. } => Self::KindMismatch { field: name },
            other => other,
        }
    }
}

impl From<ConfigError> for RegisterError {
    fn from(value: ConfigError) -> Self {
        RegisterError::InvalidConfiguration(value)
    }
}

impl fmt::Display for RegisterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfiguration(err) => write!(f, "invalid register description: {err}"),
            Self::ConversionError { field, raw } => {
                write!(f, "field `{field}`: raw value {raw:#x} has no matching representation")
            }
            Self::OutOfRange {
                field,
                value,
                min,
                max,
            } => write!(f, "field `{field}`: {value} outside {min}..={max}"),
            Self::LengthMismatch { expected, actual } => {
                write!(f, "expected {expected} bytes, got {actual}")
            }
            Self::UnknownField(name) => write!(f, "no field named `{name}`"),
            Self::KindMismatch { field } => write!(f, "field `{field}`: incompatible value type"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroSize => f.write_str("register has no bytes"),
            Self::ByteIndexZero => f.write_str("byte indices start at 1"),
            Self::BitOutOfRange => f.write_str("bit number out of range"),
            Self::MisorderedSpan => f.write_str("span ends before it starts"),
            Self::TooWide => f.write_str("field wider than 64 bits"),
            Self::BeyondBuffer { byte, length } => {
                write!(f, "byte {byte} past the end of a {length}-byte register")
            }
            Self::Overlap { first, second } => write!(f, "`{first}` and `{second}` share bits"),
            Self::DuplicateName(name) => write!(f, "field `{name}` declared twice"),
            Self::FlagWidth => f.write_str("flag must be exactly one bit"),
            Self::SignExtendUnsigned => f.write_str("sign extension on a non-signed field"),
            Self::CaseTooWide => f.write_str("enum case does not fit the field"),
            Self::DuplicateCase => f.write_str("two enum cases share a raw value"),
        }
    }
}

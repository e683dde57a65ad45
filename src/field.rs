//! Encoding and decoding of a single field.

use intbits::Bits;

use crate::{ConfigError, Position, RegisterBuffer, RegisterError, RegisterResult};

/// Value domain a field transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FieldKind {
    /// One bit, `bool`
    Flag,
    UnsignedInt,
    /// Two's complement when sign-extended, plain non-negative integer otherwise
    SignedInt,
    ClosedEnum(EnumCases),
}

/// Legal raw values of a closed enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EnumCases {
    pub type_name: &'static str,
    pub raw_values: &'static [u64],
}

impl FieldKind {
    /// Can a value of kind `value` be stored in, or read out of, a field of this kind?
    pub fn accepts(&self, value: &FieldKind) -> bool {
        match (self, value) {
            (Self::Flag, Self::Flag) => true,
            (Self::UnsignedInt | Self::SignedInt, Self::UnsignedInt | Self::SignedInt) => true,
            (Self::ClosedEnum(field), Self::ClosedEnum(value)) => field.type_name == value.type_name,
            _ => false,
        }
    }
}

/// What to do with a value that does not fit its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Overflow {
    /// Fail with [`RegisterError::OutOfRange`]
    #[default]
    Reject,
    /// Clip to the nearest representable value
    Saturate,
}

/// Immutable description of one field: where it lives and how its bits are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FieldSpec {
    position: Position,
    width: u32,
    sign_extend: bool,
    kind: FieldKind,
}

#[inline]
fn mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1 << width) - 1
    }
}

impl FieldSpec {
    pub fn new(position: Position, kind: FieldKind, sign_extend: bool) -> Result<Self, ConfigError> {
        let width = position.validate()?;

        match kind {
            FieldKind::Flag if width != 1 => return Err(ConfigError::FlagWidth),
            FieldKind::ClosedEnum(cases) if cases.raw_values.iter().any(|&raw| raw > mask(width)) => {
                return Err(ConfigError::CaseTooWide)
            }
            FieldKind::ClosedEnum(cases)
                if cases
                    .raw_values
                    .iter()
                    .enumerate()
                    .any(|(i, raw)| cases.raw_values[..i].contains(raw)) =>
            {
                return Err(ConfigError::DuplicateCase)
            }
            _ => {}
        }
        if sign_extend && kind != FieldKind::SignedInt {
            return Err(ConfigError::SignExtendUnsigned);
        }

        Ok(Self {
            position,
            width,
            sign_extend,
            kind,
        })
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn is_sign_extended(&self) -> bool {
        self.sign_extend
    }

    /// Smallest and largest value the field can carry.
    pub fn bounds(&self) -> (i128, i128) {
        if self.sign_extend {
            let half = 1i128 << (self.width - 1);
            (-half, half - 1)
        } else {
            (0, i128::from(mask(self.width)))
        }
    }

    /// Concatenate the covered bits, high byte first.
    pub fn read_raw(&self, buffer: &RegisterBuffer) -> u64 {
        self.position.chunks().fold(0u64, |raw, chunk| {
            let bits = buffer
                .get_byte(chunk.byte)
                .bits(usize::from(chunk.lsb)..=usize::from(chunk.msb));
            (raw << chunk.width()) | u64::from(bits)
        })
    }

    /// Split `raw` back over the covered bytes. Bits outside the field are preserved.
    ///
    /// Fails if `raw` needs more than the field's width.
    pub fn write_raw(&self, buffer: &mut RegisterBuffer, raw: u64) -> RegisterResult<()> {
        if raw > mask(self.width) {
            return Err(RegisterError::OutOfRange {
                field: "",
                value: i128::from(raw),
                min: 0,
                max: i128::from(mask(self.width)),
            });
        }

        let mut remaining = raw;
        for chunk in self.position.chunks().rev() {
            let width = chunk.width();
            let mut byte = buffer.get_byte(chunk.byte);
            byte.set_bits(
                usize::from(chunk.lsb)..=usize::from(chunk.msb),
                (remaining & mask(width)) as u8,
            );
            buffer.set_byte(chunk.byte, byte);
            remaining >>= width;
        }
        Ok(())
    }

    /// Decode the field to an integer: sign-extended if requested, checked against the enum
    /// cases for closed enumerations.
    pub fn decode(&self, buffer: &RegisterBuffer) -> RegisterResult<i128> {
        let raw = self.read_raw(buffer);

        if let FieldKind::ClosedEnum(cases) = self.kind {
            if !cases.raw_values.contains(&raw) {
                #[cfg(feature = "defmt")]
                defmt::warn!("{=str}: no case for raw value {=u64}", cases.type_name, raw);
                return Err(RegisterError::ConversionError {
                    field: "",
                    raw: i128::from(raw),
                });
            }
        }

        if self.sign_extend {
            let shift = 64 - self.width;
            Ok(i128::from(((raw << shift) as i64) >> shift))
        } else {
            Ok(i128::from(raw))
        }
    }

    /// Encode an integer into the field, two's complement within the field width when
    /// sign-extended.
    pub fn encode(&self, buffer: &mut RegisterBuffer, value: i128, overflow: Overflow) -> RegisterResult<()> {
        let (min, max) = self.bounds();
        let value = if (min..=max).contains(&value) {
            value
        } else {
            match (overflow, self.kind) {
                (Overflow::Saturate, FieldKind::UnsignedInt | FieldKind::SignedInt) => {
                    #[cfg(feature = "defmt")]
                    defmt::trace!("clipping {=i128} to {=i128}..={=i128}", value, min, max);
                    value.clamp(min, max)
                }
                _ => {
                    return Err(RegisterError::OutOfRange {
                        field: "",
                        value,
                        min,
                        max,
                    })
                }
            }
        };

        if let FieldKind::ClosedEnum(cases) = self.kind {
            if !cases.raw_values.iter().any(|&raw| i128::from(raw) == value) {
                return Err(RegisterError::ConversionError { field: "", raw: value });
            }
        }

        self.write_raw(buffer, (value & i128::from(mask(self.width))) as u64)
    }
}

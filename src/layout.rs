//! Named fields bound to one shared buffer.

use alloc::vec::Vec;
use core::fmt;

use crate::{
    ConfigError, FieldKind, FieldSpec, FieldValue, Overflow, Position, RegisterBuffer, RegisterError,
    RegisterResult,
};

/// Declaration of one field, before it is bound to a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub position: Position,
    pub kind: FieldKind,
    pub sign_extend: bool,
    pub default: i128,
}

impl FieldDef {
    /// Field whose kind follows from `T`: `bool` is a flag, integers are integers, closed enums
    /// are closed enums.
    pub fn new<T: FieldValue>(name: &'static str, position: Position, default: T) -> Self {
        Self {
            name,
            position,
            kind: T::kind(),
            sign_extend: false,
            default: default.to_raw(),
        }
    }

    pub fn flag(name: &'static str, position: Position, default: bool) -> Self {
        Self::new(name, position, default)
    }

    pub fn unsigned(name: &'static str, position: Position, default: u64) -> Self {
        Self::new(name, position, default)
    }

    pub fn signed(name: &'static str, position: Position, default: i64) -> Self {
        Self::new(name, position, default)
    }

    /// Interpret the field as two's complement within its own width.
    pub fn sign_extended(mut self) -> Self {
        self.sign_extend = true;
        self
    }
}

/// The three buffer shapes registers come in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Shape {
    /// One byte, e.g. a command/pointer byte
    Byte,
    /// Two bytes in datasheet (network) order. SMBus word transfers are little-endian; this is not.
    Word,
    /// As many bytes as the highest byte any field references
    ByteArray,
}

impl Shape {
    /// Buffer size for a set of fields.
    pub fn size(&self, fields: &[FieldDef]) -> usize {
        match self {
            Shape::Byte => 1,
            Shape::Word => 2,
            Shape::ByteArray => fields
                .iter()
                .map(|def| def.position.end_byte())
                .max()
                .unwrap_or(0),
        }
    }
}

/// An ordered set of named fields sharing one [`RegisterBuffer`].
///
/// Accessors read and write the live buffer; there is no staging copy.
#[derive(Clone, PartialEq, Eq)]
pub struct RegisterLayout {
    buffer: RegisterBuffer,
    fields: Vec<(&'static str, FieldSpec)>,
}

impl RegisterLayout {
    /// Build a `size`-byte buffer, then encode every field's default in declaration order.
    pub fn new(size: usize, defs: Vec<FieldDef>) -> RegisterResult<Self> {
        let mut buffer = RegisterBuffer::new(size)?;
        let mut fields: Vec<(&'static str, FieldSpec)> = Vec::with_capacity(defs.len());

        for def in &defs {
            let spec = FieldSpec::new(def.position, def.kind, def.sign_extend)?;

            let last = spec.position().end_byte();
            if last > size {
                return Err(ConfigError::BeyondBuffer {
                    byte: last,
                    length: size,
                }
                .into());
            }

            for (name, other) in &fields {
                if *name == def.name {
                    return Err(ConfigError::DuplicateName(def.name).into());
                }
                if other.position().overlaps(spec.position()) {
                    return Err(ConfigError::Overlap {
                        first: name,
                        second: def.name,
                    }
                    .into());
                }
            }

            spec.encode(&mut buffer, def.default, Overflow::Reject)
                .map_err(|err| err.for_field(def.name))?;
            fields.push((def.name, spec));
        }

        #[cfg(feature = "defmt")]
        defmt::trace!(
            "layout: {} fields over {} bytes",
            fields.len(),
            buffer.len()
        );

        Ok(Self { buffer, fields })
    }

    pub fn with_shape(shape: Shape, defs: Vec<FieldDef>) -> RegisterResult<Self> {
        let size = shape.size(&defs);
        Self::new(size, defs)
    }

    /// Single-byte layout.
    pub fn byte(defs: Vec<FieldDef>) -> RegisterResult<Self> {
        Self::with_shape(Shape::Byte, defs)
    }

    /// Two-byte layout, high byte first.
    pub fn word(defs: Vec<FieldDef>) -> RegisterResult<Self> {
        Self::with_shape(Shape::Word, defs)
    }

    /// Layout sized to the highest byte index referenced.
    pub fn byte_array(defs: Vec<FieldDef>) -> RegisterResult<Self> {
        Self::with_shape(Shape::ByteArray, defs)
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Bytes to hand to a transport.
    pub fn bytes(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    /// Replace the buffer with bytes read from a transport.
    pub fn load(&mut self, bytes: &[u8]) -> RegisterResult<()> {
        self.buffer.load(bytes)
    }

    pub fn buffer(&self) -> &RegisterBuffer {
        &self.buffer
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, spec)| spec)
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &FieldSpec)> + '_ {
        self.fields.iter().map(|(name, spec)| (*name, spec))
    }

    /// Decoded integer value of a field, whatever its kind.
    pub fn decode(&self, name: &'static str) -> RegisterResult<i128> {
        let spec = self.lookup(name)?;
        spec.decode(&self.buffer).map_err(|err| err.for_field(name))
    }

    pub fn get<T: FieldValue>(&self, name: &'static str) -> RegisterResult<T> {
        let spec = self.typed_lookup::<T>(name)?;
        let raw = spec.decode(&self.buffer).map_err(|err| err.for_field(name))?;
        T::from_raw(raw).ok_or(RegisterError::ConversionError { field: name, raw })
    }

    /// Store `value`, rejecting values that do not fit.
    pub fn set<T: FieldValue>(&mut self, name: &'static str, value: T) -> RegisterResult<()> {
        self.set_with(name, value, Overflow::Reject)
    }

    /// Store `value`, clipping integers that do not fit to the field's bounds.
    pub fn set_saturating<T: FieldValue>(&mut self, name: &'static str, value: T) -> RegisterResult<()> {
        self.set_with(name, value, Overflow::Saturate)
    }

    pub fn set_with<T: FieldValue>(
        &mut self,
        name: &'static str,
        value: T,
        overflow: Overflow,
    ) -> RegisterResult<()> {
        let spec = *self.typed_lookup::<T>(name)?;
        spec.encode(&mut self.buffer, value.to_raw(), overflow)
            .map_err(|err| err.for_field(name))
    }

    fn lookup(&self, name: &'static str) -> RegisterResult<&FieldSpec> {
        self.field(name).ok_or(RegisterError::UnknownField(name))
    }

    fn typed_lookup<T: FieldValue>(&self, name: &'static str) -> RegisterResult<&FieldSpec> {
        let spec = self.lookup(name)?;
        if spec.kind().accepts(&T::kind()) {
            Ok(spec)
        } else {
            Err(RegisterError::KindMismatch { field: name })
        }
    }
}

impl AsRef<RegisterLayout> for RegisterLayout {
    fn as_ref(&self) -> &RegisterLayout {
        self
    }
}

impl AsMut<RegisterLayout> for RegisterLayout {
    fn as_mut(&mut self) -> &mut RegisterLayout {
        self
    }
}

impl fmt::Debug for RegisterLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, spec) in &self.fields {
            match spec.decode(&self.buffer) {
                Ok(value) => map.entry(name, &value),
                Err(_) => map.entry(name, &format_args!("<invalid {:#x}>", spec.read_raw(&self.buffer))),
            };
        }
        map.finish()
    }
}

//! Rust types that can be stored in a field.

use crate::field::{EnumCases, FieldKind};

/// A typed field value.
///
/// Values cross the codec as `i128`, wide enough for every `u64` and `i64`.
pub trait FieldValue: Copy {
    /// Kind of field this type describes when used in a declaration.
    fn kind() -> FieldKind;

    fn to_raw(self) -> i128;

    /// `None` when the decoded integer has no representation in `Self`.
    fn from_raw(raw: i128) -> Option<Self>;
}

/// Enumeration restricted to a fixed set of raw values. Usually derived with
/// `#[derive(ClosedEnum)]`.
pub trait ClosedEnum: Copy + 'static {
    /// Every legal raw value, in declaration order.
    const RAW_VALUES: &'static [u64];

    fn from_raw_value(raw: u64) -> Option<Self>;

    fn raw_value(self) -> u64;

    /// Field kind for this enumeration.
    fn cases() -> FieldKind {
        FieldKind::ClosedEnum(EnumCases {
            type_name: core::any::type_name::<Self>(),
            raw_values: Self::RAW_VALUES,
        })
    }
}

impl FieldValue for bool {
    fn kind() -> FieldKind {
        FieldKind::Flag
    }

    fn to_raw(self) -> i128 {
        i128::from(self)
    }

    fn from_raw(raw: i128) -> Option<Self> {
        match raw {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        }
    }
}

macro_rules! integer_value {
    ($kind:ident: $($ty:ty),*) => {
        $(
            impl FieldValue for $ty {
                fn kind() -> FieldKind {
                    FieldKind::$kind
                }

                fn to_raw(self) -> i128 {
                    self as i128
                }

                fn from_raw(raw: i128) -> Option<Self> {
                    <$ty>::try_from(raw).ok()
                }
            }
        )*
    };
}

integer_value!(UnsignedInt: u8, u16, u32, u64, usize);
integer_value!(SignedInt: i8, i16, i32, i64, isize);

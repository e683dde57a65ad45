//! Unit tests for the derive macros

use register_layout::{
    AddressedRegister, ClosedEnum, ConfigError, ReadableRegister, Register, RegisterError, WriteableRegister,
};

#[derive(Debug, Clone, PartialEq, Register, ReadableRegister, WriteableRegister)]
#[register(shape = "byte", address = 0x2A)]
struct Flags {
    #[register(bit = 7, reset = true)]
    high: bool,
    #[register(bit = 0)]
    low: bool,
    #[register(bit = 2, reset = true)]
    middle: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ClosedEnum)]
enum Gain {
    #[valued(0b00)]
    X1,
    #[valued(0b01)]
    X2,
    #[valued(0b11)]
    X8,
}

#[derive(Debug, Clone, PartialEq, Register, ReadableRegister, WriteableRegister)]
#[register(shape = "word")]
struct Sample {
    #[register(bits = "15..14", reset = Gain::X2)]
    gain: Gain,
    #[register(bits = "11..0", sign_extend)]
    value: i16,
}

#[derive(Debug, Clone, PartialEq, Register, ReadableRegister, WriteableRegister)]
#[register(shape = "array")]
struct Frame {
    #[register(byte = 1, bits = "7..4", reset = 0xA)]
    tag: u8,
    #[register(bytes = "1..4", bits = "3..4")]
    payload: u32,
    #[register(byte = 4, bits = "3..0")]
    check: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ClosedEnum)]
enum Aliased {
    #[valued(1)]
    First,
    #[valued(0b01)]
    Second,
}

#[derive(Debug, Clone, PartialEq, Register, ReadableRegister)]
#[register(shape = "byte")]
struct AliasedMode {
    #[register(bits = "1..0", reset = Aliased::First)]
    mode: Aliased,
}

#[test]
fn test_defaults_compose() {
    assert_eq!(<Flags as Register>::LENGTH, 1);
    assert_eq!(<Flags as AddressedRegister>::ADDRESS, 0x2A);
    assert_eq!(FlagsLayout::new().unwrap().bytes(), &[0x84]);
    assert_eq!(
        Flags::reset_value().unwrap(),
        Flags {
            high: true,
            low: false,
            middle: true
        }
    );
}

#[test]
fn test_companion_accessors_share_one_buffer() {
    let mut flags = FlagsLayout::new().unwrap();
    flags.set_low(true).unwrap();
    flags.set_high(false).unwrap();

    assert_eq!(flags.bytes(), &[0b0000_0101]);
    assert_eq!(flags.get_middle(), Ok(true));
    assert_eq!(
        flags.snapshot().unwrap(),
        Flags {
            high: false,
            low: true,
            middle: true
        }
    );

    flags.load(&[0x80]).unwrap();
    assert_eq!(flags.get_high(), Ok(true));
    assert_eq!(flags.get_middle(), Ok(false));
}

#[test]
fn test_struct_round_trip() {
    let sample = Sample {
        gain: Gain::X8,
        value: -1,
    };
    let bytes = sample.into_bytes().unwrap();
    assert_eq!(bytes, vec![0b1100_1111, 0xFF]);
    assert_eq!(Sample::from_bytes(&bytes), Ok(sample));
}

#[test]
fn test_unknown_enum_bits() {
    assert_eq!(
        Sample::from_bytes(&[0b1000_0000, 0x00]),
        Err(RegisterError::ConversionError {
            field: "gain",
            raw: 0b10
        })
    );
    assert_eq!(Gain::RAW_VALUES, &[0, 1, 3]);
    assert_eq!(Gain::from_raw_value(3), Some(Gain::X8));
    assert_eq!(Gain::X2.raw_value(), 1);
}

#[test]
fn test_saturating_setter() {
    let mut sample = SampleLayout::new().unwrap();
    assert!(sample.set_value(2048).is_err());
    sample.set_value_saturating(i16::MIN).unwrap();
    assert_eq!(sample.get_value(), Ok(-2048));
    assert_eq!(sample.bytes(), &[0b0100_1000, 0x00]);
}

#[test]
fn test_wide_array_field() {
    assert_eq!(<Frame as Register>::LENGTH, 4);

    let frame = Frame {
        tag: 0x5,
        payload: 0x1_2345,
        check: 0xC,
    };
    let bytes = frame.into_bytes().unwrap();
    // payload: 4 bits of byte 1, bytes 2 and 3, top 4 bits of byte 4 = 24 bits
    assert_eq!(bytes, vec![0x50, 0x12, 0x34, 0x5C]);
    assert_eq!(Frame::from_bytes(&bytes), Ok(frame));
    assert_eq!(FrameLayout::new().unwrap().bytes(), &[0xA0, 0, 0, 0]);
}

#[test]
fn test_length_mismatch() {
    assert_eq!(
        Sample::from_bytes(&[0x00]),
        Err(RegisterError::LengthMismatch {
            expected: 2,
            actual: 1
        })
    );
    assert_eq!(
        Frame::from_bytes(&[0; 5]),
        Err(RegisterError::LengthMismatch {
            expected: 4,
            actual: 5
        })
    );
}

#[test]
fn test_enum_cases_sharing_a_raw_value() {
    assert_eq!(
        AliasedModeLayout::new(),
        Err(RegisterError::InvalidConfiguration(ConfigError::DuplicateCase))
    );
    assert_eq!(
        AliasedMode::from_bytes(&[0b01]),
        Err(RegisterError::InvalidConfiguration(ConfigError::DuplicateCase))
    );
    assert_eq!(Aliased::Second.raw_value(), 1);
}

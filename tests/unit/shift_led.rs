//! Unit tests for the shift-register LED string driver

use crate::common::mock_link::MockError;
use crate::common::MockLink;
use register_layout::devices::shift_led::Color;
use register_layout::devices::ShiftLed;
use register_layout::{LinkError, Overflow, RegisterError};

const START: [u8; 4] = [0x00; 4];
const END: [u8; 4] = [0xFF; 4];

fn framed(frames: &[[u8; 4]]) -> Vec<u8> {
    let mut message = START.to_vec();
    for frame in frames {
        message.extend_from_slice(frame);
    }
    message.extend_from_slice(&END);
    message
}

#[test]
fn test_all_writes_one_frame_per_led() {
    let link = MockLink::new();
    let mut string = ShiftLed::new(link.clone(), 3);

    string.all(Color::new(0x10, 0x20, 0x30), 7).unwrap();

    let frame = [0b1110_0111, 0x30, 0x20, 0x10];
    assert_eq!(link.written(), vec![framed(&[frame, frame, frame])]);
}

#[test]
fn test_clear_turns_everything_off() {
    let link = MockLink::new();
    let mut string = ShiftLed::new(link.clone(), 2);

    string.clear().unwrap();

    let off = [0b1110_0000, 0, 0, 0];
    assert_eq!(link.written(), vec![framed(&[off, off])]);
}

#[test]
fn test_empty_string_sends_only_start_and_end() {
    let link = MockLink::new();
    let mut string = ShiftLed::new(link.clone(), 0);
    assert!(string.is_empty());

    string.all(Color::new(0xFF, 0xFF, 0xFF), 31).unwrap();
    assert_eq!(link.written(), vec![framed(&[])]);
}

#[test]
fn test_current_above_five_bits() {
    let link = MockLink::new();
    let mut string = ShiftLed::new(link.clone(), 1);

    assert_eq!(
        string.all(Color::BLACK, 32),
        Err(LinkError::Register(RegisterError::OutOfRange {
            field: "current",
            value: 32,
            min: 0,
            max: 31
        }))
    );
    assert!(link.written().is_empty());

    string.all_with(Color::new(1, 2, 3), 200, Overflow::Saturate).unwrap();
    assert_eq!(link.written(), vec![framed(&[[0xFF, 3, 2, 1]])]);
}

#[test]
fn test_fractional_colors() {
    let link = MockLink::new();
    let mut string = ShiftLed::new(link.clone(), 1);

    string
        .all(Color::from_fractions(1.0, 0.0, 0.5), ShiftLed::<MockLink>::MAX_CURRENT)
        .unwrap();
    assert_eq!(link.written(), vec![framed(&[[0xFF, 127, 0, 255]])]);
}

#[test]
fn test_bus_failure_is_reported() {
    let link = MockLink::new();
    let mut string = ShiftLed::new(link.clone(), 4);

    link.fail_next();
    assert_eq!(string.clear(), Err(LinkError::Bus(MockError::Injected)));
    assert_eq!(string.len(), 4);

    string.clear().unwrap();
    assert_eq!(link.written().len(), 1);
}

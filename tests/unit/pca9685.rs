//! Unit tests for the PCA9685 driver

use crate::common::MockLink;
use register_layout::devices::pca9685::Mode1;
use register_layout::devices::Pca9685;
use register_layout::{LinkError, ReadableRegister, RegisterError};

#[test]
fn test_new_wakes_with_auto_increment() {
    let link = MockLink::new();
    let _controller = Pca9685::new(link.clone()).unwrap();

    assert_eq!(link.written(), vec![vec![0x00, 0b0010_0001]]);
    let mode1 = Mode1::from_bytes(&link.written()[0][1..]).unwrap();
    assert!(mode1.auto_increment);
    assert!(!mode1.sleep);
    assert!(mode1.all_call);
}

#[test]
fn test_set_channel() {
    let link = MockLink::new();
    let mut controller = Pca9685::new(link.clone()).unwrap();

    controller.set(0, 0.5).unwrap();
    controller.set(15, 1.0).unwrap();
    controller.set(3, 0.0).unwrap();

    let written = link.written();
    assert_eq!(written[1], vec![0x06, 0x00, 0x00, 0x00, 0x08]);
    assert_eq!(written[2], vec![0x42, 0x00, 0x10, 0x00, 0x00]);
    assert_eq!(written[3], vec![0x12, 0x00, 0x00, 0x00, 0x10]);
}

#[test]
fn test_set_rejects_bad_arguments() {
    let link = MockLink::new();
    let mut controller = Pca9685::new(link.clone()).unwrap();

    assert!(matches!(
        controller.set(16, 0.5),
        Err(LinkError::Register(RegisterError::OutOfRange { field: "channel", .. }))
    ));
    assert!(matches!(
        controller.set(0, 1.5),
        Err(LinkError::Register(RegisterError::OutOfRange { field: "fraction", .. }))
    ));
    assert_eq!(link.written().len(), 1);
}

//! Unit tests for the MCP9808 driver

use crate::common::{MockLink, Operation};
use register_layout::devices::mcp9808::{
    AmbientTemperature, Configuration, DeviceId, Limit, LimitFlag, ManufacturerId, PowerMode, Resolution,
};
use register_layout::devices::Mcp9808;
use register_layout::{LinkError, ReadableRegister, RegisterError};

#[test]
fn test_temperature_below_zero() {
    let link = MockLink::new();
    link.respond_with(&[0x1f, 0xde]);
    let mut sensor = Mcp9808::new(link.clone());

    assert_eq!(sensor.temperature().unwrap(), -2.125);
    assert_eq!(
        link.operations(),
        vec![Operation::WriteRead {
            command: vec![0x05],
            response: vec![0x1f, 0xde]
        }]
    );
}

#[test]
fn test_temperature_with_alarm_flags() {
    let link = MockLink::new();
    link.respond_with(&[0b1010_0001, 0x90]);
    let mut sensor = Mcp9808::new(link);

    let ambient: AmbientTemperature = sensor.read_register().unwrap();
    assert_eq!(ambient.versus_critical, LimitFlag::OutsideLimit);
    assert_eq!(ambient.versus_upper, LimitFlag::WithinLimit);
    assert_eq!(ambient.versus_lower, LimitFlag::OutsideLimit);
    assert_eq!(ambient.celsius(), 25.0);
}

#[test]
fn test_identification_registers() {
    let link = MockLink::new();
    link.respond_with(&[0x00, 0x54]);
    link.respond_with(&[0x04, 0x01]);
    let mut sensor = Mcp9808::new(link.clone());

    let manufacturer: ManufacturerId = sensor.read_register().unwrap();
    let device: DeviceId = sensor.read_register().unwrap();
    assert_eq!(manufacturer.manufacturer_id, 0x0054);
    assert_eq!(device.device_id, 0x04);
    assert_eq!(device.revision, 0x01);
    assert_eq!(link.written(), vec![vec![0x06], vec![0x07]]);
}

#[test]
fn test_write_configuration() {
    let link = MockLink::new();
    let mut sensor = Mcp9808::new(link.clone());

    let config = Configuration {
        shutdown: PowerMode::Shutdown,
        ..Configuration::reset_value().unwrap()
    };
    sensor.write_register(&config).unwrap();
    sensor.set_resolution(Resolution::C0_125).unwrap();

    assert_eq!(link.written(), vec![vec![0x01, 0x01, 0x00], vec![0x08, 0b10]]);
}

#[test]
fn test_limits() {
    let link = MockLink::new();
    link.respond_with(&[0x01, 0x40]);
    let mut sensor = Mcp9808::new(link.clone());

    sensor.set_limit(Limit::Critical, -20.0).unwrap();
    assert_eq!(sensor.limit(Limit::Upper).unwrap(), 20.0);
    assert_eq!(link.written(), vec![vec![0x04, 0x1E, 0xC0], vec![0x02]]);

    assert!(matches!(
        sensor.set_limit(Limit::Lower, 300.0),
        Err(LinkError::Register(RegisterError::OutOfRange {
            field: "quarter_celsius",
            ..
        }))
    ));
}

#[test]
fn test_non_finite_limits_are_rejected() {
    let link = MockLink::new();
    let mut sensor = Mcp9808::new(link.clone());

    for celsius in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        assert_eq!(
            sensor.set_limit(Limit::Upper, celsius),
            Err(LinkError::Register(RegisterError::OutOfRange {
                field: "quarter_celsius",
                value: 0,
                min: -1024,
                max: 1023
            }))
        );
    }
    assert!(link.written().is_empty());
}

#[test]
fn test_bus_failure_is_reported() {
    let link = MockLink::new();
    link.fail_next();
    let mut sensor = Mcp9808::new(link);

    assert!(matches!(sensor.temperature(), Err(LinkError::Bus(_))));
}

#[test]
fn test_short_response_is_not_decoded() {
    let link = MockLink::new();
    link.respond_with(&[0x1f]);
    let mut sensor = Mcp9808::new(link);

    assert!(matches!(sensor.temperature(), Err(LinkError::Bus(_))));
}

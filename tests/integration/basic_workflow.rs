//! Integration test for a complete describe / transfer / decode cycle

use crate::common::{MockLink, Operation};
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation as I2cOperation};
use register_layout::devices::mcp9808::{Pointer, RegisterPointer};
use register_layout::devices::Mcp9808;
use register_layout::link::{query, read_into, write_from};
use register_layout::{FieldDef, I2cLink, Position, Register, RegisterLayout};

/// Minimal I2C bus holding one MCP9808 whose ambient temperature register reads `ambient`
struct SensorBus {
    address: u8,
    pointer: u8,
    ambient: [u8; 2],
}

impl ErrorType for SensorBus {
    type Error = ErrorKind;
}

impl I2c for SensorBus {
    fn transaction(&mut self, address: u8, operations: &mut [I2cOperation<'_>]) -> Result<(), Self::Error> {
        if address != self.address {
            return Err(ErrorKind::NoAcknowledge(embedded_hal::i2c::NoAcknowledgeSource::Address));
        }
        for operation in operations {
            match operation {
                I2cOperation::Write(bytes) => self.pointer = bytes[0],
                I2cOperation::Read(buffer) => match self.pointer {
                    0x05 => buffer.copy_from_slice(&self.ambient),
                    _ => buffer.fill(0),
                },
            }
        }
        Ok(())
    }
}

#[test]
fn test_sensor_over_i2c() {
    let bus = SensorBus {
        address: Mcp9808::<()>::DEFAULT_ADDRESS,
        pointer: 0,
        ambient: [0x1f, 0xde],
    };
    let mut sensor = Mcp9808::new(I2cLink::new(bus, Mcp9808::<()>::DEFAULT_ADDRESS));

    assert_eq!(sensor.temperature().unwrap(), -2.125);
    let bus = sensor.release().release();
    assert_eq!(bus.pointer, 0x05);
}

#[test]
fn test_wrong_address_is_a_bus_error() {
    let bus = SensorBus {
        address: 0x19,
        pointer: 0,
        ambient: [0, 0],
    };
    let mut sensor = Mcp9808::new(I2cLink::new(bus, 0x18));
    assert!(sensor.temperature().is_err());
}

#[test]
fn test_hand_built_layouts_over_a_link() {
    let mut link = MockLink::new();
    let mut command = Pointer::layout().unwrap();
    command.set("command", RegisterPointer::DeviceId).unwrap();

    let mut response = RegisterLayout::word(vec![
        FieldDef::unsigned("device_id", Position::bits(1, 7, 0), 0),
        FieldDef::unsigned("revision", Position::bits(2, 7, 0), 0),
    ])
    .unwrap();

    link.respond_with(&[0x04, 0x00]);
    query(&mut link, &command, &mut response).unwrap();
    assert_eq!(response.get::<u8>("device_id"), Ok(0x04));

    write_from(&mut link, &response).unwrap();
    link.respond_with(&[0x04, 0x02]);
    read_into(&mut link, &mut response).unwrap();
    assert_eq!(response.get::<u8>("revision"), Ok(0x02));

    assert_eq!(
        link.operations(),
        vec![
            Operation::WriteRead {
                command: vec![0x07],
                response: vec![0x04, 0x00]
            },
            Operation::Write(vec![0x04, 0x00]),
            Operation::Read(vec![0x04, 0x02]),
        ]
    );
}

#[test]
fn test_failed_read_leaves_layout_unchanged() {
    let mut link = MockLink::new();
    let mut response = RegisterLayout::byte(vec![FieldDef::unsigned("value", Position::bits(1, 7, 0), 0x5A)]).unwrap();

    link.fail_next();
    assert!(read_into(&mut link, &mut response).is_err());
    assert_eq!(response.bytes(), &[0x5A]);
}

//! MCP9808 I2C temperature sensor.
//!
//! Datasheet: <https://ww1.microchip.com/downloads/en/DeviceDoc/25095A.pdf> (DS25095A).
//! Text and diagrams do not always agree about bit widths; the diagrams win.
//!
//! Every conversation starts with a write of the pointer byte, followed by a read or write of
//! the one or two bytes of the register it names.

use alloc::vec::Vec;

use crate::link::{query, DataLink, LinkError};
use crate::{
    AddressedRegister, ClosedEnum, ReadableRegister, Register, RegisterError, WriteableRegister,
};

/// Register selected by the pointer byte (REGISTER 5-1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, ClosedEnum)]
pub enum RegisterPointer {
    /// Configuration register (CONFIG)
    #[valued(0b0001)]
    Configuration,
    /// Alert Temperature Upper Boundary Trip register (TUPPER)
    #[valued(0b0010)]
    AlertUpper,
    /// Alert Temperature Lower Boundary Trip register (TLOWER)
    #[valued(0b0011)]
    AlertLower,
    /// Critical Temperature Trip register (TCRIT)
    #[valued(0b0100)]
    Critical,
    /// Temperature register (TA)
    #[valued(0b0101)]
    Temperature,
    #[valued(0b0110)]
    ManufacturerId,
    /// Device ID/Revision register
    #[valued(0b0111)]
    DeviceId,
    #[valued(0b1000)]
    Resolution,
}

/// Pointer (command) byte.
#[derive(Debug, Clone, PartialEq, Register, ReadableRegister, WriteableRegister)]
#[register(shape = "byte")]
pub struct Pointer {
    #[register(bits = "3..0", reset = RegisterPointer::Temperature)]
    pub command: RegisterPointer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ClosedEnum)]
pub enum LimitHysteresis {
    #[valued(0b00)]
    C0,
    #[valued(0b01)]
    C1_5,
    #[valued(0b10)]
    C3,
    #[valued(0b11)]
    C6,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ClosedEnum)]
pub enum PowerMode {
    #[valued(0)]
    ContinuousConversion,
    #[valued(1)]
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ClosedEnum)]
pub enum InterruptClear {
    #[valued(0)]
    NoEffect,
    #[valued(1)]
    ClearInterruptOutput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ClosedEnum)]
pub enum AlertControl {
    #[valued(0)]
    Disabled,
    #[valued(1)]
    Enabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ClosedEnum)]
pub enum AlertSelect {
    #[valued(0)]
    UpperLowerCritical,
    #[valued(1)]
    CriticalOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ClosedEnum)]
pub enum AlertPolarity {
    #[valued(0)]
    ActiveLow,
    #[valued(1)]
    ActiveHigh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ClosedEnum)]
pub enum AlertMode {
    #[valued(0)]
    ComparatorOutput,
    #[valued(1)]
    InterruptOutput,
}

/// Sensor configuration, read/write (REGISTER 5-2).
#[derive(Debug, Clone, PartialEq, Register, ReadableRegister, WriteableRegister)]
#[register(shape = "word", address = 0b0001)]
pub struct Configuration {
    #[register(bits = "10..9", reset = LimitHysteresis::C0)]
    pub hysteresis: LimitHysteresis,
    #[register(bit = 8, reset = PowerMode::ContinuousConversion)]
    pub shutdown: PowerMode,
    #[register(bit = 7)]
    pub critical_lock: bool,
    #[register(bit = 6)]
    pub window_lock: bool,
    #[register(bit = 5, reset = InterruptClear::NoEffect)]
    pub interrupt_clear: InterruptClear,
    /// Documented read-only; ignored by the chip on write.
    #[register(bit = 4)]
    pub alert_output_status: bool,
    #[register(bit = 3, reset = AlertControl::Disabled)]
    pub alert_control: AlertControl,
    #[register(bit = 2, reset = AlertSelect::UpperLowerCritical)]
    pub alert_select: AlertSelect,
    #[register(bit = 1, reset = AlertPolarity::ActiveLow)]
    pub alert_polarity: AlertPolarity,
    #[register(bit = 0, reset = AlertMode::ComparatorOutput)]
    pub alert_mode: AlertMode,
}

/// Alert upper/lower and critical limits, read/write (REGISTER 5-3).
///
/// Fixed point with two fractional bits: divide by 4 for degrees Celsius. The fraction is not
/// split out because its meaning depends on the sign.
#[derive(Debug, Clone, PartialEq, Register, ReadableRegister, WriteableRegister)]
#[register(shape = "word")]
pub struct TemperatureLimit {
    #[register(bits = "12..2", sign_extend)]
    pub quarter_celsius: i16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ClosedEnum)]
pub enum LimitFlag {
    #[valued(0)]
    WithinLimit,
    #[valued(1)]
    OutsideLimit,
}

/// Ambient temperature and alarm states, read-only (REGISTER 5-4).
#[derive(Debug, Clone, PartialEq, Register, ReadableRegister)]
#[register(shape = "word", address = 0b0101)]
pub struct AmbientTemperature {
    #[register(bit = 15, reset = LimitFlag::WithinLimit)]
    pub versus_critical: LimitFlag,
    #[register(bit = 14, reset = LimitFlag::WithinLimit)]
    pub versus_upper: LimitFlag,
    #[register(bit = 13, reset = LimitFlag::WithinLimit)]
    pub versus_lower: LimitFlag,
    #[register(bits = "12..0", sign_extend)]
    pub sixteenth_celsius: i16,
}

impl AmbientTemperature {
    /// Degrees Celsius.
    pub fn celsius(&self) -> f64 {
        f64::from(self.sixteenth_celsius) / 16.0
    }
}

/// Manufacturer ID, read-only (REGISTER 5-5).
#[derive(Debug, Clone, PartialEq, Register, ReadableRegister)]
#[register(shape = "word", address = 0b0110)]
pub struct ManufacturerId {
    #[register(bits = "15..0", reset = 0x0054)]
    pub manufacturer_id: u16,
}

/// Device ID and revision, read-only (REGISTER 5-6).
#[derive(Debug, Clone, PartialEq, Register, ReadableRegister)]
#[register(shape = "word", address = 0b0111)]
pub struct DeviceId {
    #[register(bits = "15..8", reset = 0x04)]
    pub device_id: u8,
    #[register(bits = "7..0")]
    pub revision: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ClosedEnum)]
pub enum Resolution {
    /// +0.5°C (tCONV = 30 ms typical)
    #[valued(0b00)]
    C0_5,
    /// +0.25°C (tCONV = 65 ms typical)
    #[valued(0b01)]
    C0_25,
    /// +0.125°C (tCONV = 130 ms typical)
    #[valued(0b10)]
    C0_125,
    /// +0.0625°C (power-up default, tCONV = 250 ms typical)
    #[valued(0b11)]
    C0_0625,
}

/// Conversion resolution, read/write (REGISTER 5-7).
#[derive(Debug, Clone, PartialEq, Register, ReadableRegister, WriteableRegister)]
#[register(shape = "byte", address = 0b1000)]
pub struct ResolutionRegister {
    #[register(bits = "1..0", reset = Resolution::C0_0625)]
    pub resolution: Resolution,
}

/// Which of the three limit registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Limit {
    Upper,
    Lower,
    Critical,
}

impl Limit {
    fn pointer(self) -> RegisterPointer {
        match self {
            Limit::Upper => RegisterPointer::AlertUpper,
            Limit::Lower => RegisterPointer::AlertLower,
            Limit::Critical => RegisterPointer::Critical,
        }
    }
}

/// MCP9808 on a [`DataLink`].
pub struct Mcp9808<L> {
    link: L,
}

impl<L> Mcp9808<L> {
    /// Base address; the three lower bits are set by hardware pins.
    pub const DEFAULT_ADDRESS: u8 = 0x18;
}

impl<L: DataLink> Mcp9808<L> {
    pub fn new(link: L) -> Self {
        Self { link }
    }

    pub fn release(self) -> L {
        self.link
    }

    /// Current temperature in degrees Celsius.
    pub fn temperature(&mut self) -> Result<f64, LinkError<L::Error>> {
        let ambient: AmbientTemperature = self.read_register()?;
        Ok(ambient.celsius())
    }

    /// Read any register that has a fixed pointer value.
    pub fn read_register<R>(&mut self) -> Result<R, LinkError<L::Error>>
    where
        R: AddressedRegister + ReadableRegister,
    {
        let pointer = Self::pointer_layout(Self::pointer_for(R::ADDRESS)?)?;
        let mut response = R::layout()?;
        query(&mut self.link, &pointer, &mut response)?;
        Ok(R::from_layout(&response)?)
    }

    /// Write a register: pointer byte and payload in one message.
    pub fn write_register<R>(&mut self, register: &R) -> Result<(), LinkError<L::Error>>
    where
        R: AddressedRegister + WriteableRegister,
    {
        self.write_to(Self::pointer_for(R::ADDRESS)?, &register.into_bytes()?)
    }

    /// Limit in degrees Celsius.
    pub fn limit(&mut self, limit: Limit) -> Result<f64, LinkError<L::Error>> {
        let pointer = Self::pointer_layout(limit.pointer())?;
        let mut response = TemperatureLimitLayout::new()?;
        query(&mut self.link, &pointer, &mut response)?;
        Ok(f64::from(response.get_quarter_celsius()?) / 4.0)
    }

    /// Set a limit, rounded toward zero to a quarter degree. Limits outside the register's
    /// range, and NaN or infinite limits, are rejected.
    pub fn set_limit(&mut self, limit: Limit, celsius: f64) -> Result<(), LinkError<L::Error>> {
        let mut register = TemperatureLimitLayout::new()?;
        if !celsius.is_finite() {
            let (min, max) = register.layout().field("quarter_celsius").map_or((0, 0), |spec| spec.bounds());
            return Err(RegisterError::OutOfRange {
                field: "quarter_celsius",
                value: 0,
                min,
                max,
            }
            .into());
        }
        register.set_quarter_celsius((celsius * 4.0) as i16)?;
        self.write_to(limit.pointer(), register.bytes())
    }

    pub fn set_resolution(&mut self, resolution: Resolution) -> Result<(), LinkError<L::Error>> {
        self.write_register(&ResolutionRegister { resolution })
    }

    fn pointer_for(address: u8) -> Result<RegisterPointer, RegisterError> {
        RegisterPointer::from_raw_value(u64::from(address)).ok_or(RegisterError::ConversionError {
            field: "command",
            raw: i128::from(address),
        })
    }

    fn pointer_layout(command: RegisterPointer) -> Result<PointerLayout, RegisterError> {
        let mut pointer = PointerLayout::new()?;
        pointer.set_command(command)?;
        Ok(pointer)
    }

    fn write_to(&mut self, command: RegisterPointer, payload: &[u8]) -> Result<(), LinkError<L::Error>> {
        let pointer = Self::pointer_layout(command)?;
        let mut message = Vec::with_capacity(pointer.bytes().len() + payload.len());
        message.extend_from_slice(pointer.bytes());
        message.extend_from_slice(payload);
        self.link.write(&message).map_err(LinkError::Bus)
    }
}

//! PCA9685 16-channel, 12-bit PWM controller.
//!
//! Datasheet: <https://www.nxp.com/docs/en/data-sheet/PCA9685.pdf>

use alloc::vec::Vec;

use crate::link::{DataLink, LinkError};
use crate::{
    AddressedRegister, ReadableRegister, Register, RegisterError, RegisterResult, WriteableRegister,
};

/// Counts per PWM period.
pub const RESOLUTION: u16 = 4096;

/// Mode register 1 (MODE1), datasheet 7.3.1.
#[derive(Debug, Clone, PartialEq, Register, ReadableRegister, WriteableRegister)]
#[register(shape = "byte", address = 0x00)]
pub struct Mode1 {
    /// Restart pending; see 7.3.1.1 for leaving restart.
    #[register(bit = 7)]
    pub restart: bool,
    /// Use the EXTCLK pin
    #[register(bit = 6)]
    pub external_clock: bool,
    /// Register address auto-increment
    #[register(bit = 5)]
    pub auto_increment: bool,
    /// Low power mode, oscillator off
    #[register(bit = 4, reset = true)]
    pub sleep: bool,
    #[register(bit = 3)]
    pub sub1: bool,
    #[register(bit = 2)]
    pub sub2: bool,
    #[register(bit = 1)]
    pub sub3: bool,
    /// Respond to the All Call address
    #[register(bit = 0, reset = true)]
    pub all_call: bool,
}

/// LEDn_ON_L through LEDn_OFF_H, datasheet 7.3.3.
///
/// Counts are little-endian on the wire, so each 12-bit count is split across a low and a high
/// field.
#[derive(Debug, Clone, PartialEq, Register, ReadableRegister, WriteableRegister)]
#[register(shape = "array")]
pub struct LedChannel {
    #[register(byte = 1, bits = "7..0")]
    pub on_low: u8,
    #[register(byte = 2, bit = 4)]
    pub full_on: bool,
    #[register(byte = 2, bits = "3..0")]
    pub on_high: u8,
    #[register(byte = 3, bits = "7..0")]
    pub off_low: u8,
    #[register(byte = 4, bit = 4, reset = true)]
    pub full_off: bool,
    #[register(byte = 4, bits = "3..0")]
    pub off_high: u8,
}

impl LedChannel {
    /// Output on at count 0, off after `on_counts` of [`RESOLUTION`].
    pub fn duty(on_counts: u16) -> RegisterResult<Self> {
        if on_counts > RESOLUTION {
            return Err(RegisterError::OutOfRange {
                field: "on_counts",
                value: i128::from(on_counts),
                min: 0,
                max: i128::from(RESOLUTION),
            });
        }
        let full_on = on_counts == RESOLUTION;
        let off = if full_on { 0 } else { on_counts };

        Ok(Self {
            on_low: 0,
            full_on,
            on_high: 0,
            off_low: (off & 0xFF) as u8,
            full_off: on_counts == 0,
            off_high: (off >> 8) as u8,
        })
    }
}

/// PCA9685 on a [`DataLink`].
pub struct Pca9685<L> {
    link: L,
}

impl<L> Pca9685<L> {
    /// Base address; hardware jumpers offset from here.
    pub const BASE_ADDRESS: u8 = 0x40;
    /// Address every PCA9685 answers when `all_call` is set.
    pub const ALL_CALL_ADDRESS: u8 = 0b111_0000;
    pub const CHANNEL_COUNT: u8 = 16;

    const LED0_ON_L: u8 = 0x06;
}

impl<L: DataLink> Pca9685<L> {
    /// Wake the controller with auto-increment enabled.
    pub fn new(mut link: L) -> Result<Self, LinkError<L::Error>> {
        let mode1 = Mode1 {
            auto_increment: true,
            sleep: false,
            ..Mode1::reset_value()?
        };
        Self::write_at(&mut link, Mode1::ADDRESS, &mode1.into_bytes()?)?;
        Ok(Self { link })
    }

    pub fn release(self) -> L {
        self.link
    }

    /// Set one output to `fraction` of the period, between 0.0 and 1.0.
    pub fn set(&mut self, channel: u8, fraction: f64) -> Result<(), LinkError<L::Error>> {
        if channel >= Self::CHANNEL_COUNT {
            return Err(RegisterError::OutOfRange {
                field: "channel",
                value: i128::from(channel),
                min: 0,
                max: i128::from(Self::CHANNEL_COUNT - 1),
            }
            .into());
        }
        if !(0.0..=1.0).contains(&fraction) {
            return Err(RegisterError::OutOfRange {
                field: "fraction",
                value: (fraction * f64::from(RESOLUTION)) as i128,
                min: 0,
                max: i128::from(RESOLUTION),
            }
            .into());
        }

        let on_counts = (fraction * f64::from(RESOLUTION)) as u16;
        let led = LedChannel::duty(on_counts)?;
        Self::write_at(&mut self.link, Self::LED0_ON_L + channel * 4, &led.into_bytes()?)
    }

    fn write_at(link: &mut L, address: u8, payload: &[u8]) -> Result<(), LinkError<L::Error>> {
        let mut message = Vec::with_capacity(1 + payload.len());
        message.push(address);
        message.extend_from_slice(payload);
        link.write(&message).map_err(LinkError::Bus)
    }
}

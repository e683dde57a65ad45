//! Strings of APA102-style shift-register LEDs driven over SPI.
//!
//! A transfer is a start frame of zeros, one 4-byte frame per LED, then an end frame of ones. The
//! string has no addresses and nothing to read back.

use alloc::vec::Vec;

use crate::link::{DataLink, LinkError};
use crate::{Overflow, Register, RegisterLayout, RegisterResult, WriteableRegister};

const START_FRAME: [u8; 4] = [0x00; 4];
const END_FRAME: [u8; 4] = [0xFF; 4];

/// Per-LED frame: marker, 5-bit global current, then blue, green, red.
#[derive(Debug, Clone, PartialEq, Register, WriteableRegister)]
#[register(shape = "array")]
pub struct LedFrame {
    /// Always `0b111`
    #[register(byte = 1, bits = "7..5", reset = 0b111)]
    pub marker: u8,
    /// Driving current in 31 steps; 0 is off
    #[register(byte = 1, bits = "4..0")]
    pub current: u8,
    #[register(byte = 2, bits = "7..0")]
    pub blue: u8,
    #[register(byte = 3, bits = "7..0")]
    pub green: u8,
    #[register(byte = 4, bits = "7..0")]
    pub red: u8,
}

/// Color with 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub const BLACK: Self = Self::new(0, 0, 0);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// From channel intensities between 0.0 and 1.0; anything outside is clipped.
    pub fn from_fractions(red: f64, green: f64, blue: f64) -> Self {
        fn channel(fraction: f64) -> u8 {
            // float to int casts saturate, and NaN becomes 0
            (fraction * 255.0) as u8
        }
        Self::new(channel(red), channel(green), channel(blue))
    }
}

/// A string of `count` LEDs on a [`DataLink`].
pub struct ShiftLed<L> {
    link: L,
    count: usize,
}

impl<L> ShiftLed<L> {
    /// Highest value of [`LedFrame::current`].
    pub const MAX_CURRENT: u8 = 0b1_1111;
}

impl<L: DataLink> ShiftLed<L> {
    pub fn new(link: L, count: usize) -> Self {
        Self { link, count }
    }

    pub fn release(self) -> L {
        self.link
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Light every LED with `color` at `current` (0 to [`MAX_CURRENT`](Self::MAX_CURRENT)).
    pub fn all(&mut self, color: Color, current: u8) -> Result<(), LinkError<L::Error>> {
        self.all_with(color, current, Overflow::Reject)
    }

    /// Like [`all`](Self::all), with `overflow` deciding what happens to a current above
    /// [`MAX_CURRENT`](Self::MAX_CURRENT).
    pub fn all_with(&mut self, color: Color, current: u8, overflow: Overflow) -> Result<(), LinkError<L::Error>> {
        let frame = Self::frame(color, current, overflow)?;

        let mut message = Vec::with_capacity(START_FRAME.len() + self.count * frame.len() + END_FRAME.len());
        message.extend_from_slice(&START_FRAME);
        for _ in 0..self.count {
            message.extend_from_slice(&frame);
        }
        message.extend_from_slice(&END_FRAME);

        #[cfg(feature = "defmt")]
        defmt::trace!("shift_led: {} frames of {=[u8]:x}", self.count, &frame[..]);

        self.link.write(&message).map_err(LinkError::Bus)
    }

    /// Turn every LED off.
    pub fn clear(&mut self) -> Result<(), LinkError<L::Error>> {
        self.all(Color::BLACK, 0)
    }

    fn frame(color: Color, current: u8, overflow: Overflow) -> RegisterResult<Vec<u8>> {
        let mut frame = LedFrameLayout::new()?;
        let layout: &mut RegisterLayout = frame.as_mut();
        layout.set_with("current", current, overflow)?;
        frame.set_red(color.red)?;
        frame.set_green(color.green)?;
        frame.set_blue(color.blue)?;
        Ok(frame.bytes().to_vec())
    }
}

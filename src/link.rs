//! Byte interchange with bus transports.
//!
//! The codec adds no framing: a command or pointer byte is just another layout written ahead of
//! the payload.

use alloc::vec;
use core::fmt;

use embedded_hal::i2c::I2c;

use crate::{RegisterError, RegisterLayout};

/// A device reachable over some bus. Each call is one bus message.
pub trait DataLink {
    type Error;

    /// Send `bytes` to the device.
    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Fill `buffer` from the device.
    fn read(&mut self, buffer: &mut [u8]) -> Result<(), Self::Error>;

    /// Send `command`, then fill `buffer`, in a single conversation.
    ///
    /// Commonly used in patterns like reading from a named register.
    fn write_read(&mut self, command: &[u8], buffer: &mut [u8]) -> Result<(), Self::Error>;
}

/// Failure of a transfer: either the bus, or the bytes it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkError<E> {
    Bus(E),
    Register(RegisterError),
}

impl<E> From<RegisterError> for LinkError<E> {
    fn from(value: RegisterError) -> Self {
        LinkError::Register(value)
    }
}

impl<E: fmt::Debug> fmt::Display for LinkError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::Bus(err) => write!(f, "bus error: {err:?}"),
            LinkError::Register(err) => write!(f, "{err}"),
        }
    }
}

/// Write the layout's bytes.
pub fn write_from<L, R>(link: &mut L, layout: &R) -> Result<(), LinkError<L::Error>>
where
    L: DataLink + ?Sized,
    R: AsRef<RegisterLayout> + ?Sized,
{
    link.write(layout.as_ref().bytes()).map_err(LinkError::Bus)
}

/// Read exactly as many bytes as the layout declares and load them.
pub fn read_into<L, R>(link: &mut L, layout: &mut R) -> Result<(), LinkError<L::Error>>
where
    L: DataLink + ?Sized,
    R: AsMut<RegisterLayout> + ?Sized,
{
    let layout = layout.as_mut();
    let mut received = vec![0; layout.len()];
    link.read(&mut received).map_err(LinkError::Bus)?;
    layout.load(&received)?;
    Ok(())
}

/// Write `command`, then read `response`, in one conversation.
pub fn query<L, C, R>(link: &mut L, command: &C, response: &mut R) -> Result<(), LinkError<L::Error>>
where
    L: DataLink + ?Sized,
    C: AsRef<RegisterLayout> + ?Sized,
    R: AsMut<RegisterLayout> + ?Sized,
{
    let response = response.as_mut();
    let mut received = vec![0; response.len()];
    link.write_read(command.as_ref().bytes(), &mut received)
        .map_err(LinkError::Bus)?;
    response.load(&received)?;
    Ok(())
}

/// [`DataLink`] to one node of an `embedded-hal` I2C bus.
pub struct I2cLink<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> I2cLink<I2C> {
    pub const fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Consume the link and return the I2C peripheral
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> DataLink for I2cLink<I2C>
where
    I2C: I2c,
{
    type Error = I2C::Error;

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.i2c.write(self.address, bytes)
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c.read(self.address, buffer)
    }

    fn write_read(&mut self, command: &[u8], buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c.write_read(self.address, command, buffer)
    }
}

impl<L: DataLink + ?Sized> DataLink for &mut L {
    type Error = L::Error;

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        (**self).write(bytes)
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<(), Self::Error> {
        (**self).read(buffer)
    }

    fn write_read(&mut self, command: &[u8], buffer: &mut [u8]) -> Result<(), Self::Error> {
        (**self).write_read(command, buffer)
    }
}

//! Register descriptions of supported chips, with the thin drivers that use them.

pub mod mcp9808;
pub mod pca9685;
pub mod shift_led;
pub mod tea5767;

pub use mcp9808::Mcp9808;
pub use pca9685::Pca9685;
pub use shift_led::ShiftLed;
pub use tea5767::Tea5767;

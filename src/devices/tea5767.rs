//! TEA5767 FM tuner.
//!
//! Datasheet: <https://www.voti.nl/docs/TEA5767.pdf> (NXP, rev. 05, 2007).
//!
//! The chip has no register addresses. Any write carries the whole 5-byte request, and any read
//! returns the 5-byte status; meaning depends only on byte position.

use crate::link::{read_into, write_from, DataLink, LinkError};
use crate::{ClosedEnum, ReadableRegister, Register, RegisterError, RegisterResult, WriteableRegister};

const INTERMEDIATE_FREQUENCY: f64 = 225_000.0;
const REFERENCE_FREQUENCY: f64 = 32_768.0;

/// PLL word for high side injection tuning to `mhz` (datasheet table 32, note 1).
pub fn pll(mhz: f64) -> u16 {
    let high_side_injection = 4.0 * (mhz * 1e6 + INTERMEDIATE_FREQUENCY) / REFERENCE_FREQUENCY;
    high_side_injection as u16
}

/// Carrier frequency in MHz for a high side injection PLL word. Inverse of [`pll`].
pub fn carrier_mhz(pll: u16) -> f64 {
    let frequency = f64::from(pll) * REFERENCE_FREQUENCY / 4.0 - INTERMEDIATE_FREQUENCY;
    frequency / 1e6
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ClosedEnum)]
pub enum TuningMode {
    #[valued(0)]
    Direct,
    #[valued(1)]
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ClosedEnum)]
pub enum SearchDirection {
    #[valued(0)]
    Down,
    #[valued(1)]
    Up,
}

/// ADC level at which a search stops. `0b00` is not allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ClosedEnum)]
pub enum SearchStopLevel {
    #[valued(0b01)]
    Low,
    #[valued(0b10)]
    Medium,
    #[valued(0b11)]
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ClosedEnum)]
pub enum Injection {
    #[valued(0)]
    LowSide,
    #[valued(1)]
    HighSide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ClosedEnum)]
pub enum BandLimits {
    /// 87.5 to 108 MHz
    #[valued(0)]
    UsEurope,
    /// 76 to 91 MHz
    #[valued(1)]
    Japan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ClosedEnum)]
pub enum PllReference {
    #[valued(0)]
    Disabled,
    #[valued(1)]
    Mhz6_5,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ClosedEnum)]
pub enum Deemphasis {
    #[valued(0)]
    Us50,
    #[valued(1)]
    Us75,
}

/// Write data (datasheet tables 14 to 24). Bits 5..0 of byte 5 are unused.
#[derive(Debug, Clone, PartialEq, Register, ReadableRegister, WriteableRegister)]
#[register(shape = "array")]
pub struct Request {
    // Byte 1
    #[register(byte = 1, bit = 7)]
    pub muted: bool,
    #[register(byte = 1, bit = 6, reset = TuningMode::Direct)]
    pub search_mode: TuningMode,
    #[register(bytes = "1..2", bits = "5..0")]
    pub pll: u16,

    // Byte 3
    #[register(byte = 3, bit = 7, reset = SearchDirection::Up)]
    pub search_direction: SearchDirection,
    #[register(byte = 3, bits = "6..5", reset = SearchStopLevel::High)]
    pub search_stop_level: SearchStopLevel,
    #[register(byte = 3, bit = 4, reset = Injection::HighSide)]
    pub injection: Injection,
    #[register(byte = 3, bit = 3)]
    pub forced_mono: bool,
    #[register(byte = 3, bit = 2)]
    pub mute_right: bool,
    #[register(byte = 3, bit = 1)]
    pub mute_left: bool,
    #[register(byte = 3, bit = 0)]
    pub software_port_1: bool,

    // Byte 4
    #[register(byte = 4, bit = 7)]
    pub software_port_2: bool,
    #[register(byte = 4, bit = 6)]
    pub standby: bool,
    #[register(byte = 4, bit = 5, reset = BandLimits::UsEurope)]
    pub band_limits: BandLimits,
    /// Selects the 32.768 kHz crystal together with `pll_reference`.
    #[register(byte = 4, bit = 4, reset = 1)]
    pub xtal: u8,
    #[register(byte = 4, bit = 3)]
    pub soft_mute: bool,
    #[register(byte = 4, bit = 2)]
    pub high_cut_control: bool,
    #[register(byte = 4, bit = 1)]
    pub stereo_noise_cancelling: bool,

    // Byte 5
    #[register(byte = 5, bit = 7, reset = PllReference::Disabled)]
    pub pll_reference: PllReference,
    #[register(byte = 5, bit = 6, reset = Deemphasis::Us50)]
    pub deemphasis: Deemphasis,
}

/// Read data (datasheet tables 25 to 31).
#[derive(Debug, Clone, PartialEq, Register, ReadableRegister)]
#[register(shape = "array")]
pub struct Status {
    /// Station found, band limit reached, or tuning settled
    #[register(byte = 1, bit = 7, reset = true)]
    pub ready: bool,
    #[register(byte = 1, bit = 6)]
    pub band_limit_reached: bool,
    #[register(bytes = "1..2", bits = "5..0")]
    pub pll: u16,
    #[register(byte = 3, bit = 7)]
    pub stereo: bool,
    /// IF counter result
    #[register(byte = 3, bits = "6..0")]
    pub if_counter: u8,
    #[register(byte = 4, bits = "7..4")]
    pub adc_level: u8,
    #[register(byte = 4, bits = "3..1")]
    pub chip_id: u8,
    /// Reserved for future extensions; the chip always sends it.
    #[register(byte = 5, bits = "7..0")]
    pub reserved: u8,
}

/// TEA5767 on a [`DataLink`].
///
/// Requests accumulate in a local buffer and are sent together by
/// [`execute_requests`](Self::execute_requests). Status getters answer from the last
/// [`update_status`](Self::update_status).
pub struct Tea5767<L> {
    link: L,
    request: RequestLayout,
    status: StatusLayout,
}

impl<L> Tea5767<L> {
    pub const DEFAULT_ADDRESS: u8 = 0x60;
}

impl<L: DataLink> Tea5767<L> {
    pub fn new(link: L) -> RegisterResult<Self> {
        Ok(Self {
            link,
            request: RequestLayout::new()?,
            status: StatusLayout::new()?,
        })
    }

    pub fn release(self) -> L {
        self.link
    }

    /// Pending request, for settings without a dedicated method.
    pub fn request(&mut self) -> &mut RequestLayout {
        &mut self.request
    }

    /// Include tuning to `mhz` in the pending request.
    pub fn tune_to(&mut self, mhz: f64) -> RegisterResult<()> {
        if !mhz.is_finite() {
            return Err(RegisterError::OutOfRange {
                field: "pll",
                value: 0,
                min: 0,
                max: (1 << 14) - 1,
            });
        }
        self.request.set_pll(pll(mhz))
    }

    /// Send the pending request.
    pub fn execute_requests(&mut self) -> Result<(), LinkError<L::Error>> {
        #[cfg(feature = "defmt")]
        defmt::trace!("tea5767: request {=[u8]:x}", self.request.bytes());

        write_from(&mut self.link, &self.request)
    }

    /// Read the status block.
    pub fn update_status(&mut self) -> Result<(), LinkError<L::Error>> {
        read_into(&mut self.link, &mut self.status)
    }

    /// Frequency in MHz reported by the last status update.
    pub fn tuning(&self) -> RegisterResult<f64> {
        Ok(carrier_mhz(self.status.get_pll()?))
    }

    pub fn ready(&self) -> RegisterResult<bool> {
        self.status.get_ready()
    }

    pub fn stereo_tuned(&self) -> RegisterResult<bool> {
        self.status.get_stereo()
    }

    pub fn status(&self) -> RegisterResult<Status> {
        self.status.snapshot()
    }
}

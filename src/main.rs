//! # Register-Layout Example Application

use register_layout::devices::mcp9808::{AmbientTemperature, Configuration, ConfigurationLayout, PowerMode};
use register_layout::devices::tea5767::{self, RequestLayout};
use register_layout::*;

#[derive(Register, ReadableRegister, WriteableRegister, Debug)]
#[register(shape = "byte", address = 0xC0)]
pub struct MyRegister {
    /// Reserved
    #[register(bits = "4..0", reset = 0b11111)]
    reserved: u8,
    /// A Boolean field
    #[register(bit = 5, reset = false)]
    boolean_state: bool,
    /// A closed set of states
    #[register(bits = "7..6", reset = SomeState::StateOne)]
    something_else: SomeState,
}

#[derive(Clone, Copy, Debug, ClosedEnum)]
enum SomeState {
    #[valued(0)]
    StateOne,
    #[valued(1)]
    StateTwo,
}

fn main() -> Result<(), RegisterError> {
    let mut my_register = MyRegister::reset_value()?;
    my_register.something_else = SomeState::StateTwo;

    println!("ADDRESS = {:#x}\nLENGTH = {}", MyRegister::ADDRESS, MyRegister::LENGTH);
    println!("MyRegister: {my_register:?}");

    let buffer = my_register.into_bytes()?;
    println!("Buffer[{}]: {:?}\nBuffer[0]: {:08b}", buffer.len(), buffer, buffer[0]);

    let read_register = MyRegister::from_bytes(&buffer)?;
    println!("Read: {read_register:?}");

    // Unknown enum bits are reported, not guessed
    println!("0b1100_0000: {:?}", MyRegister::from_bytes(&[0b1100_0000]));

    let ambient = AmbientTemperature::from_bytes(&[0x1f, 0xde])?;
    println!("MCP9808 ambient {ambient:?} = {} °C", ambient.celsius());

    let mut config = ConfigurationLayout::new()?;
    config.set_shutdown(PowerMode::Shutdown)?;
    println!("MCP9808 config {:?} -> {:02x?} (register {:#x})", config.layout(), config.bytes(), Configuration::ADDRESS);

    let mut request = RequestLayout::new()?;
    request.set_pll(tea5767::pll(101.1))?;
    println!("TEA5767 request for 101.1 MHz: {:02x?}", request.bytes());
    println!("  decodes back to {:.3} MHz", tea5767::carrier_mhz(request.get_pll()?));

    Ok(())
}

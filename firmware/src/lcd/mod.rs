//! Driver for 240x240 ST7789 IPS panels over SPI
//!
//! Pixels are written as 16-bit RGB565, most significant byte first, which is
//! the byte layout [`Framebuffer`](crate::framebuffer::Framebuffer) keeps.

mod command;

use command::Command;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;

/// Display width in pixels
pub const WIDTH: u32 = 240;
/// Display height in pixels
pub const HEIGHT: u32 = 240;
/// Buffer size: 2 bytes per pixel
pub const BUFFER_SIZE: usize = WIDTH as usize * HEIGHT as usize * 2;

/// COLMOD value for 65k colours, 16 bits per pixel
const COLMOD_RGB565: u8 = 0x55;

/// Driver for the ST7789 panel
pub struct St7789<SPI, DC, RST> {
    spi: SPI,
    dc: DC,
    rst: RST,
}

impl<SPI, DC, RST> St7789<SPI, DC, RST>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
{
    /// Create a new display driver instance.
    ///
    /// Performs hardware reset and initialization.
    pub fn new<DELAY: DelayNs>(
        spi: SPI,
        dc: DC,
        rst: RST,
        delay: &mut DELAY,
    ) -> Result<Self, SPI::Error> {
        let mut lcd = Self { spi, dc, rst };

        lcd.hardware_reset(delay);
        lcd.init(delay)?;

        Ok(lcd)
    }

    /// Hardware reset sequence
    fn hardware_reset<DELAY: DelayNs>(&mut self, delay: &mut DELAY) {
        let _ = self.rst.set_high();
        delay.delay_ms(10);
        let _ = self.rst.set_low();
        delay.delay_ms(10);
        let _ = self.rst.set_high();
        delay.delay_ms(120);
    }

    /// Send a command to the display
    fn send_command(&mut self, command: Command) -> Result<(), SPI::Error> {
        let _ = self.dc.set_low();
        self.spi.write(&[command.addr()])
    }

    /// Send data to the display
    fn send_data(&mut self, data: &[u8]) -> Result<(), SPI::Error> {
        let _ = self.dc.set_high();
        self.spi.write(data)
    }

    /// Send command followed by data
    fn cmd_with_data(&mut self, command: Command, data: &[u8]) -> Result<(), SPI::Error> {
        self.send_command(command)?;
        self.send_data(data)
    }

    fn init<DELAY: DelayNs>(&mut self, delay: &mut DELAY) -> Result<(), SPI::Error> {
        self.send_command(Command::SWRESET)?;
        delay.delay_ms(150);

        self.send_command(Command::SLPOUT)?;
        delay.delay_ms(120);

        self.cmd_with_data(Command::COLMOD, &[COLMOD_RGB565])?;
        delay.delay_ms(10);

        // Top-to-bottom, left-to-right, RGB order
        self.cmd_with_data(Command::MADCTL, &[0x00])?;

        self.set_window(0, 0, WIDTH as u16 - 1, HEIGHT as u16 - 1)?;

        // IPS panels need inversion for correct colours
        self.send_command(Command::INVON)?;
        delay.delay_ms(10);

        self.send_command(Command::NORON)?;
        delay.delay_ms(10);

        self.send_command(Command::DISPON)?;
        delay.delay_ms(10);

        Ok(())
    }

    /// Set the RAM window written by the next `RAMWR` (inclusive bounds)
    fn set_window(&mut self, x0: u16, y0: u16, x1: u16, y1: u16) -> Result<(), SPI::Error> {
        let [x0h, x0l] = x0.to_be_bytes();
        let [x1h, x1l] = x1.to_be_bytes();
        self.cmd_with_data(Command::CASET, &[x0h, x0l, x1h, x1l])?;

        let [y0h, y0l] = y0.to_be_bytes();
        let [y1h, y1l] = y1.to_be_bytes();
        self.cmd_with_data(Command::RASET, &[y0h, y0l, y1h, y1l])
    }

    /// Display a raw buffer (must be BUFFER_SIZE bytes, RGB565 big-endian)
    pub fn display(&mut self, buffer: &[u8]) -> Result<(), SPI::Error> {
        self.set_window(0, 0, WIDTH as u16 - 1, HEIGHT as u16 - 1)?;
        self.cmd_with_data(Command::RAMWR, buffer)
    }
}

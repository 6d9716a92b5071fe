//! Framebuffer for the 240x240 RGB565 panel
//!
//! Pixels are stored row-major as big-endian RGB565, two bytes per pixel, so
//! the buffer can be sent to the panel as-is.
//!
//! The framebuffer is allocated dynamically from PSRAM to avoid exhausting internal SRAM.

use crate::lcd::{BUFFER_SIZE, HEIGHT, WIDTH};
use alloc::boxed::Box;
use alloc::vec;
use core::convert::Infallible;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::prelude::*;

extern crate alloc;

/// Framebuffer for the 240x240 16-bit display
/// Uses heap allocation to avoid static memory exhaustion
pub struct Framebuffer {
    buffer: Box<[u8]>,
}

impl Framebuffer {
    /// Create a new framebuffer initialized to black
    /// Allocates from heap (should be called after PSRAM heap is initialized)
    pub fn new() -> Self {
        Self {
            buffer: vec![0u8; BUFFER_SIZE].into_boxed_slice(),
        }
    }

    /// Fill the entire framebuffer with a single color
    pub fn fill(&mut self, color: Rgb565) {
        let [hi, lo] = RawU16::from(color).into_inner().to_be_bytes();
        for px in self.buffer.chunks_exact_mut(2) {
            px[0] = hi;
            px[1] = lo;
        }
    }

    /// Get the raw buffer slice for sending to the display
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer[..]
    }

    /// Write a single pixel at (x, y), ignoring out-of-range coordinates
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgb565) {
        if x >= WIDTH || y >= HEIGHT {
            return;
        }

        let idx = (y as usize * WIDTH as usize + x as usize) * 2;
        let [hi, lo] = RawU16::from(color).into_inner().to_be_bytes();
        self.buffer[idx] = hi;
        self.buffer[idx + 1] = lo;
    }

    /// Read back a single pixel
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb565> {
        if x >= WIDTH || y >= HEIGHT {
            return None;
        }

        let idx = (y as usize * WIDTH as usize + x as usize) * 2;
        let raw = u16::from_be_bytes([self.buffer[idx], self.buffer[idx + 1]]);
        Some(Rgb565::from(RawU16::new(raw)))
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

// embedded-graphics integration
impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH, HEIGHT)
    }
}

impl DrawTarget for Framebuffer {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) {
                self.set_pixel(x, y, color);
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill(color);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    #[test]
    fn test_big_endian_layout() {
        let mut fb = Framebuffer::new();
        // 0b11111_000000_00000
        fb.set_pixel(1, 0, Rgb565::RED);
        assert_eq!(&fb.as_slice()[2..4], &[0xF8, 0x00]);
        assert_eq!(fb.pixel(1, 0), Some(Rgb565::RED));
        assert_eq!(fb.pixel(0, 0), Some(Rgb565::BLACK));
    }

    #[test]
    fn test_out_of_range_is_clipped() {
        let mut fb = Framebuffer::new();
        fb.set_pixel(WIDTH, 0, Rgb565::WHITE);
        fb.set_pixel(0, HEIGHT, Rgb565::WHITE);
        assert!(fb.as_slice().iter().all(|&b| b == 0));
        assert_eq!(fb.pixel(WIDTH, 0), None);

        Rectangle::new(Point::new(-10, -10), Size::new(20, 20))
            .into_styled(PrimitiveStyle::with_fill(Rgb565::WHITE))
            .draw(&mut fb)
            .unwrap();
        assert_eq!(fb.pixel(9, 9), Some(Rgb565::WHITE));
        assert_eq!(fb.pixel(10, 10), Some(Rgb565::BLACK));
    }

    #[test]
    fn test_clear() {
        let mut fb = Framebuffer::new();
        fb.clear(Rgb565::BLUE).unwrap();
        assert_eq!(fb.pixel(0, 0), Some(Rgb565::BLUE));
        assert_eq!(fb.pixel(WIDTH - 1, HEIGHT - 1), Some(Rgb565::BLUE));
        assert_eq!(fb.as_slice().len(), BUFFER_SIZE);
    }
}

//! Fingerprint bitmaps and BMP export

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use bytes::Bytes;

use crate::error::{Error, Result};

const FILE_HEADER_SIZE: u32 = 14;
const INFO_HEADER_SIZE: u32 = 40;
const PALETTE_SIZE: u32 = 256 * 4;
const PIXELS_PER_METER: i32 = 2835;

/// 8-bit grayscale image, rows top to bottom
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintImage {
    width: usize,
    height: usize,
    pixels: Bytes,
}

impl FingerprintImage {
    /// Wrap `pixels` as a `width` x `height` image
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the buffer length is not
    /// `width * height`.
    pub fn new(width: usize, height: usize, pixels: impl Into<Bytes>) -> Result<Self> {
        let pixels = pixels.into();
        if width == 0 || height == 0 || pixels.len() != width * height {
            return Err(Error::Validation(format!(
                "{} bytes do not form a {}x{} image",
                pixels.len(),
                width,
                height
            )));
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw pixel buffer
    pub fn pixels(&self) -> &Bytes {
        &self.pixels
    }

    /// Row `y`, counted from the top
    pub fn row(&self, y: usize) -> Option<&[u8]> {
        (y < self.height).then(|| &self.pixels[y * self.width..(y + 1) * self.width])
    }

    fn stride(&self) -> usize {
        (self.width + 3) & !3
    }

    /// Size of the encoded BMP file
    pub fn bmp_size(&self) -> usize {
        (FILE_HEADER_SIZE + INFO_HEADER_SIZE + PALETTE_SIZE) as usize
            + self.stride() * self.height
    }

    /// Encode as an 8-bit palettized grayscale BMP
    pub fn write_bmp<W: Write>(&self, mut writer: W) -> Result<()> {
        let offset = FILE_HEADER_SIZE + INFO_HEADER_SIZE + PALETTE_SIZE;
        let stride = self.stride();
        let image_size = (stride * self.height) as u32;

        // BITMAPFILEHEADER
        writer.write_all(b"BM")?;
        writer.write_u32::<LittleEndian>(offset + image_size)?;
        writer.write_u16::<LittleEndian>(0)?;
        writer.write_u16::<LittleEndian>(0)?;
        writer.write_u32::<LittleEndian>(offset)?;

        // BITMAPINFOHEADER, positive height means bottom-up rows
        writer.write_u32::<LittleEndian>(INFO_HEADER_SIZE)?;
        writer.write_i32::<LittleEndian>(self.width as i32)?;
        writer.write_i32::<LittleEndian>(self.height as i32)?;
        writer.write_u16::<LittleEndian>(1)?;
        writer.write_u16::<LittleEndian>(8)?;
        writer.write_u32::<LittleEndian>(0)?;
        writer.write_u32::<LittleEndian>(image_size)?;
        writer.write_i32::<LittleEndian>(PIXELS_PER_METER)?;
        writer.write_i32::<LittleEndian>(PIXELS_PER_METER)?;
        writer.write_u32::<LittleEndian>(256)?;
        writer.write_u32::<LittleEndian>(0)?;

        for level in 0..=255u8 {
            writer.write_all(&[level, level, level, 0])?;
        }

        let padding = vec![0u8; stride - self.width];
        for row in self.pixels.chunks_exact(self.width).rev() {
            writer.write_all(row)?;
            writer.write_all(&padding)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Write the image to `path` as BMP
    pub fn save_bmp(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        self.write_bmp(BufWriter::new(file))
    }
}

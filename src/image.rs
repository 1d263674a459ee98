use std::fmt;

use crate::buffer::{Luma, PixelBuffer, Rgb};
use crate::header::{
    ColorTable, FileHeader, InfoHeader, BITMAPINFOHEADER_SIZE, BI_RGB, BMP_SIGNATURE,
    COLOR_TABLE_ENTRIES, COLOR_TABLE_SIZE, HEADERS_SIZE,
};
use crate::{ImageError, ImageResult};

const DEFAULT_RESOLUTION: i32 = 2835; // 72 dpi in pixels per metre

/// Bytes in one 8-bit row once padded to a 4 byte boundary.
pub(crate) fn padded_row_len(width: u32) -> usize {
    (width as usize + 3) & !3
}

/// Position of pixel `(x, y)` of a 24-bit image relative to the start of
/// the pixel array. Row 0 is the top of the image, so bottom-up files are
/// flipped here. Rows are assumed to be tightly packed.
///
/// Decoding and encoding both go through this function.
#[inline]
pub(crate) fn rgb_raster_offset(info: &InfoHeader, x: u32, y: u32) -> usize {
    let (width, height) = info.dimensions();
    let row = if info.top_down() { y } else { height - 1 - y };
    (row as usize * width as usize + x as usize) * 3
}

fn fresh_info_header(width: u32, height: u32, bit_count: u16, image_size: u32) -> InfoHeader {
    InfoHeader {
        size: BITMAPINFOHEADER_SIZE,
        width: width as i32,
        height: height as i32,
        planes: 1,
        bit_count,
        compression: BI_RGB,
        image_size,
        x_resolution: DEFAULT_RESOLUTION,
        y_resolution: DEFAULT_RESOLUTION,
        colors_used: 0,
        colors_important: 0,
    }
}

fn check_dimensions(info: &InfoHeader, buffer: (u32, u32)) -> ImageResult<()> {
    let header = info.dimensions();
    if header != buffer {
        return Err(ImageError::DimensionMismatch { header, buffer });
    }
    Ok(())
}

/// An 8-bit palette-indexed image.
///
/// The pixel buffer holds the first `width * height` bytes of the raster
/// exactly as stored, addressed `row * width + col`. Whatever the declared
/// raster holds beyond that (row padding) is carried along untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct GrayImage {
    file_header: FileHeader,
    info_header: InfoHeader,
    color_table: ColorTable,
    pixels: PixelBuffer<Luma>,
    tail: Vec<u8>,
}

impl GrayImage {
    /// A black image with an identity gray palette.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero or does not fit in an `i32`.
    pub fn new(width: u32, height: u32) -> GrayImage {
        assert!(width > 0 && height > 0, "empty image");
        assert!(width <= i32::max_value() as u32 && height <= i32::max_value() as u32);

        let raster_len = padded_row_len(width) * height as usize;
        let offset = HEADERS_SIZE + COLOR_TABLE_SIZE as u32;
        let pixels = PixelBuffer::new(width, height);
        let tail = vec![0; raster_len - pixels.len()];

        let mut info_header = fresh_info_header(width, height, 8, raster_len as u32);
        info_header.colors_used = COLOR_TABLE_ENTRIES as u32;

        GrayImage {
            file_header: FileHeader {
                signature: BMP_SIGNATURE,
                file_size: offset + raster_len as u32,
                reserved1: 0,
                reserved2: 0,
                offset,
            },
            info_header,
            color_table: ColorTable::grayscale(),
            pixels,
            tail,
        }
    }

    pub(crate) fn from_parts(
        file_header: FileHeader,
        info_header: InfoHeader,
        color_table: ColorTable,
        mut raster: Vec<u8>,
    ) -> ImageResult<GrayImage> {
        let (width, height) = info_header.dimensions();
        let len = width as usize * height as usize;
        if raster.len() < len {
            // The raster cannot even hold one byte per pixel.
            return Err(ImageError::DimensionMismatch {
                header: (width, height),
                buffer: (width, (raster.len() / width as usize) as u32),
            });
        }

        let tail = raster.split_off(len);
        let samples = raster.into_iter().map(|v| Luma([v])).collect();
        let pixels = PixelBuffer::from_vec(width, height, samples).ok_or(
            ImageError::DimensionMismatch {
                header: (width, height),
                buffer: (width, height),
            },
        )?;

        Ok(GrayImage {
            file_header,
            info_header,
            color_table,
            pixels,
            tail,
        })
    }

    pub fn file_header(&self) -> &FileHeader {
        &self.file_header
    }

    pub fn info_header(&self) -> &InfoHeader {
        &self.info_header
    }

    pub fn color_table(&self) -> &ColorTable {
        &self.color_table
    }

    pub fn pixels(&self) -> &PixelBuffer<Luma> {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut PixelBuffer<Luma> {
        &mut self.pixels
    }

    /// Raster bytes past the last addressed pixel.
    pub fn tail(&self) -> &[u8] {
        &self.tail
    }

    /// Length of the whole raster in bytes.
    pub fn raster_len(&self) -> usize {
        self.pixels.len() + self.tail.len()
    }

    pub fn check_dimensions(&self) -> ImageResult<()> {
        check_dimensions(&self.info_header, self.pixels.dimensions())
    }
}

/// A 24-bit RGB image, row 0 at the top.
#[derive(Clone, Debug, PartialEq)]
pub struct RgbImage {
    file_header: FileHeader,
    info_header: InfoHeader,
    pixels: PixelBuffer<Rgb>,
}

impl RgbImage {
    /// A black image with tightly packed rows.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero or does not fit in an `i32`.
    pub fn new(width: u32, height: u32) -> RgbImage {
        assert!(width > 0 && height > 0, "empty image");
        assert!(width <= i32::max_value() as u32 && height <= i32::max_value() as u32);

        let raster_len = width as usize * height as usize * 3;
        RgbImage {
            file_header: FileHeader {
                signature: BMP_SIGNATURE,
                file_size: HEADERS_SIZE + raster_len as u32,
                reserved1: 0,
                reserved2: 0,
                offset: HEADERS_SIZE,
            },
            info_header: fresh_info_header(width, height, 24, raster_len as u32),
            pixels: PixelBuffer::new(width, height),
        }
    }

    pub(crate) fn from_parts(
        file_header: FileHeader,
        info_header: InfoHeader,
        pixels: PixelBuffer<Rgb>,
    ) -> ImageResult<RgbImage> {
        check_dimensions(&info_header, pixels.dimensions())?;
        Ok(RgbImage {
            file_header,
            info_header,
            pixels,
        })
    }

    pub fn file_header(&self) -> &FileHeader {
        &self.file_header
    }

    pub fn info_header(&self) -> &InfoHeader {
        &self.info_header
    }

    pub fn pixels(&self) -> &PixelBuffer<Rgb> {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut PixelBuffer<Rgb> {
        &mut self.pixels
    }

    pub fn check_dimensions(&self) -> ImageResult<()> {
        check_dimensions(&self.info_header, self.pixels.dimensions())
    }
}

/// A decoded BMP of either supported depth.
#[derive(Clone, Debug, PartialEq)]
pub enum Image {
    Gray(GrayImage),
    Rgb(RgbImage),
}

impl Image {
    pub fn file_header(&self) -> &FileHeader {
        match self {
            Image::Gray(img) => img.file_header(),
            Image::Rgb(img) => img.file_header(),
        }
    }

    pub fn info_header(&self) -> &InfoHeader {
        match self {
            Image::Gray(img) => img.info_header(),
            Image::Rgb(img) => img.info_header(),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Image::Gray(img) => img.pixels().dimensions(),
            Image::Rgb(img) => img.pixels().dimensions(),
        }
    }

    pub fn bit_depth(&self) -> u16 {
        self.info_header().bit_count
    }

    pub fn check_dimensions(&self) -> ImageResult<()> {
        match self {
            Image::Gray(img) => img.check_dimensions(),
            Image::Rgb(img) => img.check_dimensions(),
        }
    }

    /// The headline numbers shown to a user.
    pub fn info(&self) -> ImageInfo {
        let (width, height) = self.dimensions();
        let raw_size = match self {
            Image::Gray(img) => img.raster_len() as u32,
            Image::Rgb(img) => match img.info_header().image_size {
                0 => width.saturating_mul(height).saturating_mul(3),
                size => size,
            },
        };
        ImageInfo {
            width,
            height,
            bit_depth: self.bit_depth(),
            raw_size,
        }
    }
}

impl From<GrayImage> for Image {
    fn from(img: GrayImage) -> Image {
        Image::Gray(img)
    }
}

impl From<RgbImage> for Image {
    fn from(img: RgbImage) -> Image {
        Image::Rgb(img)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u16,
    /// Size of the pixel array in bytes.
    pub raw_size: u32,
}

impl fmt::Display for ImageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Image info")?;
        writeln!(f, "    Width      : {} px", self.width)?;
        writeln!(f, "    Height     : {} px", self.height)?;
        writeln!(f, "    Depth      : {} bits", self.bit_depth)?;
        write!(f, "    Raw size   : {} bytes", self.raw_size)
    }
}

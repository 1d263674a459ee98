use std::io::{Read, Seek, SeekFrom};

use log::{debug, trace, warn};

use crate::buffer::{PixelBuffer, Rgb};
use crate::header::{ColorTable, FileHeader, InfoHeader, COLOR_TABLE_SIZE, HEADERS_SIZE};
use crate::image::{padded_row_len, rgb_raster_offset, GrayImage, Image, RgbImage};
use crate::{ImageError, ImageResult};

/// A BMP decoder for uncompressed 8-bit and 24-bit images.
///
/// Both headers are read and validated on construction; the pixel array is
/// only touched by the `read_*` methods.
pub struct BMPDecoder<R> {
    reader: R,
    stream_len: u64,
    file_header: FileHeader,
    info_header: InfoHeader,
}

impl<R: Read + Seek> BMPDecoder<R> {
    /// Create a new decoder that decodes from the stream `reader`
    pub fn new(mut reader: R) -> ImageResult<BMPDecoder<R>> {
        let stream_len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        let file_header = FileHeader::read_from(&mut reader)?;
        let info_header = InfoHeader::read_from(&mut reader)?;

        match info_header.bit_count {
            8 | 24 => {}
            bits => return Err(ImageError::UnsupportedDepth(bits)),
        }
        info_header.validate()?;

        if u64::from(file_header.offset) > stream_len {
            return Err(ImageError::FormatError(format!(
                "Pixel array offset {} is past the end of the file ({} bytes)",
                file_header.offset, stream_len
            )));
        }

        trace!(
            "BMP headers: {:?} {:?}, {} bytes in stream",
            file_header,
            info_header,
            stream_len
        );

        Ok(BMPDecoder {
            reader,
            stream_len,
            file_header,
            info_header,
        })
    }

    pub fn file_header(&self) -> &FileHeader {
        &self.file_header
    }

    pub fn info_header(&self) -> &InfoHeader {
        &self.info_header
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.info_header.dimensions()
    }

    pub fn bit_count(&self) -> u16 {
        self.info_header.bit_count
    }

    /// Decodes whichever depth the file declares.
    pub fn read_image(self) -> ImageResult<Image> {
        match self.info_header.bit_count {
            8 => self.read_gray8().map(Image::Gray),
            _ => self.read_rgb24().map(Image::Rgb),
        }
    }

    /// Ensures `len` bytes starting at the pixel array offset are present.
    fn check_raster_fits(&self, len: u64) -> ImageResult<()> {
        if u64::from(self.file_header.offset) + len > self.stream_len {
            return Err(ImageError::TruncatedRead);
        }
        Ok(())
    }

    fn read_raster(&mut self, len: usize) -> ImageResult<Vec<u8>> {
        self.check_raster_fits(len as u64)?;
        self.reader
            .seek(SeekFrom::Start(u64::from(self.file_header.offset)))?;
        let mut raster = vec![0; len];
        self.reader.read_exact(&mut raster)?;
        Ok(raster)
    }

    /// Decodes an 8-bit image: headers, the 256 entry palette, then the
    /// declared raster copied verbatim from the pixel array offset.
    pub fn read_gray8(mut self) -> ImageResult<GrayImage> {
        if self.info_header.bit_count != 8 {
            return Err(ImageError::UnsupportedDepth(self.info_header.bit_count));
        }

        self.reader.seek(SeekFrom::Start(u64::from(HEADERS_SIZE)))?;
        let color_table = ColorTable::read_from(&mut self.reader)?;

        let palette_end = HEADERS_SIZE + COLOR_TABLE_SIZE as u32;
        if self.file_header.offset < palette_end {
            return Err(ImageError::FormatError(format!(
                "Pixel array offset {} overlaps the color table",
                self.file_header.offset
            )));
        }

        let (width, height) = self.info_header.dimensions();
        let raster_len = match self.info_header.image_size {
            0 => {
                let len = padded_row_len(width) * height as usize;
                warn!("8-bit BMP declares no raster size, assuming {} bytes", len);
                len
            }
            size => size as usize,
        };

        let raster = self.read_raster(raster_len)?;
        let image = GrayImage::from_parts(
            self.file_header,
            self.info_header,
            color_table,
            raster,
        )?;

        debug!(
            "decoded {}x{} 8-bit BMP, {} raster bytes at offset {}",
            width, height, raster_len, self.file_header.offset
        );
        Ok(image)
    }

    /// Decodes a 24-bit image into top-to-bottom RGB rows.
    pub fn read_rgb24(mut self) -> ImageResult<RgbImage> {
        if self.info_header.bit_count != 24 {
            return Err(ImageError::UnsupportedDepth(self.info_header.bit_count));
        }

        if self.file_header.offset < HEADERS_SIZE {
            return Err(ImageError::FormatError(format!(
                "Pixel array offset {} overlaps the headers",
                self.file_header.offset
            )));
        }

        let (width, height) = self.info_header.dimensions();
        let raster = self.read_raster(width as usize * height as usize * 3)?;

        let mut pixels = PixelBuffer::new(width, height);
        for (y, row) in pixels.rows_mut().enumerate() {
            for (x, pixel) in row.iter_mut().enumerate() {
                let i = rgb_raster_offset(&self.info_header, x as u32, y as u32);
                // Stored as blue, green, red
                *pixel = Rgb([raster[i + 2], raster[i + 1], raster[i]]);
            }
        }

        let image = RgbImage::from_parts(self.file_header, self.info_header, pixels)?;

        debug!(
            "decoded {}x{} 24-bit BMP ({}) at offset {}",
            width,
            height,
            if self.info_header.top_down() {
                "top-down"
            } else {
                "bottom-up"
            },
            self.file_header.offset
        );
        Ok(image)
    }
}

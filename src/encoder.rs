use std::io::{self, Read, Write};

use log::debug;

use crate::header::{COLOR_TABLE_SIZE, HEADERS_SIZE};
use crate::image::{rgb_raster_offset, GrayImage, Image, RgbImage};
use crate::{ImageError, ImageResult};

/// The representation of a BMP encoder.
///
/// Headers are written back exactly as they were decoded. The pixel array
/// lands at the offset the file header declares, with zeros filling any
/// gap after the headers.
pub struct BMPEncoder<W> {
    writer: W,
}

impl<W: Write> BMPEncoder<W> {
    /// Create a new encoder that writes its output to `writer`.
    pub fn new(writer: W) -> BMPEncoder<W> {
        BMPEncoder { writer }
    }

    /// Encodes whichever depth `image` has.
    pub fn encode(&mut self, image: &Image) -> ImageResult<()> {
        match image {
            Image::Gray(img) => self.encode_gray8(img),
            Image::Rgb(img) => self.encode_rgb24(img),
        }
    }

    fn write_gap(&mut self, start: u32, offset: u32) -> ImageResult<()> {
        if offset < start {
            return Err(ImageError::FormatError(format!(
                "Pixel array offset {} is inside the first {} bytes",
                offset, start
            )));
        }
        io::copy(
            &mut io::repeat(0).take(u64::from(offset - start)),
            &mut self.writer,
        )?;
        Ok(())
    }

    /// Writes headers, palette and raster as consecutive blocks.
    pub fn encode_gray8(&mut self, image: &GrayImage) -> ImageResult<()> {
        image.check_dimensions()?;

        let file_header = image.file_header();
        file_header.write_to(&mut self.writer)?;
        image.info_header().write_to(&mut self.writer)?;
        image.color_table().write_to(&mut self.writer)?;
        self.write_gap(HEADERS_SIZE + COLOR_TABLE_SIZE as u32, file_header.offset)?;

        self.writer.write_all(&image.pixels().to_bytes())?;
        self.writer.write_all(image.tail())?;
        self.writer.flush()?;

        debug!(
            "encoded {}x{} 8-bit BMP, {} raster bytes",
            image.pixels().width(),
            image.pixels().height(),
            image.raster_len()
        );
        Ok(())
    }

    /// Writes headers, then every pixel as blue, green, red at the same
    /// position it was decoded from.
    pub fn encode_rgb24(&mut self, image: &RgbImage) -> ImageResult<()> {
        image.check_dimensions()?;

        let file_header = image.file_header();
        let info_header = image.info_header();
        file_header.write_to(&mut self.writer)?;
        info_header.write_to(&mut self.writer)?;
        self.write_gap(HEADERS_SIZE, file_header.offset)?;

        let pixels = image.pixels();
        let mut raster = vec![0; pixels.len() * 3];
        for (y, row) in pixels.rows().enumerate() {
            for (x, pixel) in row.iter().enumerate() {
                let i = rgb_raster_offset(info_header, x as u32, y as u32);
                raster[i..i + 3].copy_from_slice(&[pixel.blue(), pixel.green(), pixel.red()]);
            }
        }
        self.writer.write_all(&raster)?;
        self.writer.flush()?;

        debug!(
            "encoded {}x{} 24-bit BMP at offset {}",
            pixels.width(),
            pixels.height(),
            file_header.offset
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{Luma, Rgb};
    use crate::decoder::BMPDecoder;
    use std::io::Cursor;

    /// Accepts a fixed number of bytes, then reports a zero-length write.
    struct LimitedWriter {
        remaining: usize,
    }

    impl Write for LimitedWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let n = buf.len().min(self.remaining);
            self.remaining -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn rgb24_layout_is_bottom_up_bgr() {
        let mut img = RgbImage::new(1, 2);
        img.pixels_mut().put_pixel(0, 0, Rgb([1, 2, 3]));
        img.pixels_mut().put_pixel(0, 1, Rgb([4, 5, 6]));

        let mut bytes = Vec::new();
        BMPEncoder::new(&mut bytes).encode_rgb24(&img).unwrap();
        assert_eq!(bytes.len(), 54 + 6);
        assert_eq!(&bytes[54..], &[6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn gray8_blocks_are_written_in_order() {
        let mut img = GrayImage::new(4, 1);
        for (i, p) in img.pixels_mut().pixels_mut().enumerate() {
            *p = Luma([i as u8 + 1]);
        }

        let mut bytes = Vec::new();
        BMPEncoder::new(&mut bytes).encode_gray8(&img).unwrap();
        assert_eq!(bytes.len(), 1078 + 4);
        assert_eq!(&bytes[..2], b"BM");
        assert_eq!(&bytes[54..58], &[0, 0, 0, 0]);
        assert_eq!(&bytes[58..62], &[1, 1, 1, 0]);
        assert_eq!(&bytes[1078..], &[1, 2, 3, 4]);
    }

    #[test]
    fn encoded_images_decode_to_the_same_image() {
        let mut rgb = RgbImage::new(4, 3);
        for (i, p) in rgb.pixels_mut().pixels_mut().enumerate() {
            *p = Rgb([i as u8, 100 - i as u8, 7 * i as u8]);
        }
        let mut bytes = Vec::new();
        BMPEncoder::new(&mut bytes).encode_rgb24(&rgb).unwrap();
        let decoded = BMPDecoder::new(Cursor::new(bytes))
            .unwrap()
            .read_rgb24()
            .unwrap();
        assert_eq!(decoded, rgb);
    }

    #[test]
    fn short_writes_are_reported() {
        let img = GrayImage::new(4, 4);
        let mut encoder = BMPEncoder::new(LimitedWriter { remaining: 100 });
        assert!(matches!(
            encoder.encode_gray8(&img),
            Err(ImageError::ShortWrite)
        ));
    }
}

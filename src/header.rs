use std::fmt;
use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::{ImageError, ImageResult};

pub(crate) const BMP_SIGNATURE: [u8; 2] = *b"BM";
pub(crate) const FILE_HEADER_SIZE: u32 = 14;
pub(crate) const BITMAPINFOHEADER_SIZE: u32 = 40;
pub(crate) const HEADERS_SIZE: u32 = FILE_HEADER_SIZE + BITMAPINFOHEADER_SIZE;

pub(crate) const COLOR_TABLE_ENTRIES: usize = 256;
pub(crate) const COLOR_TABLE_SIZE: usize = COLOR_TABLE_ENTRIES * 4;

// Compression method constants
pub(crate) const BI_RGB: u32 = 0;

/// The maximum width/height the decoder will process.
pub(crate) const MAX_WIDTH_HEIGHT: i32 = 0xFFFF;

/// The 14 byte BITMAPFILEHEADER.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub signature: [u8; 2],
    pub file_size: u32,
    pub reserved1: u16,
    pub reserved2: u16,
    /// Byte offset of the pixel array from the start of the file.
    pub offset: u32,
}

impl FileHeader {
    pub(crate) fn read_from<R: Read>(reader: &mut R) -> ImageResult<FileHeader> {
        let mut signature = [0; 2];
        reader.read_exact(&mut signature)?;

        if signature != BMP_SIGNATURE {
            return Err(ImageError::FormatError(
                "BMP signature not found".to_string(),
            ));
        }

        Ok(FileHeader {
            signature,
            file_size: reader.read_u32::<LittleEndian>()?,
            reserved1: reader.read_u16::<LittleEndian>()?,
            reserved2: reader.read_u16::<LittleEndian>()?,
            offset: reader.read_u32::<LittleEndian>()?,
        })
    }

    pub(crate) fn write_to<W: Write>(&self, writer: &mut W) -> ImageResult<()> {
        writer.write_all(&self.signature)?;
        writer.write_u32::<LittleEndian>(self.file_size)?;
        writer.write_u16::<LittleEndian>(self.reserved1)?;
        writer.write_u16::<LittleEndian>(self.reserved2)?;
        writer.write_u32::<LittleEndian>(self.offset)?;
        Ok(())
    }
}

/// The 40 byte BITMAPINFOHEADER.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoHeader {
    pub size: u32,
    pub width: i32,
    /// Negative for top-down files.
    pub height: i32,
    pub planes: u16,
    pub bit_count: u16,
    pub compression: u32,
    /// Size of the raw pixel array in bytes. May be zero for uncompressed files.
    pub image_size: u32,
    pub x_resolution: i32,
    pub y_resolution: i32,
    pub colors_used: u32,
    pub colors_important: u32,
}

impl InfoHeader {
    pub(crate) fn read_from<R: Read>(reader: &mut R) -> ImageResult<InfoHeader> {
        Ok(InfoHeader {
            size: reader.read_u32::<LittleEndian>()?,
            width: reader.read_i32::<LittleEndian>()?,
            height: reader.read_i32::<LittleEndian>()?,
            planes: reader.read_u16::<LittleEndian>()?,
            bit_count: reader.read_u16::<LittleEndian>()?,
            compression: reader.read_u32::<LittleEndian>()?,
            image_size: reader.read_u32::<LittleEndian>()?,
            x_resolution: reader.read_i32::<LittleEndian>()?,
            y_resolution: reader.read_i32::<LittleEndian>()?,
            colors_used: reader.read_u32::<LittleEndian>()?,
            colors_important: reader.read_u32::<LittleEndian>()?,
        })
    }

    pub(crate) fn write_to<W: Write>(&self, writer: &mut W) -> ImageResult<()> {
        writer.write_u32::<LittleEndian>(self.size)?;
        writer.write_i32::<LittleEndian>(self.width)?;
        writer.write_i32::<LittleEndian>(self.height)?;
        writer.write_u16::<LittleEndian>(self.planes)?;
        writer.write_u16::<LittleEndian>(self.bit_count)?;
        writer.write_u32::<LittleEndian>(self.compression)?;
        writer.write_u32::<LittleEndian>(self.image_size)?;
        writer.write_i32::<LittleEndian>(self.x_resolution)?;
        writer.write_i32::<LittleEndian>(self.y_resolution)?;
        writer.write_u32::<LittleEndian>(self.colors_used)?;
        writer.write_u32::<LittleEndian>(self.colors_important)?;
        Ok(())
    }

    /// Checks everything that does not depend on the bit depth.
    pub(crate) fn validate(&self) -> ImageResult<()> {
        if self.size != BITMAPINFOHEADER_SIZE {
            return Err(ImageError::UnsupportedError(format!(
                "Info header of {} bytes, only BITMAPINFOHEADER is supported",
                self.size
            )));
        }
        if self.planes != 1 {
            return Err(ImageError::FormatError("More than one plane".to_string()));
        }
        if self.compression != BI_RGB {
            return Err(ImageError::UnsupportedError(format!(
                "Compression method {}",
                self.compression
            )));
        }
        if self.width <= 0 {
            return Err(ImageError::FormatError(format!(
                "Invalid width {}",
                self.width
            )));
        }
        if self.height == 0 || self.height == i32::min_value() {
            return Err(ImageError::FormatError(format!(
                "Invalid height {}",
                self.height
            )));
        }
        if self.width > MAX_WIDTH_HEIGHT || self.height.abs() > MAX_WIDTH_HEIGHT {
            return Err(ImageError::FormatError(format!(
                "Image dimensions ({}x{}) are too large",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// `(width, height)` with the row order sign dropped.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width.unsigned_abs(), self.height.unsigned_abs())
    }

    /// A negative height stores the first row at the top of the image.
    pub fn top_down(&self) -> bool {
        self.height < 0
    }
}

/// 256 palette entries of 4 bytes each, kept byte for byte.
#[derive(Clone, PartialEq, Eq)]
pub struct ColorTable(Box<[u8; COLOR_TABLE_SIZE]>);

impl ColorTable {
    pub fn new(bytes: [u8; COLOR_TABLE_SIZE]) -> ColorTable {
        ColorTable(Box::new(bytes))
    }

    /// The conventional identity gray ramp: entry `i` is `(i, i, i, 0)`.
    pub fn grayscale() -> ColorTable {
        let mut bytes = [0; COLOR_TABLE_SIZE];
        for (i, entry) in bytes.chunks_exact_mut(4).enumerate() {
            entry[..3].copy_from_slice(&[i as u8; 3]);
        }
        ColorTable::new(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }

    pub(crate) fn read_from<R: Read>(reader: &mut R) -> ImageResult<ColorTable> {
        let mut bytes = [0; COLOR_TABLE_SIZE];
        reader.read_exact(&mut bytes)?;
        Ok(ColorTable::new(bytes))
    }

    pub(crate) fn write_to<W: Write>(&self, writer: &mut W) -> ImageResult<()> {
        writer.write_all(self.as_bytes())?;
        Ok(())
    }
}

impl fmt::Debug for ColorTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ColorTable")
            .field(&format_args!("[{} bytes]", COLOR_TABLE_SIZE))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn info(width: i32, height: i32) -> InfoHeader {
        InfoHeader {
            size: BITMAPINFOHEADER_SIZE,
            width,
            height,
            planes: 1,
            bit_count: 24,
            compression: BI_RGB,
            image_size: 0,
            x_resolution: 2835,
            y_resolution: 2835,
            colors_used: 0,
            colors_important: 0,
        }
    }

    #[test]
    fn headers_occupy_their_fixed_sizes() {
        let file = FileHeader {
            signature: BMP_SIGNATURE,
            file_size: 1234,
            reserved1: 7,
            reserved2: 9,
            offset: 54,
        };
        let mut bytes = Vec::new();
        file.write_to(&mut bytes).unwrap();
        assert_eq!(bytes.len(), FILE_HEADER_SIZE as usize);
        info(3, -2).write_to(&mut bytes).unwrap();
        assert_eq!(bytes.len(), HEADERS_SIZE as usize);

        let mut reader = Cursor::new(&bytes);
        assert_eq!(FileHeader::read_from(&mut reader).unwrap(), file);
        assert_eq!(InfoHeader::read_from(&mut reader).unwrap(), info(3, -2));
    }

    #[test]
    fn wrong_signature_is_rejected() {
        let mut reader = Cursor::new(b"BX\0\0\0\0\0\0\0\0\0\0\0\0".to_vec());
        assert!(matches!(
            FileHeader::read_from(&mut reader),
            Err(ImageError::FormatError(_))
        ));
    }

    #[test]
    fn validate_rejects_bad_fields() {
        assert!(info(4, 4).validate().is_ok());
        assert!(info(4, -4).validate().is_ok());
        assert!(info(0, 4).validate().is_err());
        assert!(info(4, 0).validate().is_err());
        assert!(info(MAX_WIDTH_HEIGHT + 1, 4).validate().is_err());

        let mut compressed = info(4, 4);
        compressed.compression = 1;
        assert!(matches!(
            compressed.validate(),
            Err(ImageError::UnsupportedError(_))
        ));

        let mut planes = info(4, 4);
        planes.planes = 2;
        assert!(matches!(planes.validate(), Err(ImageError::FormatError(_))));
    }

    #[test]
    fn grayscale_palette_is_an_identity_ramp() {
        let table = ColorTable::grayscale();
        assert_eq!(&table.as_bytes()[..8], &[0, 0, 0, 0, 1, 1, 1, 0]);
        assert_eq!(&table.as_bytes()[1020..], &[255, 255, 255, 0]);
    }
}

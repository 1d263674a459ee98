//!  Decoding, Filtering and Encoding of BMP Images
//!
//!  A decoder and encoder for uncompressed 8-bit grayscale and 24-bit RGB
//!  BMP (Windows Bitmap) images, plus a set of in-place filters working on
//!  the decoded raster.
//!
//!  # Related Links
//!  * <https://msdn.microsoft.com/en-us/library/windows/desktop/dd183375%28v=vs.85%29.aspx>
//!  * <https://en.wikipedia.org/wiki/BMP_file_format>
//!

use std::error;
use std::fmt;
use std::io;
use std::path::PathBuf;

pub use crate::buffer::{Luma, Pixel, PixelBuffer, Rgb};
pub use crate::decoder::BMPDecoder;
pub use crate::encoder::BMPEncoder;
pub use crate::filter::{BorderMode, Filter};
pub use crate::header::{ColorTable, FileHeader, InfoHeader};
pub use crate::image::{GrayImage, Image, ImageInfo, RgbImage};
pub use crate::kernel::{Kernel, Preset};
pub use crate::session::{apply_filter, describe, load_image, save_image, ImageSession};

#[derive(Debug)]
pub enum ImageError {
    /// The source file could not be opened.
    FileNotFound(PathBuf),
    /// The file is not structurally a BMP we can make sense of.
    FormatError(String),
    /// The file is valid but uses a feature this crate does not handle.
    UnsupportedError(String),
    /// Bit depth other than 8 or 24, or not the depth that was asked for.
    UnsupportedDepth(u16),
    /// Fewer bytes were available than the format mandates.
    TruncatedRead,
    /// The sink accepted fewer bytes than were written.
    ShortWrite,
    /// Header dimensions disagree with the pixel buffer.
    DimensionMismatch {
        header: (u32, u32),
        buffer: (u32, u32),
    },
    /// A session operation needed an image but none is loaded.
    NoImage,
    IoError(io::Error),
}

pub type ImageResult<T> = Result<T, ImageError>;

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageError::FileNotFound(path) => {
                write!(f, "Cannot open file {}", path.display())
            }
            ImageError::FormatError(e) => write!(f, "Format error: {}", e),
            ImageError::UnsupportedError(e) => write!(f, "Unsupported: {}", e),
            ImageError::UnsupportedDepth(bits) => {
                write!(f, "Unsupported bit depth: {} bits per pixel", bits)
            }
            ImageError::TruncatedRead => f.write_str("Unexpected end of image data"),
            ImageError::ShortWrite => f.write_str("Image data was only partially written"),
            ImageError::DimensionMismatch { header, buffer } => write!(
                f,
                "Header dimensions {}x{} do not match pixel buffer {}x{}",
                header.0, header.1, buffer.0, buffer.1
            ),
            ImageError::NoImage => f.write_str("No image loaded"),
            ImageError::IoError(e) => write!(f, "{}", e),
        }
    }
}

impl error::Error for ImageError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            ImageError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ImageError {
    fn from(err: io::Error) -> ImageError {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => ImageError::TruncatedRead,
            io::ErrorKind::WriteZero => ImageError::ShortWrite,
            _ => ImageError::IoError(err),
        }
    }
}

/// Decodes an 8-bit or 24-bit BMP held in memory.
pub fn decode(bytes: &[u8]) -> ImageResult<Image> {
    BMPDecoder::new(io::Cursor::new(bytes))?.read_image()
}

/// Encodes an image into a freshly allocated byte vector.
pub fn encode(image: &Image) -> ImageResult<Vec<u8>> {
    let mut bytes = Vec::new();
    BMPEncoder::new(&mut bytes).encode(image)?;
    Ok(bytes)
}

mod buffer;
mod decoder;
mod encoder;
pub mod filter;
mod header;
mod image;
mod kernel;
mod session;

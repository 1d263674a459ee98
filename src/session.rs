//! File-level entry points and a holder for the image currently being edited.

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;

use log::{debug, info};

use crate::decoder::BMPDecoder;
use crate::encoder::BMPEncoder;
use crate::filter::Filter;
use crate::image::{Image, ImageInfo};
use crate::{ImageError, ImageResult};

/// Opens and decodes the BMP at `path`.
pub fn load_image<P: AsRef<Path>>(path: P) -> ImageResult<Image> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ImageError::FileNotFound(path.to_path_buf()),
        _ => ImageError::from(e),
    })?;
    let image = BMPDecoder::new(BufReader::new(file))?.read_image()?;
    info!("loaded {}", path.display());
    Ok(image)
}

/// Encodes `image` into a file at `path`, replacing any existing file.
pub fn save_image<P: AsRef<Path>>(image: &Image, path: P) -> ImageResult<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    BMPEncoder::new(BufWriter::new(file)).encode(image)?;
    info!("saved {}", path.display());
    Ok(())
}

/// Applies `filter` to `image` in place.
pub fn apply_filter(image: &mut Image, filter: &Filter) -> ImageResult<()> {
    filter.apply(image)
}

pub fn describe(image: &Image) -> ImageInfo {
    image.info()
}

/// Owns at most one image at a time.
///
/// A failed [`open`](ImageSession::open) keeps whatever image was loaded
/// before.
#[derive(Debug, Default)]
pub struct ImageSession {
    image: Option<Image>,
}

impl ImageSession {
    pub fn new() -> ImageSession {
        ImageSession::default()
    }

    pub fn open<P: AsRef<Path>>(&mut self, path: P) -> ImageResult<&Image> {
        let image = load_image(path)?;
        if self.image.is_some() {
            debug!("replacing the loaded image");
        }
        Ok(self.image.insert(image))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        save_image(self.loaded()?, path)
    }

    pub fn apply(&mut self, filter: &Filter) -> ImageResult<()> {
        let image = self.image.as_mut().ok_or(ImageError::NoImage)?;
        apply_filter(image, filter)
    }

    pub fn info(&self) -> ImageResult<ImageInfo> {
        self.loaded().map(describe)
    }

    pub fn image(&self) -> Option<&Image> {
        self.image.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.image.is_some()
    }

    /// Drops the loaded image, returning it.
    pub fn close(&mut self) -> Option<Image> {
        self.image.take()
    }

    fn loaded(&self) -> ImageResult<&Image> {
        self.image.as_ref().ok_or(ImageError::NoImage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{GrayImage, RgbImage};
    use std::env;
    use std::fs;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(format!("bmp_filters_session_{}_{}", std::process::id(), name))
    }

    #[test]
    fn missing_file_is_reported_as_not_found() {
        let path = temp_path("does_not_exist.bmp");
        match load_image(&path) {
            Err(ImageError::FileNotFound(p)) => assert_eq!(p, path),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn empty_session_refuses_work() {
        let mut session = ImageSession::new();
        assert!(!session.is_loaded());
        assert!(matches!(
            session.apply(&Filter::Negative),
            Err(ImageError::NoImage)
        ));
        assert!(matches!(session.info(), Err(ImageError::NoImage)));
        assert!(matches!(
            session.save(temp_path("never.bmp")),
            Err(ImageError::NoImage)
        ));
    }

    #[test]
    fn save_then_load_round_trips() {
        let path = temp_path("round_trip.bmp");
        let mut image = Image::from(RgbImage::new(4, 4));
        apply_filter(&mut image, &Filter::Brightness(42)).unwrap();
        save_image(&image, &path).unwrap();

        let loaded = load_image(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(loaded, image);
    }

    #[test]
    fn failed_open_keeps_the_previous_image() {
        let path = temp_path("keep.bmp");
        save_image(&Image::from(GrayImage::new(8, 8)), &path).unwrap();

        let mut session = ImageSession::new();
        session.open(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert!(session.open(temp_path("missing.bmp")).is_err());
        let info = session.info().unwrap();
        assert_eq!((info.width, info.height, info.bit_depth), (8, 8, 8));

        session.apply(&Filter::Negative).unwrap();
        assert!(session.close().is_some());
        assert!(session.image().is_none());
    }
}

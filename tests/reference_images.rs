//! Compares the decoding results with reference checksums and checks that
//! re-encoding reproduces the original files.

use crc32fast;
use glob;
use bmp_filters;

use std::fs;
use std::io;
use std::path::PathBuf;

use crc32fast::Hasher as Crc32;

use bmp_filters::{BMPDecoder, Image, ImageError};

const BASE_PATH: [&str; 2] = [".", "tests"];
const IMAGE_DIR: &str = "images";

fn process_images<F>(dir: &str, input_decoder: Option<&str>, func: F)
where
    F: Fn(&PathBuf, PathBuf, &str),
{
    let base: PathBuf = BASE_PATH.iter().collect();
    let decoders = &["bmp"];
    for decoder in decoders {
        let mut path = base.clone();
        path.push(dir);
        path.push(decoder);
        path.push("**");
        path.push(
            "*.".to_string()
                + match input_decoder {
                    Some(val) => val,
                    None => decoder,
                },
        );
        let pattern = &*format!("{}", path.display());
        for path in glob::glob(pattern).unwrap().filter_map(Result::ok) {
            func(&base, path, decoder)
        }
    }
}

/// Describes a single test case of `check_references`.
struct ReferenceTestCase {
    orig_filename: String,
    crc: u32,
}

impl std::str::FromStr for ReferenceTestCase {
    type Err = &'static str;

    /// Construct `ReferenceTestCase` from the file name of a test image,
    /// `<name>.<crc>.bmp`.
    fn from_str(filename: &str) -> Result<Self, Self::Err> {
        let mut filename_parts = filename.rsplitn(3, '.');

        // Ignore the file extension
        filename_parts.next().unwrap();

        // The penultimate part of `filename_parts` is the CRC of the
        // decoded pixels.
        let meta_str = filename_parts.next().ok_or("missing metadata part")?;
        let crc = parse_crc(meta_str).ok_or("malformed CRC")?;

        // The remaining part represents the original file name
        let orig_filename = filename_parts
            .next()
            .ok_or("missing original file name")?
            .to_owned();

        Ok(Self { orig_filename, crc })
    }
}

/// Parse the given string as a hexadecimal CRC hash, used by `check_references`.
fn parse_crc(src: &str) -> Option<u32> {
    u32::from_str_radix(src, 16).ok()
}

fn crc(bytes: &[u8]) -> u32 {
    let mut hasher = Crc32::new();
    hasher.update(bytes);
    hasher.finalize()
}

/// The decoded samples, row by row from the top, channels in RGB order.
fn raster_bytes(image: &Image) -> Vec<u8> {
    match image {
        Image::Gray(img) => img.pixels().to_bytes(),
        Image::Rgb(img) => img.pixels().to_bytes(),
    }
}

#[test]
fn check_references() {
    process_images(IMAGE_DIR, None, |_base, path, _decoder| {
        println!("check_references {}", path.display());

        let f = io::BufReader::new(fs::File::open(&path).unwrap());
        let img = match BMPDecoder::new(f).and_then(BMPDecoder::read_image) {
            Ok(img) => img,
            Err(err) => panic!("decoding of {:?} failed with: {:?}", path, err),
        };

        let filename = path.file_name().unwrap().to_str().unwrap();
        let case: ReferenceTestCase = filename.parse().unwrap();

        let test_crc_actual = crc(&raster_bytes(&img));
        if test_crc_actual != case.crc {
            panic!(
                "The decoded image's hash does not match (expected = {:08x}, actual = {:08x}).",
                case.crc, test_crc_actual
            );
        }

        let (width, height) = img.dimensions();
        assert!(
            case.orig_filename.ends_with(&format!("{}x{}", width, height)),
            "{} decoded as {}x{}",
            case.orig_filename,
            width,
            height
        );

        let original = fs::read(&path).unwrap();
        let reencoded = bmp_filters::encode(&img).unwrap();
        assert_eq!(
            crc(&reencoded),
            crc(&original),
            "re-encoding {} changed the file",
            filename
        );
        assert_eq!(reencoded, original);
    })
}

#[test]
fn decode_encode_decode_is_stable() {
    process_images(IMAGE_DIR, None, |_base, path, _decoder| {
        let bytes = fs::read(&path).unwrap();
        let first = bmp_filters::decode(&bytes).unwrap();
        let second = bmp_filters::decode(&bmp_filters::encode(&first).unwrap()).unwrap();
        assert_eq!(first, second, "{}", path.display());
    })
}

#[test]
fn depths_are_detected() {
    process_images(IMAGE_DIR, None, |_base, path, _decoder| {
        let name = path.file_name().unwrap().to_str().unwrap().to_owned();
        let img = bmp_filters::load_image(&path).unwrap();
        let expected = if name.starts_with("gray8") { 8 } else { 24 };
        assert_eq!(bmp_filters::describe(&img).bit_depth, expected, "{}", name);

        // Asking for the other depth is refused.
        let f = io::BufReader::new(fs::File::open(&path).unwrap());
        let decoder = BMPDecoder::new(f).unwrap();
        let result = if expected == 8 {
            decoder.read_rgb24().map(|_| ())
        } else {
            decoder.read_gray8().map(|_| ())
        };
        match result {
            Err(ImageError::UnsupportedDepth(bits)) => assert_eq!(bits, expected),
            other => panic!("{}: expected a depth error, got {:?}", name, other),
        }
    })
}

/// Check that malformed, unsupported and oversized BMP files are rejected.
///
/// The images are postfixed with `bad_bmp` to not be loaded by the other tests.
#[test]
fn bad_bmps() {
    let path: PathBuf = BASE_PATH
        .iter()
        .collect::<PathBuf>()
        .join(IMAGE_DIR)
        .join("bmp/images")
        .join("*.bad_bmp");

    let pattern = &*format!("{}", path.display());
    let mut seen = 0;
    for path in glob::glob(pattern).unwrap().filter_map(Result::ok) {
        let bytes = fs::read(&path).unwrap();
        let im = bmp_filters::decode(&bytes);
        assert!(im.is_err(), "{} was accepted", path.display());
        seen += 1;
    }
    assert!(seen > 0, "no bad images found under {}", pattern);
}

#[test]
fn bad_bmps_fail_for_the_right_reason() {
    let dir: PathBuf = BASE_PATH
        .iter()
        .collect::<PathBuf>()
        .join(IMAGE_DIR)
        .join("bmp/images");
    let decode = |name: &str| {
        let bytes = fs::read(dir.join(format!("{}.bad_bmp", name))).unwrap();
        bmp_filters::decode(&bytes)
    };

    assert!(matches!(decode("signature"), Err(ImageError::FormatError(_))));
    assert!(matches!(decode("depth16"), Err(ImageError::UnsupportedDepth(16))));
    assert!(matches!(decode("rle8"), Err(ImageError::UnsupportedError(_))));
    assert!(matches!(decode("truncated_raster"), Err(ImageError::TruncatedRead)));
    assert!(matches!(decode("truncated_headers"), Err(ImageError::TruncatedRead)));
    assert!(matches!(decode("offset_past_end"), Err(ImageError::FormatError(_))));
    assert!(matches!(decode("oversized"), Err(ImageError::FormatError(_))));
    assert!(matches!(decode("palette_overlap"), Err(ImageError::FormatError(_))));
    assert!(matches!(decode("zero_width"), Err(ImageError::FormatError(_))));
}

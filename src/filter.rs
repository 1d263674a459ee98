//! In-place filters over decoded pixel buffers.
//!
//! Point filters work per channel. Convolution accumulates in `f32`, then
//! clamps to `[0, 255]` and truncates.

use log::debug;
use num_traits::clamp;

use crate::buffer::{Luma, Pixel, PixelBuffer, Rgb};
use crate::image::Image;
use crate::kernel::{Kernel, Preset};
use crate::{ImageError, ImageResult};

/// How convolution treats pixels whose neighbourhood leaves the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BorderMode {
    /// Out of range neighbours are snapped to the nearest edge pixel, so
    /// every pixel is filtered. Used for 24-bit images.
    Clamp,
    /// Pixels within `kernel.half()` of an edge keep their value and the
    /// interior is filtered in place, row by row. Used for 8-bit images.
    Skip,
}

/// `v' = 255 - v` on every channel.
pub fn negative<P: Pixel>(buf: &mut PixelBuffer<P>) {
    for p in buf.pixels_mut() {
        *p = p.map(|v| 255 - v);
    }
}

/// Adds `delta` to every channel, saturating at 0 and 255.
pub fn brightness<P: Pixel>(buf: &mut PixelBuffer<P>, delta: i32) {
    for p in buf.pixels_mut() {
        *p = p.map(|v| clamp(i32::from(v).saturating_add(delta), 0, 255) as u8);
    }
}

/// Maps every sample to 255 if it is at least `t`, else to 0.
pub fn threshold(buf: &mut PixelBuffer<Luma>, t: i32) {
    for p in buf.pixels_mut() {
        *p = p.map(|v| if i32::from(v) >= t { 255 } else { 0 });
    }
}

/// Replaces every channel with the truncated mean of red, green and blue.
pub fn grayscale(buf: &mut PixelBuffer<Rgb>) {
    for p in buf.pixels_mut() {
        let sum: u16 = p.channels().iter().map(|&c| u16::from(c)).sum();
        *p = Rgb([(sum / 3) as u8; 3]);
    }
}

/// Convolves `buf` with `kernel`.
///
/// In [`BorderMode::Clamp`] every output pixel is computed from the
/// unmodified input. [`BorderMode::Skip`] writes back as it scans rows top
/// to bottom, so a pixel already sees the filtered values of the
/// neighbours above and to its left.
pub fn convolve<P: Pixel>(buf: &mut PixelBuffer<P>, kernel: &Kernel, mode: BorderMode) {
    if buf.is_empty() {
        return;
    }
    match mode {
        BorderMode::Clamp => {
            let src = buf.clone();
            convolve_rows(&src, buf.as_mut_slice(), kernel);
        }
        BorderMode::Skip => convolve_in_place(buf, kernel),
    }
}

/// Interior pixels only, read from and written to `buf` in row-major order.
/// Always sequential.
fn convolve_in_place<P: Pixel>(buf: &mut PixelBuffer<P>, kernel: &Kernel) {
    let half = kernel.half() as u32;
    let (width, height) = buf.dimensions();
    if width <= 2 * half || height <= 2 * half {
        return;
    }

    for y in half..height - half {
        for x in half..width - half {
            let value = convolve_at(buf, x, y, kernel);
            buf.put_pixel(x, y, value);
        }
    }
}

#[cfg(not(feature = "parallel"))]
fn convolve_rows<P: Pixel>(src: &PixelBuffer<P>, dst: &mut [P], kernel: &Kernel) {
    let width = src.width() as usize;
    for (y, row) in dst.chunks_mut(width).enumerate() {
        convolve_row(src, y as u32, row, kernel);
    }
}

#[cfg(feature = "parallel")]
fn convolve_rows<P: Pixel>(src: &PixelBuffer<P>, dst: &mut [P], kernel: &Kernel) {
    let width = src.width() as usize;
    let threads = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let rows_per_job = (src.height() as usize + threads - 1) / threads;

    let mut pool = scoped_threadpool::Pool::new(threads as u32);
    pool.scoped(|scope| {
        for (job, rows) in dst.chunks_mut(width * rows_per_job).enumerate() {
            scope.execute(move || {
                for (i, row) in rows.chunks_mut(width).enumerate() {
                    let y = job * rows_per_job + i;
                    convolve_row(src, y as u32, row, kernel);
                }
            });
        }
    });
}

/// One output row with edge-clamped neighbours.
fn convolve_row<P: Pixel>(src: &PixelBuffer<P>, y: u32, row: &mut [P], kernel: &Kernel) {
    for (x, out) in row.iter_mut().enumerate() {
        *out = convolve_at(src, x as u32, y, kernel);
    }
}

fn convolve_at<P: Pixel>(src: &PixelBuffer<P>, x: u32, y: u32, kernel: &Kernel) -> P {
    let half = kernel.half() as i64;
    let mut sums = [0f32; 4];

    for i in 0..kernel.size() {
        for j in 0..kernel.size() {
            let weight = kernel.weight(i, j);
            let neighbour = src.get_pixel_clamped(
                i64::from(x) + j as i64 - half,
                i64::from(y) + i as i64 - half,
            );
            for (sum, &c) in sums.iter_mut().zip(neighbour.channels()) {
                *sum += f32::from(c) * weight;
            }
        }
    }

    P::from_fn(|c| clamp(sums[c], 0.0, 255.0) as u8)
}

/// Every action a user can apply to a loaded image.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Negative,
    /// 24-bit images only.
    Grayscale,
    Brightness(i32),
    /// 8-bit images only.
    Threshold(i32),
    Convolve(Preset),
    Custom(Kernel),
}

impl Filter {
    /// Applies the filter in place. 8-bit images convolve with
    /// [`BorderMode::Skip`], 24-bit images with [`BorderMode::Clamp`].
    pub fn apply(&self, image: &mut Image) -> ImageResult<()> {
        let (width, height) = image.dimensions();
        debug!(
            "applying {:?} to {}x{} {}-bit image",
            self,
            width,
            height,
            image.bit_depth()
        );

        match image {
            Image::Gray(img) => self.apply_gray(img.pixels_mut()),
            Image::Rgb(img) => self.apply_rgb(img.pixels_mut()),
        }
    }

    fn apply_gray(&self, buf: &mut PixelBuffer<Luma>) -> ImageResult<()> {
        match self {
            Filter::Negative => negative(buf),
            Filter::Brightness(delta) => brightness(buf, *delta),
            Filter::Threshold(t) => threshold(buf, *t),
            Filter::Convolve(preset) => convolve(buf, preset.kernel(), BorderMode::Skip),
            Filter::Custom(kernel) => convolve(buf, kernel, BorderMode::Skip),
            Filter::Grayscale => {
                return Err(ImageError::UnsupportedError(
                    "grayscale conversion needs a 24-bit image".to_string(),
                ))
            }
        }
        Ok(())
    }

    fn apply_rgb(&self, buf: &mut PixelBuffer<Rgb>) -> ImageResult<()> {
        match self {
            Filter::Negative => negative(buf),
            Filter::Brightness(delta) => brightness(buf, *delta),
            Filter::Grayscale => grayscale(buf),
            Filter::Convolve(preset) => convolve(buf, preset.kernel(), BorderMode::Clamp),
            Filter::Custom(kernel) => convolve(buf, kernel, BorderMode::Clamp),
            Filter::Threshold(_) => {
                return Err(ImageError::UnsupportedError(
                    "threshold needs an 8-bit image".to_string(),
                ))
            }
        }
        Ok(())
    }
}

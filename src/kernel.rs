use std::borrow::Cow;
use std::fmt;

use crate::{ImageError, ImageResult};

#[rustfmt::skip]
const BOX_BLUR: [f32; 9] = [
    1.0 / 9.0, 1.0 / 9.0, 1.0 / 9.0,
    1.0 / 9.0, 1.0 / 9.0, 1.0 / 9.0,
    1.0 / 9.0, 1.0 / 9.0, 1.0 / 9.0,
];

#[rustfmt::skip]
const GAUSSIAN_BLUR: [f32; 9] = [
    1.0 / 16.0, 2.0 / 16.0, 1.0 / 16.0,
    2.0 / 16.0, 4.0 / 16.0, 2.0 / 16.0,
    1.0 / 16.0, 2.0 / 16.0, 1.0 / 16.0,
];

#[rustfmt::skip]
const SHARPEN: [f32; 9] = [
     0.0, -1.0,  0.0,
    -1.0,  5.0, -1.0,
     0.0, -1.0,  0.0,
];

#[rustfmt::skip]
const EDGE_DETECT: [f32; 9] = [
    -1.0, -1.0, -1.0,
    -1.0,  8.0, -1.0,
    -1.0, -1.0, -1.0,
];

#[rustfmt::skip]
const EMBOSS: [f32; 9] = [
    -2.0, -1.0, 0.0,
    -1.0,  1.0, 1.0,
     0.0,  1.0, 2.0,
];

/// A square matrix of weights with odd side length, stored row-major.
///
/// The presets live in statics and borrow their weights.
#[derive(Clone, PartialEq)]
pub struct Kernel {
    size: usize,
    weights: Cow<'static, [f32]>,
}

static BOX_BLUR_KERNEL: Kernel = Kernel::fixed_3x3(&BOX_BLUR);
static GAUSSIAN_BLUR_KERNEL: Kernel = Kernel::fixed_3x3(&GAUSSIAN_BLUR);
static SHARPEN_KERNEL: Kernel = Kernel::fixed_3x3(&SHARPEN);
static EDGE_DETECT_KERNEL: Kernel = Kernel::fixed_3x3(&EDGE_DETECT);
static EMBOSS_KERNEL: Kernel = Kernel::fixed_3x3(&EMBOSS);

impl Kernel {
    /// Builds a `size` x `size` kernel.
    ///
    /// Fails if `size` is even or zero, or if `weights` does not hold exactly
    /// `size * size` values.
    pub fn new(size: usize, weights: Vec<f32>) -> ImageResult<Kernel> {
        if size % 2 == 0 {
            return Err(ImageError::UnsupportedError(format!(
                "Kernel size must be odd, got {}",
                size
            )));
        }
        if weights.len() != size * size {
            return Err(ImageError::UnsupportedError(format!(
                "A {0}x{0} kernel needs {1} weights, got {2}",
                size,
                size * size,
                weights.len()
            )));
        }
        Ok(Kernel {
            size,
            weights: Cow::Owned(weights),
        })
    }

    pub fn from_3x3(weights: [f32; 9]) -> Kernel {
        Kernel {
            size: 3,
            weights: Cow::Owned(weights.to_vec()),
        }
    }

    const fn fixed_3x3(weights: &'static [f32]) -> Kernel {
        Kernel {
            size: 3,
            weights: Cow::Borrowed(weights),
        }
    }

    /// Side length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Distance from the centre to an edge, `size / 2`.
    pub fn half(&self) -> usize {
        self.size / 2
    }

    #[inline]
    pub fn weight(&self, row: usize, col: usize) -> f32 {
        self.weights[row * self.size + col]
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }
}

impl fmt::Debug for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for row in self.weights.chunks(self.size) {
            list.entry(&row);
        }
        list.finish()
    }
}

/// The named convolution filters offered to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    BoxBlur,
    GaussianBlur,
    Sharpen,
    EdgeDetect,
    Emboss,
}

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::BoxBlur,
        Preset::GaussianBlur,
        Preset::Sharpen,
        Preset::EdgeDetect,
        Preset::Emboss,
    ];

    pub fn kernel(self) -> &'static Kernel {
        match self {
            Preset::BoxBlur => &BOX_BLUR_KERNEL,
            Preset::GaussianBlur => &GAUSSIAN_BLUR_KERNEL,
            Preset::Sharpen => &SHARPEN_KERNEL,
            Preset::EdgeDetect => &EDGE_DETECT_KERNEL,
            Preset::Emboss => &EMBOSS_KERNEL,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Preset::BoxBlur => "box blur",
            Preset::GaussianBlur => "gaussian blur",
            Preset::Sharpen => "sharpen",
            Preset::EdgeDetect => "edge detection",
            Preset::Emboss => "emboss",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

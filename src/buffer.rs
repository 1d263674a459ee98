use std::fmt::Debug;
use std::ops::{Index, IndexMut};
use std::slice::{Chunks, ChunksMut};

/// A sample of one or more 8-bit channels.
pub trait Pixel: Copy + Clone + Debug + Default + PartialEq + Send + Sync + 'static {
    /// The number of channels of this pixel type.
    const CHANNEL_COUNT: usize;

    fn channels(&self) -> &[u8];

    fn channels_mut(&mut self) -> &mut [u8];

    /// Builds a pixel by evaluating `f` once per channel index.
    fn from_fn<F: FnMut(usize) -> u8>(f: F) -> Self;

    /// Applies `f` to every channel.
    fn map<F: FnMut(u8) -> u8>(&self, mut f: F) -> Self {
        let mut pixel = *self;
        for c in pixel.channels_mut() {
            *c = f(*c);
        }
        pixel
    }
}

/// A single grayscale (palette index) sample.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct Luma(pub [u8; 1]);

impl Pixel for Luma {
    const CHANNEL_COUNT: usize = 1;

    fn channels(&self) -> &[u8] {
        &self.0
    }

    fn channels_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }

    fn from_fn<F: FnMut(usize) -> u8>(mut f: F) -> Luma {
        Luma([f(0)])
    }
}

/// A red, green, blue triple.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub fn red(&self) -> u8 {
        self.0[0]
    }

    pub fn green(&self) -> u8 {
        self.0[1]
    }

    pub fn blue(&self) -> u8 {
        self.0[2]
    }
}

impl Pixel for Rgb {
    const CHANNEL_COUNT: usize = 3;

    fn channels(&self) -> &[u8] {
        &self.0
    }

    fn channels_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }

    fn from_fn<F: FnMut(usize) -> u8>(mut f: F) -> Rgb {
        Rgb([f(0), f(1), f(2)])
    }
}

/// An owned, row-major grid of pixels. Row 0 is the top of the image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer<P: Pixel> {
    width: u32,
    height: u32,
    data: Vec<P>,
}

impl<P: Pixel> PixelBuffer<P> {
    /// A buffer filled with the default pixel.
    pub fn new(width: u32, height: u32) -> PixelBuffer<P> {
        PixelBuffer::from_pixel(width, height, P::default())
    }

    pub fn from_pixel(width: u32, height: u32, pixel: P) -> PixelBuffer<P> {
        PixelBuffer {
            width,
            height,
            data: vec![pixel; width as usize * height as usize],
        }
    }

    /// Wraps `data` if it holds exactly `width * height` pixels.
    pub fn from_vec(width: u32, height: u32, data: Vec<P>) -> Option<PixelBuffer<P>> {
        if data.len() == width as usize * height as usize {
            Some(PixelBuffer {
                width,
                height,
                data,
            })
        } else {
            None
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    fn index_of(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Returns the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> &P {
        assert!(
            x < self.width && y < self.height,
            "pixel ({}, {}) out of bounds ({}, {})",
            x,
            y,
            self.width,
            self.height
        );
        &self.data[self.index_of(x, y)]
    }

    #[inline]
    pub fn get_pixel_mut(&mut self, x: u32, y: u32) -> &mut P {
        assert!(
            x < self.width && y < self.height,
            "pixel ({}, {}) out of bounds ({}, {})",
            x,
            y,
            self.width,
            self.height
        );
        let index = self.index_of(x, y);
        &mut self.data[index]
    }

    #[inline]
    pub fn put_pixel(&mut self, x: u32, y: u32, pixel: P) {
        *self.get_pixel_mut(x, y) = pixel;
    }

    /// Returns the pixel nearest to `(x, y)`, snapping coordinates outside
    /// the buffer to the closest edge.
    #[inline]
    pub fn get_pixel_clamped(&self, x: i64, y: i64) -> &P {
        let x = x.max(0).min(i64::from(self.width) - 1) as u32;
        let y = y.max(0).min(i64::from(self.height) - 1) as u32;
        &self.data[self.index_of(x, y)]
    }

    pub fn pixels(&self) -> std::slice::Iter<'_, P> {
        self.data.iter()
    }

    pub fn pixels_mut(&mut self) -> std::slice::IterMut<'_, P> {
        self.data.iter_mut()
    }

    pub fn rows(&self) -> Chunks<'_, P> {
        self.data.chunks(self.width.max(1) as usize)
    }

    pub fn rows_mut(&mut self) -> ChunksMut<'_, P> {
        self.data.chunks_mut(self.width.max(1) as usize)
    }

    pub fn as_slice(&self) -> &[P] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [P] {
        &mut self.data
    }

    /// The channels of every pixel, row by row.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.data.len() * P::CHANNEL_COUNT);
        for p in &self.data {
            bytes.extend_from_slice(p.channels());
        }
        bytes
    }
}

impl<P: Pixel> Index<(u32, u32)> for PixelBuffer<P> {
    type Output = P;

    fn index(&self, (x, y): (u32, u32)) -> &P {
        self.get_pixel(x, y)
    }
}

impl<P: Pixel> IndexMut<(u32, u32)> for PixelBuffer<P> {
    fn index_mut(&mut self, (x, y): (u32, u32)) -> &mut P {
        self.get_pixel_mut(x, y)
    }
}

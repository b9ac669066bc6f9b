use image::RgbImage;
use ndarray::{s, ArrayView3, ArrayViewMut3};

/// A decoded photo: contiguous RGB bytes in row-major order.
///
/// Every source image is normalized to 3 channels on decode, so stages
/// downstream of the reader never branch on pixel format.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
        }
    }

    /// A solid-black RGB frame.
    pub fn blank(width: u32, height: u32) -> Self {
        Self::new(vec![0; (width as usize) * (height as usize) * 3], width, height, 3)
    }

    pub fn from_rgb_image(image: RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self::new(image.into_raw(), width, height, 3)
    }

    /// Copies the pixels into an `image` buffer; `None` for non-RGB frames.
    pub fn to_rgb_image(&self) -> Option<RgbImage> {
        if self.channels != 3 {
            return None;
        }
        RgbImage::from_raw(self.width, self.height, self.data.clone())
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        ArrayViewMut3::from_shape(self.shape(), &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Copies out the `width` x `height` window whose top-left is `(x, y)`.
    ///
    /// The window must lie inside the frame.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Frame {
        debug_assert!(x + width <= self.width && y + height <= self.height);
        let (x, y) = (x as usize, y as usize);
        let view = self.as_ndarray();
        let window = view.slice(s![y..y + height as usize, x..x + width as usize, ..]);
        let data: Vec<u8> = window.iter().copied().collect();
        Frame::new(data, width, height, self.channels)
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}

//! Image decoding and the in-memory buffer type.

use std::path::Path;

use image::{DynamicImage, GrayImage, RgbImage};

use crate::error::ProcessError;

/// Decoded 8-bit raster buffer, either single-channel or 3-channel.
///
/// Filters map each variant to the same variant: the channel count is fixed
/// at decode time and never changed by any stage. Only resize may change
/// width/height.
#[derive(Debug, Clone)]
pub enum ImageBuf {
    Gray(GrayImage),
    Rgb(RgbImage),
}

impl ImageBuf {
    pub fn width(&self) -> u32 {
        match self {
            ImageBuf::Gray(img) => img.width(),
            ImageBuf::Rgb(img) => img.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            ImageBuf::Gray(img) => img.height(),
            ImageBuf::Rgb(img) => img.height(),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    pub fn channels(&self) -> u8 {
        match self {
            ImageBuf::Gray(_) => 1,
            ImageBuf::Rgb(_) => 3,
        }
    }

    /// (width, height, channels), mostly useful for shape assertions.
    pub fn shape(&self) -> (u32, u32, u8) {
        (self.width(), self.height(), self.channels())
    }

    /// Flat sample slice: row-major, channels interleaved.
    pub fn raw(&self) -> &[u8] {
        match self {
            ImageBuf::Gray(img) => img.as_raw(),
            ImageBuf::Rgb(img) => img.as_raw(),
        }
    }
}

/// Decode an image from a file path.
///
/// Single-channel sources stay grayscale; everything else (RGB, RGBA,
/// palette, 16-bit) is converted to 8-bit RGB. An unreadable or unsupported
/// file is fatal for this image only.
pub fn decode_image<P: AsRef<Path>>(path: P) -> Result<ImageBuf, ProcessError> {
    let path = path.as_ref();
    let decoded = image::open(path).map_err(|source| ProcessError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(match decoded {
        DynamicImage::ImageLuma8(img) => ImageBuf::Gray(img),
        gray @ (DynamicImage::ImageLuma16(_)
        | DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageLumaA16(_)) => ImageBuf::Gray(gray.to_luma8()),
        other => ImageBuf::Rgb(other.to_rgb8()),
    })
}

//! Sharpen filter handlers.

use image::{GrayImage, RgbImage};

use crate::decoders::ImageBuf;
use crate::error::FilterError;

use super::primitives;

/// Laplacian kernel (second derivative, 4-neighbor).
const LAPLACIAN_3X3: [f32; 9] = [0.0, 1.0, 0.0, 1.0, -4.0, 1.0, 0.0, 1.0, 0.0];

/// Fallback kernel for custom sharpening: unity gain, so flat regions pass
/// through unchanged.
pub const DEFAULT_SHARPEN_KERNEL: [[f32; 3]; 3] =
    [[0.0, -1.0, 0.0], [-1.0, 5.0, -1.0], [0.0, -1.0, 0.0]];

/// Canny thresholds for the adaptive edge mask.
const EDGE_LOW: f32 = 50.0;
const EDGE_HIGH: f32 = 150.0;

/// Rebuild a buffer of the same variant and dimensions from flat samples.
fn rebuild_like(image: &ImageBuf, samples: Vec<u8>) -> ImageBuf {
    let (width, height) = image.dimensions();
    match image {
        ImageBuf::Gray(_) => ImageBuf::Gray(
            GrayImage::from_raw(width, height, samples)
                .expect("sample buffer length matches dimensions"),
        ),
        ImageBuf::Rgb(_) => ImageBuf::Rgb(
            RgbImage::from_raw(width, height, samples)
                .expect("sample buffer length matches dimensions"),
        ),
    }
}

/// Subtract a scaled Laplacian: `out = clamp(img - strength * lap)`.
///
/// The Laplacian is computed in floating point so negative edge responses
/// survive until the final clamp.
pub fn laplacian_sharpen(image: &ImageBuf, strength: f32) -> Result<ImageBuf, FilterError> {
    if !strength.is_finite() {
        return Err(FilterError::InvalidParameter {
            name: "strength",
            reason: "must be a finite number".to_string(),
        });
    }
    let laplacian = primitives::convolve_f32(image, &LAPLACIAN_3X3, 3, 3);
    let samples: Vec<u8> = image
        .raw()
        .iter()
        .zip(&laplacian)
        .map(|(&orig, &lap)| (orig as f32 - strength * lap).round().clamp(0.0, 255.0) as u8)
        .collect();
    Ok(rebuild_like(image, samples))
}

/// Unsharp masking: `out = img * (1 + strength) - blurred * strength`.
///
/// With a positive threshold, pixels whose |img - blurred| difference falls
/// below it keep their original value exactly, leaving low-contrast regions
/// untouched.
pub fn unsharp_mask(
    image: &ImageBuf,
    sigma: f32,
    strength: f32,
    threshold: u32,
) -> Result<ImageBuf, FilterError> {
    if !(sigma > 0.0) {
        return Err(FilterError::InvalidParameter {
            name: "sigma",
            reason: "must be positive".to_string(),
        });
    }
    let blurred = primitives::gaussian_blur_sigma(image, sigma);
    let samples: Vec<u8> = image
        .raw()
        .iter()
        .zip(blurred.raw())
        .map(|(&orig, &blur)| {
            if threshold > 0 && (orig as i32 - blur as i32).unsigned_abs() < threshold {
                orig
            } else {
                (orig as f32 * (1.0 + strength) - blur as f32 * strength)
                    .round()
                    .clamp(0.0, 255.0) as u8
            }
        })
        .collect();
    Ok(rebuild_like(image, samples))
}

/// Convolve with a caller-supplied kernel, or [`DEFAULT_SHARPEN_KERNEL`]
/// when none is configured.
pub fn custom_kernel_sharpen(
    image: &ImageBuf,
    kernel: Option<&[Vec<f32>]>,
) -> Result<ImageBuf, FilterError> {
    let (flat, width, height) = match kernel {
        Some(rows) => flatten_kernel(rows)?,
        None => (
            DEFAULT_SHARPEN_KERNEL.iter().flatten().copied().collect(),
            3,
            3,
        ),
    };
    Ok(primitives::convolve_clamped(image, &flat, width, height))
}

fn flatten_kernel(rows: &[Vec<f32>]) -> Result<(Vec<f32>, u32, u32), FilterError> {
    if rows.is_empty() || rows[0].is_empty() {
        return Err(FilterError::InvalidKernel("kernel is empty".to_string()));
    }
    let width = rows[0].len();
    if rows.iter().any(|row| row.len() != width) {
        return Err(FilterError::InvalidKernel(
            "rows have unequal lengths".to_string(),
        ));
    }
    let height = rows.len();
    if width % 2 == 0 || height % 2 == 0 {
        return Err(FilterError::InvalidKernel(format!(
            "dimensions must be odd, got {}x{}",
            width, height
        )));
    }
    let flat = rows.iter().flatten().copied().collect();
    Ok((flat, width as u32, height as u32))
}

/// Edge-masked sharpening: a full unsharp pass blended back onto the
/// original through a dilated Canny edge map, so flat regions stay
/// near-original while edges get the full effect.
pub fn adaptive_sharpen(image: &ImageBuf, strength: f32) -> Result<ImageBuf, FilterError> {
    let mask = primitives::edge_mask(image, EDGE_LOW, EDGE_HIGH);
    let sharpened = unsharp_mask(image, 1.0, strength, 0)?;

    let channels = image.channels() as usize;
    let mask_raw = mask.as_raw();
    let samples: Vec<u8> = image
        .raw()
        .iter()
        .zip(sharpened.raw())
        .enumerate()
        .map(|(i, (&orig, &sharp))| {
            // Mask is single-channel; broadcast across interleaved samples
            let m = mask_raw[i / channels] as f32 / 255.0;
            (sharp as f32 * m + orig as f32 * (1.0 - m)).round() as u8
        })
        .collect();
    Ok(rebuild_like(image, samples))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    fn gradient_rgb(width: u32, height: u32) -> ImageBuf {
        ImageBuf::Rgb(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 20) as u8, (y * 20) as u8, 128])
        }))
    }

    #[test]
    fn test_all_modes_preserve_shape() {
        let image = gradient_rgb(11, 7);
        let shape = image.shape();

        assert_eq!(laplacian_sharpen(&image, 0.5).unwrap().shape(), shape);
        assert_eq!(unsharp_mask(&image, 1.0, 1.5, 0).unwrap().shape(), shape);
        assert_eq!(custom_kernel_sharpen(&image, None).unwrap().shape(), shape);
        assert_eq!(adaptive_sharpen(&image, 1.0).unwrap().shape(), shape);
    }

    #[test]
    fn test_all_modes_preserve_shape_gray() {
        let image = ImageBuf::Gray(GrayImage::from_fn(9, 13, |x, y| {
            Luma([(x * 13 + y * 29) as u8])
        }));
        let shape = image.shape();

        assert_eq!(laplacian_sharpen(&image, 0.5).unwrap().shape(), shape);
        assert_eq!(unsharp_mask(&image, 1.0, 1.5, 0).unwrap().shape(), shape);
        assert_eq!(custom_kernel_sharpen(&image, None).unwrap().shape(), shape);
        assert_eq!(adaptive_sharpen(&image, 1.0).unwrap().shape(), shape);
    }

    #[test]
    fn test_unsharp_threshold_preserves_low_contrast_pixels() {
        // A gentle gradient: every |orig - blurred| difference is far below
        // the threshold, so the output must be bit-identical to the input.
        let image = ImageBuf::Gray(GrayImage::from_fn(12, 12, |x, _| Luma([100 + x as u8])));
        let out = unsharp_mask(&image, 1.0, 1.5, 200).unwrap();
        assert_eq!(out.raw(), image.raw());
    }

    #[test]
    fn test_unsharp_zero_threshold_sharpens_everything() {
        // A hard edge must change under unsharp masking with threshold 0
        let image = ImageBuf::Gray(GrayImage::from_fn(12, 12, |x, _| {
            Luma([if x < 6 { 40 } else { 200 }])
        }));
        let out = unsharp_mask(&image, 1.0, 1.5, 0).unwrap();
        assert_ne!(out.raw(), image.raw());
    }

    #[test]
    fn test_default_kernel_is_unity_gain() {
        let flat = ImageBuf::Rgb(RgbImage::from_pixel(9, 9, Rgb([120, 64, 33])));
        let out = custom_kernel_sharpen(&flat, None).unwrap();
        assert_eq!(out.raw(), flat.raw());
    }

    #[test]
    fn test_custom_kernel_validation() {
        let image = gradient_rgb(5, 5);

        let empty: Vec<Vec<f32>> = Vec::new();
        assert!(custom_kernel_sharpen(&image, Some(&empty)).is_err());

        let ragged = vec![vec![0.0, 1.0], vec![0.0]];
        assert!(custom_kernel_sharpen(&image, Some(&ragged)).is_err());

        let even = vec![vec![1.0, 1.0], vec![1.0, 1.0]];
        assert!(custom_kernel_sharpen(&image, Some(&even)).is_err());

        let identity = vec![
            vec![0.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 0.0],
        ];
        let out = custom_kernel_sharpen(&image, Some(&identity)).unwrap();
        assert_eq!(out.raw(), image.raw());
    }

    #[test]
    fn test_laplacian_leaves_flat_image_unchanged() {
        // Second derivative of a constant field is zero everywhere
        let flat = ImageBuf::Gray(GrayImage::from_pixel(8, 8, Luma([90])));
        let out = laplacian_sharpen(&flat, 0.5).unwrap();
        assert_eq!(out.raw(), flat.raw());
    }

    #[test]
    fn test_adaptive_leaves_flat_regions_near_original() {
        // No edges anywhere: the mask is empty and the blend returns the
        // original image untouched.
        let flat = ImageBuf::Rgb(RgbImage::from_pixel(10, 10, Rgb([77, 77, 77])));
        let out = adaptive_sharpen(&flat, 1.5).unwrap();
        assert_eq!(out.raw(), flat.raw());
    }

    #[test]
    fn test_unsharp_rejects_non_positive_sigma() {
        let image = gradient_rgb(4, 4);
        assert!(unsharp_mask(&image, 0.0, 1.5, 0).is_err());
        assert!(unsharp_mask(&image, -1.0, 1.5, 0).is_err());
    }
}

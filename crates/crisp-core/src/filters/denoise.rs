//! Denoise filter handlers.
//!
//! Every handler is a pure transform: same dimensions out, same channel
//! count out, no shared state.

use crate::decoders::ImageBuf;
use crate::error::FilterError;

use super::primitives;

/// Gaussian blur with an explicit kernel size and sigma.
pub fn gaussian_denoise(
    image: &ImageBuf,
    kernel_size: (u32, u32),
    sigma: f32,
) -> Result<ImageBuf, FilterError> {
    let (kw, kh) = kernel_size;
    if kw == 0 || kw % 2 == 0 {
        return Err(FilterError::InvalidKernelSize(kw));
    }
    if kh == 0 || kh % 2 == 0 {
        return Err(FilterError::InvalidKernelSize(kh));
    }
    let kernel = primitives::gaussian_kernel(kw, kh, sigma);
    Ok(primitives::convolve_clamped(image, &kernel, kw, kh))
}

/// Arithmetic mean (box) blur.
pub fn mean_denoise(image: &ImageBuf, kernel_size: (u32, u32)) -> Result<ImageBuf, FilterError> {
    let (kw, kh) = kernel_size;
    if kw == 0 || kw % 2 == 0 {
        return Err(FilterError::InvalidKernelSize(kw));
    }
    if kh == 0 || kh % 2 == 0 {
        return Err(FilterError::InvalidKernelSize(kh));
    }
    let weight = 1.0 / (kw * kh) as f32;
    let kernel = vec![weight; (kw * kh) as usize];
    Ok(primitives::convolve_clamped(image, &kernel, kw, kh))
}

/// Median blur, effective against salt-and-pepper noise.
pub fn median_denoise(image: &ImageBuf, kernel_size: u32) -> Result<ImageBuf, FilterError> {
    primitives::median_blur(image, kernel_size)
}

/// Edge-preserving bilateral filter.
pub fn bilateral_denoise(
    image: &ImageBuf,
    d: u32,
    sigma_color: f32,
    sigma_space: f32,
) -> Result<ImageBuf, FilterError> {
    primitives::bilateral(image, d, sigma_color, sigma_space)
}

/// Non-local means.
///
/// Color images take the colored variant, single-channel images the
/// grayscale variant. The branch is load-bearing: the two primitives use
/// different patch distances and are not interchangeable.
pub fn nlmeans_denoise(
    image: &ImageBuf,
    h: f32,
    template_window_size: u32,
    search_window_size: u32,
) -> Result<ImageBuf, FilterError> {
    match image {
        ImageBuf::Gray(img) => Ok(ImageBuf::Gray(primitives::nlmeans_gray(
            img,
            h,
            template_window_size,
            search_window_size,
        )?)),
        ImageBuf::Rgb(img) => Ok(ImageBuf::Rgb(primitives::nlmeans_rgb(
            img,
            h,
            template_window_size,
            search_window_size,
        )?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    fn noisy_rgb(width: u32, height: u32) -> ImageBuf {
        ImageBuf::Rgb(RgbImage::from_fn(width, height, |x, y| {
            // Deterministic speckle pattern
            let v = ((x * 31 + y * 17) % 251) as u8;
            Rgb([v, v.wrapping_add(40), v.wrapping_mul(3)])
        }))
    }

    fn noisy_gray(width: u32, height: u32) -> ImageBuf {
        ImageBuf::Gray(GrayImage::from_fn(width, height, |x, y| {
            Luma([((x * 31 + y * 17) % 251) as u8])
        }))
    }

    #[test]
    fn test_all_modes_preserve_shape_rgb() {
        let image = noisy_rgb(12, 9);
        let shape = image.shape();

        assert_eq!(gaussian_denoise(&image, (5, 5), 1.0).unwrap().shape(), shape);
        assert_eq!(mean_denoise(&image, (5, 5)).unwrap().shape(), shape);
        assert_eq!(median_denoise(&image, 5).unwrap().shape(), shape);
        assert_eq!(bilateral_denoise(&image, 9, 75.0, 75.0).unwrap().shape(), shape);
        assert_eq!(nlmeans_denoise(&image, 10.0, 3, 7).unwrap().shape(), shape);
    }

    #[test]
    fn test_all_modes_preserve_shape_gray() {
        let image = noisy_gray(10, 10);
        let shape = image.shape();

        assert_eq!(gaussian_denoise(&image, (3, 3), 1.0).unwrap().shape(), shape);
        assert_eq!(mean_denoise(&image, (3, 3)).unwrap().shape(), shape);
        assert_eq!(median_denoise(&image, 3).unwrap().shape(), shape);
        assert_eq!(bilateral_denoise(&image, 5, 75.0, 75.0).unwrap().shape(), shape);
        assert_eq!(nlmeans_denoise(&image, 10.0, 3, 7).unwrap().shape(), shape);
    }

    #[test]
    fn test_nlmeans_branches_on_channel_count() {
        // The colored and grayscale variants stay in their own lane:
        // channel count in equals channel count out for both.
        let color = nlmeans_denoise(&noisy_rgb(6, 6), 10.0, 3, 5).unwrap();
        assert!(matches!(color, ImageBuf::Rgb(_)));

        let gray = nlmeans_denoise(&noisy_gray(6, 6), 10.0, 3, 5).unwrap();
        assert!(matches!(gray, ImageBuf::Gray(_)));
    }

    #[test]
    fn test_gaussian_rejects_even_kernel() {
        let image = noisy_gray(6, 6);
        assert!(gaussian_denoise(&image, (4, 5), 1.0).is_err());
        assert!(gaussian_denoise(&image, (5, 0), 1.0).is_err());
    }

    #[test]
    fn test_mean_denoise_flattens_toward_local_average() {
        // A single bright pixel in a dark field is pulled down hard
        let mut img = GrayImage::from_pixel(7, 7, Luma([0]));
        img.put_pixel(3, 3, Luma([255]));
        let out = mean_denoise(&ImageBuf::Gray(img), (5, 5)).unwrap();
        let center = match &out {
            ImageBuf::Gray(g) => g.get_pixel(3, 3)[0],
            ImageBuf::Rgb(_) => unreachable!(),
        };
        assert!(center <= 11, "255/25 rounds to ~10, got {center}");
    }
}

//! Thin wrappers over the imageproc filter primitives, applied per
//! [`ImageBuf`] variant, plus the non-local-means implementation (the one
//! algorithm no primitives crate provides).

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::definitions::{Clamp, Image};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::{bilateral_filter, gaussian_blur_f32, median_filter, Kernel};
use imageproc::morphology::dilate;

use crate::decoders::ImageBuf;
use crate::error::FilterError;

/// Convolve with an arbitrary kernel, clamping the accumulator back to u8.
pub(crate) fn convolve_clamped(
    image: &ImageBuf,
    kernel: &[f32],
    width: u32,
    height: u32,
) -> ImageBuf {
    let kernel = Kernel::new(kernel, width, height);
    match image {
        ImageBuf::Gray(img) => ImageBuf::Gray(kernel.filter(img, |channel, acc| {
            *channel = <u8 as Clamp<f32>>::clamp(acc)
        })),
        ImageBuf::Rgb(img) => ImageBuf::Rgb(kernel.filter(img, |channel, acc| {
            *channel = <u8 as Clamp<f32>>::clamp(acc)
        })),
    }
}

/// Convolve into unclamped f32 samples, for derivative kernels whose
/// response can be negative.
pub(crate) fn convolve_f32(image: &ImageBuf, kernel: &[f32], width: u32, height: u32) -> Vec<f32> {
    let kernel = Kernel::new(kernel, width, height);
    match image {
        ImageBuf::Gray(img) => {
            let out: Image<Luma<f32>> = kernel.filter(img, |channel, acc| *channel = acc);
            out.into_raw()
        }
        ImageBuf::Rgb(img) => {
            let out: Image<Rgb<f32>> = kernel.filter(img, |channel, acc| *channel = acc);
            out.into_raw()
        }
    }
}

/// Sampled 1-D Gaussian. A non-positive sigma is derived from the kernel
/// size the way OpenCV's GaussianBlur does it.
fn gaussian_1d(size: u32, sigma: f32) -> Vec<f32> {
    let sigma = if sigma > 0.0 {
        sigma
    } else {
        0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
    };
    let half = (size / 2) as i32;
    let mut kernel: Vec<f32> = (0..size as i32)
        .map(|i| {
            let d = (i - half) as f32;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }
    kernel
}

/// Normalized 2-D Gaussian kernel with explicit width/height and sigma.
pub(crate) fn gaussian_kernel(width: u32, height: u32, sigma: f32) -> Vec<f32> {
    let kx = gaussian_1d(width, sigma);
    let ky = gaussian_1d(height, sigma);
    let mut kernel = Vec::with_capacity((width * height) as usize);
    for y in &ky {
        for x in &kx {
            kernel.push(y * x);
        }
    }
    kernel
}

/// Gaussian blur where only sigma is given and the window is derived from
/// it (the unsharp-mask blur).
pub(crate) fn gaussian_blur_sigma(image: &ImageBuf, sigma: f32) -> ImageBuf {
    match image {
        ImageBuf::Gray(img) => ImageBuf::Gray(gaussian_blur_f32(img, sigma)),
        ImageBuf::Rgb(img) => ImageBuf::Rgb(gaussian_blur_f32(img, sigma)),
    }
}

/// Median blur with an odd window size.
pub(crate) fn median_blur(image: &ImageBuf, kernel_size: u32) -> Result<ImageBuf, FilterError> {
    if kernel_size == 0 || kernel_size % 2 == 0 {
        return Err(FilterError::InvalidKernelSize(kernel_size));
    }
    let radius = kernel_size / 2;
    Ok(match image {
        ImageBuf::Gray(img) => ImageBuf::Gray(median_filter(img, radius, radius)),
        ImageBuf::Rgb(img) => ImageBuf::Rgb(median_filter(img, radius, radius)),
    })
}

/// Bilateral filter. The underlying primitive is single-channel, so color
/// images are filtered per channel and re-interleaved. `d` is the window
/// diameter, converted to the primitive's radius.
pub(crate) fn bilateral(
    image: &ImageBuf,
    d: u32,
    sigma_color: f32,
    sigma_space: f32,
) -> Result<ImageBuf, FilterError> {
    if d == 0 {
        return Err(FilterError::InvalidParameter {
            name: "d",
            reason: "neighborhood diameter must be non-zero".to_string(),
        });
    }
    let radius = d / 2;
    Ok(match image {
        ImageBuf::Gray(img) => {
            ImageBuf::Gray(bilateral_filter(img, radius, sigma_color, sigma_space))
        }
        ImageBuf::Rgb(img) => {
            let [r, g, b] = split_rgb(img);
            let r = bilateral_filter(&r, radius, sigma_color, sigma_space);
            let g = bilateral_filter(&g, radius, sigma_color, sigma_space);
            let b = bilateral_filter(&b, radius, sigma_color, sigma_space);
            ImageBuf::Rgb(merge_rgb(&r, &g, &b))
        }
    })
}

/// Dilated Canny edge map of the image's grayscale derivative. Returned as
/// a 0/255 mask with the same dimensions as the input.
pub(crate) fn edge_mask(image: &ImageBuf, low: f32, high: f32) -> GrayImage {
    let gray = match image {
        ImageBuf::Gray(img) => img.clone(),
        ImageBuf::Rgb(img) => image::imageops::grayscale(img),
    };
    let edges = canny(&gray, low, high);
    dilate(&edges, Norm::LInf, 1)
}

pub(crate) fn split_rgb(img: &RgbImage) -> [GrayImage; 3] {
    let (width, height) = img.dimensions();
    let mut channels = [
        GrayImage::new(width, height),
        GrayImage::new(width, height),
        GrayImage::new(width, height),
    ];
    for (x, y, pixel) in img.enumerate_pixels() {
        for (c, channel) in channels.iter_mut().enumerate() {
            channel.put_pixel(x, y, Luma([pixel[c]]));
        }
    }
    channels
}

pub(crate) fn merge_rgb(r: &GrayImage, g: &GrayImage, b: &GrayImage) -> RgbImage {
    let (width, height) = r.dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            r.get_pixel(x, y)[0],
            g.get_pixel(x, y)[0],
            b.get_pixel(x, y)[0],
        ])
    })
}

fn validate_nlmeans(h: f32, template: u32, search: u32) -> Result<(), FilterError> {
    if !(h > 0.0) {
        return Err(FilterError::InvalidParameter {
            name: "h",
            reason: "filtering strength must be positive".to_string(),
        });
    }
    if template == 0 || template % 2 == 0 {
        return Err(FilterError::InvalidKernelSize(template));
    }
    if search == 0 || search % 2 == 0 || search < template {
        return Err(FilterError::InvalidKernelSize(search));
    }
    Ok(())
}

#[inline]
fn clamp_coord(v: i64, max: u32) -> u32 {
    v.clamp(0, max as i64 - 1) as u32
}

/// Non-local means for single-channel images.
///
/// For every pixel, candidates inside the search window are weighted by the
/// similarity of their surrounding patches, and the weighted average
/// replaces the pixel. Patches are compared with mean squared difference;
/// border patches clamp to the image edge.
pub(crate) fn nlmeans_gray(
    img: &GrayImage,
    h: f32,
    template: u32,
    search: u32,
) -> Result<GrayImage, FilterError> {
    validate_nlmeans(h, template, search)?;
    let (width, height) = img.dimensions();
    let t = (template / 2) as i64;
    let s = (search / 2) as i64;
    let h2 = h * h;
    let patch_len = (template * template) as f32;

    let out = GrayImage::from_fn(width, height, |x, y| {
        let mut weight_sum = 0.0f32;
        let mut value_sum = 0.0f32;
        for ny in -s..=s {
            for nx in -s..=s {
                let cx = clamp_coord(x as i64 + nx, width);
                let cy = clamp_coord(y as i64 + ny, height);

                let mut dist = 0.0f32;
                for py in -t..=t {
                    for px in -t..=t {
                        let a = img.get_pixel(
                            clamp_coord(x as i64 + px, width),
                            clamp_coord(y as i64 + py, height),
                        )[0] as f32;
                        let b = img.get_pixel(
                            clamp_coord(cx as i64 + px, width),
                            clamp_coord(cy as i64 + py, height),
                        )[0] as f32;
                        dist += (a - b) * (a - b);
                    }
                }
                let weight = (-(dist / patch_len) / h2).exp();
                weight_sum += weight;
                value_sum += weight * img.get_pixel(cx, cy)[0] as f32;
            }
        }
        Luma([(value_sum / weight_sum).round().clamp(0.0, 255.0) as u8])
    });
    Ok(out)
}

/// Non-local means for color images.
///
/// Not interchangeable with the grayscale variant: patch distance is joint
/// over all three channels, producing a single weight that is applied to
/// each channel, which preserves color edges that per-channel filtering
/// would smear.
pub(crate) fn nlmeans_rgb(
    img: &RgbImage,
    h: f32,
    template: u32,
    search: u32,
) -> Result<RgbImage, FilterError> {
    validate_nlmeans(h, template, search)?;
    let (width, height) = img.dimensions();
    let t = (template / 2) as i64;
    let s = (search / 2) as i64;
    let h2 = h * h;
    let patch_len = (template * template * 3) as f32;

    let out = RgbImage::from_fn(width, height, |x, y| {
        let mut weight_sum = 0.0f32;
        let mut value_sum = [0.0f32; 3];
        for ny in -s..=s {
            for nx in -s..=s {
                let cx = clamp_coord(x as i64 + nx, width);
                let cy = clamp_coord(y as i64 + ny, height);

                let mut dist = 0.0f32;
                for py in -t..=t {
                    for px in -t..=t {
                        let a = img.get_pixel(
                            clamp_coord(x as i64 + px, width),
                            clamp_coord(y as i64 + py, height),
                        );
                        let b = img.get_pixel(
                            clamp_coord(cx as i64 + px, width),
                            clamp_coord(cy as i64 + py, height),
                        );
                        for c in 0..3 {
                            let d = a[c] as f32 - b[c] as f32;
                            dist += d * d;
                        }
                    }
                }
                let weight = (-(dist / patch_len) / h2).exp();
                weight_sum += weight;
                let candidate = img.get_pixel(cx, cy);
                for c in 0..3 {
                    value_sum[c] += weight * candidate[c] as f32;
                }
            }
        }
        Rgb([
            (value_sum[0] / weight_sum).round().clamp(0.0, 255.0) as u8,
            (value_sum[1] / weight_sum).round().clamp(0.0, 255.0) as u8,
            (value_sum[2] / weight_sum).round().clamp(0.0, 255.0) as u8,
        ])
    });
    Ok(out)
}

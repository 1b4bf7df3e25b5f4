//! Per-image processing pipeline.
//!
//! Strictly sequential per image: optional resize, mandatory denoise,
//! optional sharpen. Decode and encode live with their collaborators; this
//! module only transforms in-memory buffers and therefore cannot fail an
//! image outright: a failing filter stage is logged and the pipeline
//! continues with the previous stage's image.

use image::imageops::{self, FilterType};

use crate::decoders::ImageBuf;
use crate::error::FilterError;
use crate::filters;
use crate::models::{ProcessingConfig, ResizeSettings};
use crate::verbose_println;

/// Run the filtering pipeline for one image.
///
/// The config is read-only and the image buffer is owned for the duration
/// of the call, so concurrent invocations over different images need no
/// synchronization.
pub fn process_image(image: ImageBuf, config: &ProcessingConfig) -> ImageBuf {
    let image = if config.resize.enabled {
        resize_if_needed(image, &config.resize)
    } else {
        image
    };

    verbose_println!("  denoise: {}", config.denoise.mode.label());
    let image = run_stage("denoise", image, |img| {
        filters::apply_denoise(img, config.denoise.mode, &config.denoise)
    });

    if config.sharpen.enabled {
        verbose_println!("  sharpen: {}", config.sharpen.mode.label());
        run_stage("sharpen", image, |img| {
            filters::apply_sharpen(img, config.sharpen.mode, &config.sharpen)
        })
    } else {
        image
    }
}

/// Stage isolation policy: on failure, warn and substitute the pre-stage
/// image so one broken filter never costs the whole image.
fn run_stage<F>(name: &str, input: ImageBuf, stage: F) -> ImageBuf
where
    F: FnOnce(&ImageBuf) -> Result<ImageBuf, FilterError>,
{
    match stage(&input) {
        Ok(output) => output,
        Err(err) => {
            eprintln!("  warning: {} stage failed, keeping previous image: {}", name, err);
            input
        }
    }
}

/// Compute the downscale target, or `None` when the image is already
/// within bounds.
///
/// With aspect preservation a single scale factor `min(max_w/w, max_h/h)`
/// applies to both dimensions (f64, truncating), otherwise the maxima are
/// used directly and the aspect may distort.
pub fn target_dimensions(width: u32, height: u32, settings: &ResizeSettings) -> Option<(u32, u32)> {
    if width <= settings.max_width && height <= settings.max_height {
        return None;
    }

    if settings.preserve_aspect_ratio {
        let scale = f64::min(
            settings.max_width as f64 / width as f64,
            settings.max_height as f64 / height as f64,
        );
        let new_width = ((width as f64 * scale) as u32).max(1);
        let new_height = ((height as f64 * scale) as u32).max(1);
        Some((new_width, new_height))
    } else {
        Some((settings.max_width, settings.max_height))
    }
}

fn resize_if_needed(image: ImageBuf, settings: &ResizeSettings) -> ImageBuf {
    let (width, height) = image.dimensions();
    let Some((new_width, new_height)) = target_dimensions(width, height, settings) else {
        return image;
    };

    verbose_println!(
        "  resized {}x{} -> {}x{}",
        width,
        height,
        new_width,
        new_height
    );
    let filter = select_filter(width, height, new_width, new_height);
    match image {
        ImageBuf::Gray(img) => {
            ImageBuf::Gray(imageops::resize(&img, new_width, new_height, filter))
        }
        ImageBuf::Rgb(img) => ImageBuf::Rgb(imageops::resize(&img, new_width, new_height, filter)),
    }
}

/// Pick a resampling filter by downscale ratio: cheap filters for heavy
/// reductions where their artifacts vanish, Lanczos near 1:1.
fn select_filter(orig_width: u32, orig_height: u32, new_width: u32, new_height: u32) -> FilterType {
    let width_ratio = orig_width as f32 / new_width as f32;
    let height_ratio = orig_height as f32 / new_height as f32;
    let max_ratio = width_ratio.max(height_ratio);

    if max_ratio > 2.0 {
        FilterType::Triangle
    } else if max_ratio > 1.5 {
        FilterType::CatmullRom
    } else {
        FilterType::Lanczos3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DenoiseMode, SharpenMode};
    use image::{Rgb, RgbImage};

    fn test_image(width: u32, height: u32) -> ImageBuf {
        ImageBuf::Rgb(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        }))
    }

    #[test]
    fn test_target_dimensions_preserve_aspect() {
        let settings = ResizeSettings {
            enabled: true,
            max_width: 1920,
            max_height: 1080,
            preserve_aspect_ratio: true,
        };
        // scale = min(1920/3000, 1080/2000) = 0.54
        assert_eq!(target_dimensions(3000, 2000, &settings), Some((1620, 1080)));
    }

    #[test]
    fn test_target_dimensions_within_bounds_passes_through() {
        let settings = ResizeSettings {
            enabled: true,
            max_width: 1920,
            max_height: 1080,
            preserve_aspect_ratio: true,
        };
        assert_eq!(target_dimensions(1920, 1080, &settings), None);
        assert_eq!(target_dimensions(640, 480, &settings), None);
    }

    #[test]
    fn test_target_dimensions_stretch_when_aspect_not_preserved() {
        let settings = ResizeSettings {
            enabled: true,
            max_width: 1920,
            max_height: 1080,
            preserve_aspect_ratio: false,
        };
        assert_eq!(target_dimensions(3000, 2000, &settings), Some((1920, 1080)));
    }

    #[test]
    fn test_pipeline_preserves_shape_without_resize() {
        let image = test_image(16, 12);
        let shape = image.shape();
        let config = ProcessingConfig::default();
        let out = process_image(image, &config);
        assert_eq!(out.shape(), shape);
    }

    #[test]
    fn test_pipeline_resizes_oversized_image() {
        let image = test_image(40, 20);
        let mut config = ProcessingConfig::default();
        config.resize.enabled = true;
        config.resize.max_width = 20;
        config.resize.max_height = 20;
        let out = process_image(image, &config);
        // scale = min(20/40, 20/20) = 0.5
        assert_eq!(out.dimensions(), (20, 10));
        assert_eq!(out.channels(), 3);
    }

    #[test]
    fn test_denoise_failure_falls_back_to_input() {
        let image = test_image(10, 10);
        let original = image.raw().to_vec();

        let mut config = ProcessingConfig::default();
        config.denoise.mode = DenoiseMode::Median;
        config.denoise.median.kernel_size = 4; // invalid: stage fails
        config.sharpen.enabled = false;

        let out = process_image(image, &config);
        assert_eq!(out.raw(), &original[..]);
    }

    #[test]
    fn test_denoise_failure_still_reaches_sharpen_stage() {
        // Flat image + failing denoise + unity custom sharpen: the sharpen
        // stage runs on the fallback image and returns it unchanged. If the
        // pipeline aborted at the denoise failure the result would be the
        // same bytes, so also check a sharpen mode with visible effect.
        let flat = ImageBuf::Rgb(RgbImage::from_pixel(10, 10, Rgb([90, 90, 90])));
        let edge = ImageBuf::Rgb(RgbImage::from_fn(10, 10, |x, _| {
            Rgb(if x < 5 { [20, 20, 20] } else { [220, 220, 220] })
        }));

        let mut config = ProcessingConfig::default();
        config.denoise.mode = DenoiseMode::Median;
        config.denoise.median.kernel_size = 4; // invalid: stage fails
        config.sharpen.enabled = true;
        config.sharpen.mode = SharpenMode::Custom; // unity default kernel

        let out = process_image(flat.clone(), &config);
        assert_eq!(out.raw(), flat.raw());

        config.sharpen.mode = SharpenMode::UnsharpMask;
        let out = process_image(edge.clone(), &config);
        // Sharpening the fallback image must have changed the hard edge
        assert_ne!(out.raw(), edge.raw());
        assert_eq!(out.shape(), edge.shape());
    }

    #[test]
    fn test_sharpen_disabled_skips_stage() {
        // Flat image: median is a no-op, and with sharpening off the
        // pipeline must return it byte-identical.
        let image = ImageBuf::Rgb(RgbImage::from_pixel(8, 8, Rgb([44, 55, 66])));
        let mut config = ProcessingConfig::default();
        config.denoise.mode = DenoiseMode::Median;
        config.denoise.median.kernel_size = 3;
        config.sharpen.enabled = false;

        let out = process_image(image.clone(), &config);
        assert_eq!(out.raw(), image.raw());
    }
}

//! Filter selection for the denoise and sharpen stages.
//!
//! Dispatch is an exhaustive match over the closed mode enums, one handler
//! per variant; an unsupported mode cannot reach this layer. Parameters
//! come from the per-mode blocks of the typed settings, so defaults were
//! already resolved at config load.

pub mod denoise;
mod primitives;
pub mod sharpen;

use crate::decoders::ImageBuf;
use crate::error::FilterError;
use crate::models::{DenoiseMode, DenoiseSettings, SharpenMode, SharpenSettings};

/// Apply the selected denoise filter. Pure transform: same shape out,
/// channel count untouched.
pub fn apply_denoise(
    image: &ImageBuf,
    mode: DenoiseMode,
    params: &DenoiseSettings,
) -> Result<ImageBuf, FilterError> {
    match mode {
        DenoiseMode::Gaussian => {
            denoise::gaussian_denoise(image, params.gaussian.kernel_size, params.gaussian.sigma)
        }
        DenoiseMode::Mean => denoise::mean_denoise(image, params.mean.kernel_size),
        DenoiseMode::Median => denoise::median_denoise(image, params.median.kernel_size),
        DenoiseMode::Bilateral => denoise::bilateral_denoise(
            image,
            params.bilateral.d,
            params.bilateral.sigma_color,
            params.bilateral.sigma_space,
        ),
        DenoiseMode::NlMeans => denoise::nlmeans_denoise(
            image,
            params.nlmeans.h,
            params.nlmeans.template_window_size,
            params.nlmeans.search_window_size,
        ),
    }
}

/// Apply the selected sharpen filter.
pub fn apply_sharpen(
    image: &ImageBuf,
    mode: SharpenMode,
    params: &SharpenSettings,
) -> Result<ImageBuf, FilterError> {
    match mode {
        SharpenMode::Laplacian => sharpen::laplacian_sharpen(image, params.laplacian.strength),
        SharpenMode::UnsharpMask => sharpen::unsharp_mask(
            image,
            params.unsharp_mask.sigma,
            params.unsharp_mask.strength,
            params.unsharp_mask.threshold,
        ),
        SharpenMode::Custom => {
            sharpen::custom_kernel_sharpen(image, params.custom.kernel.as_deref())
        }
        SharpenMode::Adaptive => sharpen::adaptive_sharpen(image, params.adaptive.strength),
    }
}

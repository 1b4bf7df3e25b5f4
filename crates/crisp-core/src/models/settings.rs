//! Typed processing configuration and per-mode filter parameters.
//!
//! Every struct deserializes with `#[serde(default)]` so partial config
//! files work, and unknown keys are ignored. `sanitize` repairs values that
//! parse but cannot be used (even kernel sizes, zero dimensions, quality
//! above 100) instead of failing the whole file.

use std::path::PathBuf;

use serde::Deserialize;

use super::enums::{DenoiseMode, OutputFormat, SharpenMode};

/// Complete configuration for one batch run.
///
/// Loaded once before the batch begins and treated as read-only for its
/// duration; the pipeline never mutates it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub paths: PathSettings,
    pub denoise: DenoiseSettings,
    pub sharpen: SharpenSettings,
    pub output: OutputSettings,
    pub resize: ResizeSettings,
    pub verbose: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            paths: PathSettings::default(),
            denoise: DenoiseSettings::default(),
            sharpen: SharpenSettings::default(),
            output: OutputSettings::default(),
            resize: ResizeSettings::default(),
            verbose: true,
        }
    }
}

impl ProcessingConfig {
    pub fn sanitize(mut self) -> Self {
        self.denoise.sanitize();
        self.sharpen.sanitize();
        self.output.sanitize();
        self.resize.sanitize();
        self
    }
}

/// Input and output directories.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
        }
    }
}

/// Denoise stage settings: active mode plus one parameter block per mode.
///
/// Only the block matching `mode` is read; the others keep their defaults
/// so switching modes never loses tuning.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DenoiseSettings {
    pub mode: DenoiseMode,
    pub gaussian: GaussianParams,
    pub mean: MeanParams,
    pub median: MedianParams,
    pub bilateral: BilateralParams,
    pub nlmeans: NlMeansParams,
}

impl DenoiseSettings {
    fn sanitize(&mut self) {
        self.gaussian.kernel_size.0 = force_odd(self.gaussian.kernel_size.0, 5);
        self.gaussian.kernel_size.1 = force_odd(self.gaussian.kernel_size.1, 5);
        if !self.gaussian.sigma.is_finite() || self.gaussian.sigma < 0.0 {
            self.gaussian.sigma = 0.0;
        }
        self.mean.kernel_size.0 = force_odd(self.mean.kernel_size.0, 5);
        self.mean.kernel_size.1 = force_odd(self.mean.kernel_size.1, 5);
        self.median.kernel_size = force_odd(self.median.kernel_size, 5);
        if self.bilateral.d == 0 {
            self.bilateral.d = BilateralParams::default().d;
        }
        self.nlmeans.template_window_size = force_odd(self.nlmeans.template_window_size, 7);
        self.nlmeans.search_window_size = force_odd(self.nlmeans.search_window_size, 21);
        if self.nlmeans.search_window_size < self.nlmeans.template_window_size {
            self.nlmeans.search_window_size = self.nlmeans.template_window_size;
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GaussianParams {
    /// Kernel width/height; both must be odd
    pub kernel_size: (u32, u32),
    /// Standard deviation; 0 derives it from the kernel size
    pub sigma: f32,
}

impl Default for GaussianParams {
    fn default() -> Self {
        Self {
            kernel_size: (5, 5),
            sigma: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MeanParams {
    pub kernel_size: (u32, u32),
}

impl Default for MeanParams {
    fn default() -> Self {
        Self { kernel_size: (5, 5) }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MedianParams {
    /// Window size; must be odd
    pub kernel_size: u32,
}

impl Default for MedianParams {
    fn default() -> Self {
        Self { kernel_size: 5 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BilateralParams {
    /// Pixel neighborhood diameter
    pub d: u32,
    /// Filter sigma in color space
    pub sigma_color: f32,
    /// Filter sigma in coordinate space
    pub sigma_space: f32,
}

impl Default for BilateralParams {
    fn default() -> Self {
        Self {
            d: 9,
            sigma_color: 75.0,
            sigma_space: 75.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NlMeansParams {
    /// Filtering strength
    pub h: f32,
    /// Patch size used for similarity; must be odd
    pub template_window_size: u32,
    /// Search area around each pixel; must be odd
    pub search_window_size: u32,
}

impl Default for NlMeansParams {
    fn default() -> Self {
        Self {
            h: 10.0,
            template_window_size: 7,
            search_window_size: 21,
        }
    }
}

/// Sharpen stage settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SharpenSettings {
    pub enabled: bool,
    pub mode: SharpenMode,
    pub laplacian: LaplacianParams,
    pub unsharp_mask: UnsharpMaskParams,
    pub custom: CustomParams,
    pub adaptive: AdaptiveParams,
}

impl Default for SharpenSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: SharpenMode::default(),
            laplacian: LaplacianParams::default(),
            unsharp_mask: UnsharpMaskParams::default(),
            custom: CustomParams::default(),
            adaptive: AdaptiveParams::default(),
        }
    }
}

impl SharpenSettings {
    fn sanitize(&mut self) {
        if !self.unsharp_mask.sigma.is_finite() || self.unsharp_mask.sigma <= 0.0 {
            self.unsharp_mask.sigma = UnsharpMaskParams::default().sigma;
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LaplacianParams {
    pub strength: f32,
}

impl Default for LaplacianParams {
    fn default() -> Self {
        Self { strength: 0.5 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UnsharpMaskParams {
    /// Gaussian blur standard deviation
    pub sigma: f32,
    /// Amount of the blurred negative to add back
    pub strength: f32,
    /// Pixels whose |original - blurred| falls below this keep their
    /// original value; 0 disables the mask
    pub threshold: u32,
}

impl Default for UnsharpMaskParams {
    fn default() -> Self {
        Self {
            sigma: 1.0,
            strength: 1.5,
            threshold: 0,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CustomParams {
    /// Convolution kernel rows; `None` selects the built-in sharpen kernel
    pub kernel: Option<Vec<Vec<f32>>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdaptiveParams {
    pub strength: f32,
}

impl Default for AdaptiveParams {
    fn default() -> Self {
        Self { strength: 1.0 }
    }
}

/// Output naming and encoding.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub format: OutputFormat,
    /// 0-100; meaning depends on the format (see the encoders module)
    pub quality: u8,
    pub prefix: String,
    pub keep_original_name: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::Png,
            quality: 95,
            prefix: "processed_".to_string(),
            keep_original_name: true,
        }
    }
}

impl OutputSettings {
    fn sanitize(&mut self) {
        if self.quality > 100 {
            self.quality = 100;
        }
    }
}

/// Optional downscale before filtering.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResizeSettings {
    pub enabled: bool,
    pub max_width: u32,
    pub max_height: u32,
    pub preserve_aspect_ratio: bool,
}

impl Default for ResizeSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            max_width: 1920,
            max_height: 1080,
            preserve_aspect_ratio: true,
        }
    }
}

impl ResizeSettings {
    fn sanitize(&mut self) {
        self.max_width = self.max_width.max(1);
        self.max_height = self.max_height.max(1);
    }
}

/// Round an even or zero kernel size up to the nearest usable odd value.
fn force_odd(size: u32, fallback: u32) -> u32 {
    if size == 0 {
        fallback
    } else if size % 2 == 0 {
        size + 1
    } else {
        size
    }
}

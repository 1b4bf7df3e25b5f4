//! Filter mode and output format enums.

use serde::{Deserialize, Serialize};

/// Denoise algorithm selection.
///
/// A closed set: unsupported mode names fail at config parse time (YAML)
/// or at CLI argument parse time, never inside the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DenoiseMode {
    /// Gaussian blur with configurable kernel size and sigma
    Gaussian,

    /// Arithmetic mean (box) blur
    Mean,

    /// Median blur, effective against salt-and-pepper noise
    Median,

    /// Edge-preserving bilateral filter
    #[default]
    Bilateral,

    /// Non-local means, slowest but strongest; dispatches to a colored or
    /// grayscale variant depending on channel count
    #[serde(rename = "nlmeans")]
    NlMeans,
}

impl DenoiseMode {
    /// Lowercase name as it appears in config files and CLI arguments.
    pub fn label(self) -> &'static str {
        match self {
            DenoiseMode::Gaussian => "gaussian",
            DenoiseMode::Mean => "mean",
            DenoiseMode::Median => "median",
            DenoiseMode::Bilateral => "bilateral",
            DenoiseMode::NlMeans => "nlmeans",
        }
    }
}

/// Sharpen algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SharpenMode {
    /// Subtract a scaled Laplacian edge response
    Laplacian,

    /// Unsharp masking with an optional low-contrast threshold
    #[default]
    UnsharpMask,

    /// Convolution with a caller-supplied kernel
    Custom,

    /// Edge-masked unsharp sharpening: strong on edges, near-original in
    /// flat regions
    Adaptive,
}

impl SharpenMode {
    pub fn label(self) -> &'static str {
        match self {
            SharpenMode::Laplacian => "laplacian",
            SharpenMode::UnsharpMask => "unsharp_mask",
            SharpenMode::Custom => "custom",
            SharpenMode::Adaptive => "adaptive",
        }
    }
}

/// Output encoding format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,

    #[serde(rename = "jpg", alias = "jpeg")]
    Jpeg,

    WebP,

    Bmp,

    #[serde(alias = "tif")]
    Tiff,
}

impl OutputFormat {
    /// File extension used by the output namer.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::WebP => "webp",
            OutputFormat::Bmp => "bmp",
            OutputFormat::Tiff => "tif",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denoise_mode_default() {
        assert_eq!(DenoiseMode::default(), DenoiseMode::Bilateral);
    }

    #[test]
    fn test_sharpen_mode_default() {
        assert_eq!(SharpenMode::default(), SharpenMode::UnsharpMask);
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Png);
    }

    #[test]
    fn test_mode_names_roundtrip_through_yaml() {
        let mode: DenoiseMode = serde_yaml::from_str("nlmeans").unwrap();
        assert_eq!(mode, DenoiseMode::NlMeans);

        let mode: SharpenMode = serde_yaml::from_str("unsharp_mask").unwrap();
        assert_eq!(mode, SharpenMode::UnsharpMask);

        let format: OutputFormat = serde_yaml::from_str("jpeg").unwrap();
        assert_eq!(format, OutputFormat::Jpeg);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        assert!(serde_yaml::from_str::<DenoiseMode>("wavelet").is_err());
        assert!(serde_yaml::from_str::<SharpenMode>("deconvolve").is_err());
    }
}

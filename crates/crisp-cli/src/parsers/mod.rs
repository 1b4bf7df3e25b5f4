//! Parsers for mode names arriving via CLI arguments.
//!
//! Unknown names are configuration errors, reported before any file is
//! touched. Config files don't pass through here; their mode names are
//! validated by the YAML deserializer.

use crisp_core::models::{DenoiseMode, OutputFormat, SharpenMode};

pub fn parse_denoise_mode(s: &str) -> Result<DenoiseMode, String> {
    match s.to_lowercase().as_str() {
        "gaussian" => Ok(DenoiseMode::Gaussian),
        "mean" => Ok(DenoiseMode::Mean),
        "median" => Ok(DenoiseMode::Median),
        "bilateral" => Ok(DenoiseMode::Bilateral),
        "nlmeans" | "nl_means" => Ok(DenoiseMode::NlMeans),
        other => Err(format!("Unsupported denoise mode: {}", other)),
    }
}

pub fn parse_sharpen_mode(s: &str) -> Result<SharpenMode, String> {
    match s.to_lowercase().as_str() {
        "laplacian" => Ok(SharpenMode::Laplacian),
        "unsharp_mask" | "unsharp" => Ok(SharpenMode::UnsharpMask),
        "custom" => Ok(SharpenMode::Custom),
        "adaptive" => Ok(SharpenMode::Adaptive),
        other => Err(format!("Unsupported sharpen mode: {}", other)),
    }
}

pub fn parse_output_format(s: &str) -> Result<OutputFormat, String> {
    match s.to_lowercase().as_str() {
        "png" => Ok(OutputFormat::Png),
        "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
        "webp" => Ok(OutputFormat::WebP),
        "bmp" => Ok(OutputFormat::Bmp),
        "tiff" | "tif" => Ok(OutputFormat::Tiff),
        other => Err(format!("Unsupported output format: {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_denoise_mode() {
        assert_eq!(parse_denoise_mode("bilateral").unwrap(), DenoiseMode::Bilateral);
        assert_eq!(parse_denoise_mode("NLMEANS").unwrap(), DenoiseMode::NlMeans);
        assert!(parse_denoise_mode("wavelet").is_err());
    }

    #[test]
    fn test_parse_sharpen_mode() {
        assert_eq!(parse_sharpen_mode("unsharp_mask").unwrap(), SharpenMode::UnsharpMask);
        assert_eq!(parse_sharpen_mode("adaptive").unwrap(), SharpenMode::Adaptive);
        assert!(parse_sharpen_mode("emboss").is_err());
    }

    #[test]
    fn test_parse_output_format() {
        assert_eq!(parse_output_format("jpeg").unwrap(), OutputFormat::Jpeg);
        assert_eq!(parse_output_format("PNG").unwrap(), OutputFormat::Png);
        assert!(parse_output_format("gif").is_err());
    }

    #[test]
    fn test_unknown_mode_message_names_the_mode() {
        let err = parse_denoise_mode("fancy").unwrap_err();
        assert!(err.contains("fancy"));
    }
}

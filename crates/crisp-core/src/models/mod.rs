//! Configuration model types.

mod enums;
mod settings;

pub use enums::{DenoiseMode, OutputFormat, SharpenMode};
pub use settings::{
    AdaptiveParams, BilateralParams, CustomParams, DenoiseSettings, GaussianParams,
    LaplacianParams, MeanParams, MedianParams, NlMeansParams, OutputSettings, PathSettings,
    ProcessingConfig, ResizeSettings, SharpenSettings, UnsharpMaskParams,
};

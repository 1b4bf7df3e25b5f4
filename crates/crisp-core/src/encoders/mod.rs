//! Image encoding with per-format quality handling.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, PngEncoder};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat};

use crate::decoders::ImageBuf;
use crate::error::ProcessError;
use crate::models::{OutputFormat, OutputSettings};

/// Map the 0-100 quality setting onto a PNG compression level 0-9.
///
/// `(100 - quality) / 10` with integer division (floor, not round),
/// clamped to the 0-9 range. High quality means low compression effort:
/// 95 maps to level 0, 45 to level 5, 0 to level 9.
pub fn png_compression_level(quality: u8) -> u8 {
    ((100u32.saturating_sub(quality as u32)) / 10).min(9) as u8
}

/// Bucket a 0-9 compression level onto the png encoder's named presets.
fn png_compression_type(level: u8) -> CompressionType {
    match level {
        0..=2 => CompressionType::Fast,
        3..=6 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}

fn color_type(image: &ImageBuf) -> ExtendedColorType {
    match image {
        ImageBuf::Gray(_) => ExtendedColorType::L8,
        ImageBuf::Rgb(_) => ExtendedColorType::Rgb8,
    }
}

/// Encode and write one image.
///
/// jpg and webp take the quality value directly; png maps it through
/// [`png_compression_level`]; other formats are written without
/// format-specific parameters. Any failure here is fatal for the image;
/// a result counts as success only once the bytes are on disk.
pub fn write_image(
    image: &ImageBuf,
    path: &Path,
    settings: &OutputSettings,
) -> Result<(), ProcessError> {
    match settings.format {
        OutputFormat::Jpeg => {
            let writer = create_writer(path)?;
            let mut encoder = JpegEncoder::new_with_quality(writer, settings.quality);
            let result = match image {
                ImageBuf::Gray(img) => encoder.encode_image(img),
                ImageBuf::Rgb(img) => encoder.encode_image(img),
            };
            result.map_err(|source| ProcessError::Encode {
                path: path.to_path_buf(),
                source,
            })
        }
        OutputFormat::Png => {
            let writer = create_writer(path)?;
            let compression = png_compression_type(png_compression_level(settings.quality));
            let encoder = PngEncoder::new_with_quality(
                writer,
                compression,
                image::codecs::png::FilterType::Adaptive,
            );
            let (width, height) = image.dimensions();
            encoder
                .write_image(image.raw(), width, height, color_type(image))
                .map_err(|source| ProcessError::Encode {
                    path: path.to_path_buf(),
                    source,
                })
        }
        OutputFormat::WebP => {
            let (width, height) = image.dimensions();
            let rgba = match image {
                ImageBuf::Gray(img) => DynamicImage::ImageLuma8(img.clone()).to_rgba8(),
                ImageBuf::Rgb(img) => DynamicImage::ImageRgb8(img.clone()).to_rgba8(),
            };
            let encoder = webp::Encoder::from_rgba(&rgba, width, height);
            let data = encoder.encode(settings.quality as f32);
            std::fs::write(path, &*data).map_err(|source| ProcessError::Write {
                path: path.to_path_buf(),
                source,
            })
        }
        OutputFormat::Bmp | OutputFormat::Tiff => {
            let format = match settings.format {
                OutputFormat::Bmp => ImageFormat::Bmp,
                _ => ImageFormat::Tiff,
            };
            let result = match image {
                ImageBuf::Gray(img) => img.save_with_format(path, format),
                ImageBuf::Rgb(img) => img.save_with_format(path, format),
            };
            result.map_err(|source| ProcessError::Encode {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}

fn create_writer(path: &Path) -> Result<BufWriter<File>, ProcessError> {
    let file = File::create(path).map_err(|source| ProcessError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufWriter::new(file))
}

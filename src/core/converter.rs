//! Image conversion module.
//!
//! Decodes a source image, optionally resizes it and re-encodes it to the
//! target format. Output is written to a temporary sibling first and moved
//! into place only once encoding succeeded.

use crate::error::{ConversionError, ConversionErrorKind};
use crate::models::conversion::{ConversionSettings, TargetFormat};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::imageops::FilterType;
use image::error::{EncodingError, ImageFormatHint};
use image::{DynamicImage, ImageError, ImageFormat, ImageReader, ImageResult, Rgb, RgbImage};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Converts images with a fixed set of settings.
#[derive(Debug, Clone)]
pub struct ImageConverter {
    settings: ConversionSettings,
}

impl ImageConverter {
    /// Create a converter for the given settings.
    pub fn new(settings: ConversionSettings) -> Self {
        Self { settings }
    }

    /// Settings in use.
    pub fn settings(&self) -> &ConversionSettings {
        &self.settings
    }

    /// Convert `src` into `dest`.
    pub fn convert(&self, src: &Path, dest: &Path) -> Result<(), ConversionError> {
        let image = decode(src)?;
        let image = resize(image, &self.settings);
        write_atomic(&image, dest, &self.settings)?;
        tracing::debug!("Converted {:?} -> {:?} ({})", src, dest, self.settings.format);
        Ok(())
    }
}

/// Convert a single image (convenience function).
pub fn convert(src: &Path, dest: &Path, settings: &ConversionSettings) -> Result<(), ConversionError> {
    ImageConverter::new(settings.clone()).convert(src, dest)
}

fn decode(src: &Path) -> Result<DynamicImage, ConversionError> {
    let reader = ImageReader::open(src)
        .map_err(|e| ConversionError::new(ConversionErrorKind::DecodeFailure, src, e))?
        .with_guessed_format()
        .map_err(|e| ConversionError::new(ConversionErrorKind::DecodeFailure, src, e))?;

    reader.decode().map_err(|e| {
        let kind = match e {
            ImageError::Unsupported(_) => ConversionErrorKind::UnsupportedFormat,
            _ => ConversionErrorKind::DecodeFailure,
        };
        ConversionError::new(kind, src, e)
    })
}

/// Apply the resize settings.
///
/// With `keep_aspect` the image is shrunk to fit inside width x height and never enlarged.
/// Otherwise it is stretched to exactly width x height.
pub fn resize(image: DynamicImage, settings: &ConversionSettings) -> DynamicImage {
    if !settings.resize {
        return image;
    }
    if settings.width == 0 || settings.height == 0 {
        tracing::warn!(
            "Ignoring resize to {}x{}: dimensions must be positive",
            settings.width,
            settings.height
        );
        return image;
    }

    if settings.keep_aspect {
        if image.width() <= settings.width && image.height() <= settings.height {
            return image;
        }
        image.resize(settings.width, settings.height, FilterType::Lanczos3)
    } else {
        image.resize_exact(settings.width, settings.height, FilterType::Lanczos3)
    }
}

/// Composite the image over an opaque white background.
pub fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut out = RgbImage::new(width, height);
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = u32::from(a);
        let blend = |c: u8| ((u32::from(c) * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        out.put_pixel(x, y, Rgb([blend(r), blend(g), blend(b)]));
    }
    out
}

/// Map a 0-9 compression level onto the PNG encoder presets.
fn png_compression(level: u8) -> CompressionType {
    match level {
        0..=3 => CompressionType::Fast,
        4..=6 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}

/// Normalize the pixel layout for the target format.
///
/// Formats without alpha get the image composited over white.
fn prepare(image: &DynamicImage, format: TargetFormat) -> DynamicImage {
    if !format.supports_alpha() {
        DynamicImage::ImageRgb8(flatten_onto_white(image))
    } else if image.color().has_alpha() {
        DynamicImage::ImageRgba8(image.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(image.to_rgb8())
    }
}

fn encode<W: Write + std::io::Seek>(
    image: &DynamicImage,
    writer: &mut W,
    settings: &ConversionSettings,
) -> ImageResult<()> {
    let image = prepare(image, settings.format);
    match settings.format {
        TargetFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut *writer, settings.effective_quality());
            image.write_with_encoder(encoder)
        }
        TargetFormat::Png => {
            let encoder = PngEncoder::new_with_quality(
                &mut *writer,
                png_compression(settings.png_compression),
                PngFilterType::Adaptive,
            );
            image.write_with_encoder(encoder)
        }
        TargetFormat::Gif => DynamicImage::ImageRgba8(image.to_rgba8()).write_to(writer, ImageFormat::Gif),
        TargetFormat::Bmp => image.write_to(writer, ImageFormat::Bmp),
        TargetFormat::Webp => {
            let (width, height) = (image.width(), image.height());
            let encoder = match &image {
                DynamicImage::ImageRgba8(rgba) => webp::Encoder::from_rgba(rgba.as_raw(), width, height),
                _ => webp::Encoder::from_rgb(image.as_bytes(), width, height),
            };
            let encoded = encoder
                .encode_simple(false, f32::from(settings.effective_quality()))
                .map_err(|e| {
                    ImageError::Encoding(EncodingError::new(
                        ImageFormatHint::Exact(ImageFormat::WebP),
                        format!("{:?}", e),
                    ))
                })?;
            writer.write_all(&encoded)?;
            Ok(())
        }
    }
}

fn write_atomic(
    image: &DynamicImage,
    dest: &Path,
    settings: &ConversionSettings,
) -> Result<(), ConversionError> {
    let temp = temp_path_for(dest);

    let result = (|| -> ImageResult<()> {
        let mut writer = BufWriter::new(File::create(&temp)?);
        encode(image, &mut writer, settings)?;
        writer.flush()?;
        Ok(())
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&temp);
        let kind = match e {
            ImageError::Unsupported(_) => ConversionErrorKind::UnsupportedFormat,
            _ => ConversionErrorKind::EncodeFailure,
        };
        return Err(ConversionError::new(kind, dest, e));
    }

    fs::rename(&temp, dest).map_err(|e| {
        let _ = fs::remove_file(&temp);
        ConversionError::new(ConversionErrorKind::EncodeFailure, dest, e)
    })
}

fn temp_path_for(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    dest.with_file_name(format!(".{}.{}.tmp", name, Uuid::new_v4().simple()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_flatten_blends_alpha() {
        let mut rgba = RgbaImage::new(3, 1);
        rgba.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        rgba.put_pixel(1, 0, Rgba([255, 0, 0, 0]));
        rgba.put_pixel(2, 0, Rgba([0, 0, 0, 128]));

        let flat = flatten_onto_white(&DynamicImage::ImageRgba8(rgba));
        assert_eq!(flat.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(flat.get_pixel(1, 0).0, [255, 255, 255]);
        assert_eq!(flat.get_pixel(2, 0).0, [127, 127, 127]);
    }

    #[test]
    fn test_resize_fits_inside_bounds() {
        let settings = ConversionSettings {
            resize: true,
            width: 100,
            height: 100,
            ..Default::default()
        };
        let resized = resize(DynamicImage::new_rgb8(400, 200), &settings);
        assert_eq!((resized.width(), resized.height()), (100, 50));
    }

    #[test]
    fn test_resize_never_enlarges() {
        let settings = ConversionSettings {
            resize: true,
            width: 100,
            height: 100,
            ..Default::default()
        };
        let resized = resize(DynamicImage::new_rgb8(40, 20), &settings);
        assert_eq!((resized.width(), resized.height()), (40, 20));
    }

    #[test]
    fn test_resize_stretch() {
        let settings = ConversionSettings {
            resize: true,
            width: 30,
            height: 90,
            keep_aspect: false,
            ..Default::default()
        };
        let resized = resize(DynamicImage::new_rgb8(400, 200), &settings);
        assert_eq!((resized.width(), resized.height()), (30, 90));
    }

    #[test]
    fn test_resize_zero_dimensions_ignored() {
        let settings = ConversionSettings {
            resize: true,
            width: 0,
            height: 50,
            ..Default::default()
        };
        let resized = resize(DynamicImage::new_rgb8(400, 200), &settings);
        assert_eq!((resized.width(), resized.height()), (400, 200));
    }

    #[test]
    fn test_prepare_matches_alpha_support() {
        let rgba = DynamicImage::ImageRgba8(RgbaImage::new(2, 2));
        for format in TargetFormat::ALL {
            let prepared = prepare(&rgba, format);
            assert_eq!(prepared.color().has_alpha(), format.supports_alpha(), "{}", format);
        }
        let rgb = DynamicImage::new_rgb8(2, 2);
        assert!(!prepare(&rgb, TargetFormat::Webp).color().has_alpha());
    }

    #[test]
    fn test_png_compression_levels() {
        assert!(matches!(png_compression(0), CompressionType::Fast));
        assert!(matches!(png_compression(6), CompressionType::Default));
        assert!(matches!(png_compression(9), CompressionType::Best));
    }
}

//! Image conversion settings.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default JPEG/WebP quality.
pub const DEFAULT_QUALITY: u8 = 85;

/// Default PNG compression level (0-9).
pub const DEFAULT_PNG_COMPRESSION: u8 = 6;

/// Extensions treated as convertible images.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "tif", "tiff", "webp"];

/// Output format for image conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    Jpeg,
    Png,
    Gif,
    Bmp,
    Webp,
}

impl TargetFormat {
    /// All supported targets.
    pub const ALL: [TargetFormat; 5] = [
        TargetFormat::Jpeg,
        TargetFormat::Png,
        TargetFormat::Gif,
        TargetFormat::Bmp,
        TargetFormat::Webp,
    ];

    /// Extension written for this format, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            TargetFormat::Jpeg => "jpg",
            TargetFormat::Png => "png",
            TargetFormat::Gif => "gif",
            TargetFormat::Bmp => "bmp",
            TargetFormat::Webp => "webp",
        }
    }

    /// Whether the encoded file can carry an alpha channel.
    pub fn supports_alpha(self) -> bool {
        matches!(
            self,
            TargetFormat::Png | TargetFormat::Gif | TargetFormat::Webp
        )
    }
}

impl std::fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetFormat::Jpeg => write!(f, "JPEG"),
            TargetFormat::Png => write!(f, "PNG"),
            TargetFormat::Gif => write!(f, "GIF"),
            TargetFormat::Bmp => write!(f, "BMP"),
            TargetFormat::Webp => write!(f, "WEBP"),
        }
    }
}

impl std::str::FromStr for TargetFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(TargetFormat::Jpeg),
            "png" => Ok(TargetFormat::Png),
            "gif" => Ok(TargetFormat::Gif),
            "bmp" => Ok(TargetFormat::Bmp),
            "webp" => Ok(TargetFormat::Webp),
            other => {
                let known: Vec<&str> = TargetFormat::ALL.iter().map(|f| f.extension()).collect();
                Err(format!(
                    "unsupported format '{}' (expected one of: {})",
                    other,
                    known.join(", ")
                ))
            }
        }
    }
}

/// Settings applied to every convertible file in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionSettings {
    /// Output format.
    pub format: TargetFormat,
    /// Quality 1-100, used by lossy encoders only.
    pub quality: u8,
    /// PNG compression level 0-9.
    pub png_compression: u8,
    /// Whether to resize.
    pub resize: bool,
    /// Target width (or bounding width).
    pub width: u32,
    /// Target height (or bounding height).
    pub height: u32,
    /// Fit inside width x height instead of stretching.
    pub keep_aspect: bool,
    /// Keep the source file after a successful conversion.
    pub keep_original: bool,
}

impl ConversionSettings {
    /// Settings for `format` with all other values at their defaults.
    pub fn new(format: TargetFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    /// Quality clamped to the encoder's accepted range.
    pub fn effective_quality(&self) -> u8 {
        self.quality.clamp(1, 100)
    }
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            format: TargetFormat::Jpeg,
            quality: DEFAULT_QUALITY,
            png_compression: DEFAULT_PNG_COMPRESSION,
            resize: false,
            width: 0,
            height: 0,
            keep_aspect: true,
            keep_original: false,
        }
    }
}

/// Check if a file is a convertible image based on extension.
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_from_str() {
        assert_eq!("JPEG".parse::<TargetFormat>(), Ok(TargetFormat::Jpeg));
        assert_eq!("jpg".parse::<TargetFormat>(), Ok(TargetFormat::Jpeg));
        assert_eq!("WebP".parse::<TargetFormat>(), Ok(TargetFormat::Webp));
        assert!("tiff".parse::<TargetFormat>().is_err());
    }

    #[test]
    fn test_alpha_support() {
        assert!(!TargetFormat::Jpeg.supports_alpha());
        assert!(!TargetFormat::Bmp.supports_alpha());
        assert!(TargetFormat::Png.supports_alpha());
    }

    #[test]
    fn test_defaults() {
        let settings = ConversionSettings::default();
        assert_eq!(settings.quality, 85);
        assert!(settings.keep_aspect);
        assert!(!settings.keep_original);
    }

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(&PathBuf::from("photo.PNG")));
        assert!(is_image_file(&PathBuf::from("scan.tiff")));
        assert!(!is_image_file(&PathBuf::from("notes.txt")));
        assert!(!is_image_file(&PathBuf::from("README")));
    }
}

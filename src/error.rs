//! Error types for configuration, font ingestion and rendering.

use std::path::PathBuf;

use thiserror::Error;

/// A setter rejected its argument. The configuration is left as it was.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("empty character list")]
    EmptyCharacterList,

    #[error("captcha length must be greater than zero")]
    InvalidTextLength,

    #[error("font DPI must be between 25.0 and 300.0, got {dpi}")]
    FontDpiOutOfRange { dpi: f64 },

    #[error("font scale must be between 0.1 and 5.0, got {scale}")]
    FontScaleOutOfRange { scale: f64 },

    #[error("captcha width and height must be greater than 1px, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("captcha of {width}x{height} pixels is too large")]
    ImageTooLarge { width: u32, height: u32 },

    #[error("at least one font is required")]
    NoFonts,

    #[error(transparent)]
    Font(#[from] FontError),
}

/// Font ingestion failed. Ingestion is all-or-nothing, so no font from the batch is kept.
#[derive(Error, Debug)]
pub enum FontError {
    #[error("font #{index} is not a valid font: {source}")]
    Parse {
        index: usize,
        #[source]
        source: ttf_parser::FaceParsingError,
    },

    #[error("failed to read font file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Glyph rasterization failed. Pixels drawn before the failure stay on the canvas.
#[derive(Error, Debug, PartialEq)]
pub enum RenderError {
    #[error("invalid font size {size}")]
    InvalidFontSize { size: f64 },

    #[error("invalid font DPI {dpi}")]
    InvalidDpi { dpi: f64 },
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("invalid color {0:?}: expected #rrggbb or #rrggbbaa")]
pub struct ColorParseError(pub String);

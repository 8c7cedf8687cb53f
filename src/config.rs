use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::ConfigError;
use crate::font::{self, Font};
use crate::rand::RandomSource;

/// Default list of characters for captcha text: Latin letters in both cases plus digits.
pub const DEFAULT_CHARACTERS: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

pub const DEFAULT_NOISE_DENSITY: f64 = 0.05;

/// Spacing count for a disabled noise layer.
pub const NOISE_DISABLED: u32 = i32::MAX as u32;

/// Largest pixel count a canvas can address.
const MAX_PIXELS: u64 = i32::MAX as u64;

const MIN_FONT_DPI: f64 = 25.0;
const MAX_FONT_DPI: f64 = 300.0;
const MIN_FONT_SCALE: f64 = 0.1;
const MAX_FONT_SCALE: f64 = 5.0;

/// Decorative glyphs cover far more area than single pixels, so text noise spacing is scaled
/// up by this factor relative to dot and rectangle noise.
const TEXT_NOISE_FACTOR: f64 = 30.0;

/// Noise densities as given, together with the spacing counts derived from them.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Noise {
    pub dot_density: f64,
    pub rect_density: f64,
    pub text_density: f64,
    pub dot_spacing: u32,
    pub rect_spacing: u32,
    pub text_spacing: u32,
}

impl Noise {
    pub fn new(dot: f64, rect: f64, text: f64) -> Self {
        Noise {
            dot_density: dot,
            rect_density: rect,
            text_density: text,
            dot_spacing: spacing(dot, 1.0),
            rect_spacing: spacing(rect, 1.0),
            text_spacing: spacing(text, TEXT_NOISE_FACTOR),
        }
    }
}

fn spacing(density: f64, factor: f64) -> u32 {
    if density.is_nan() || density <= 0.0 {
        return NOISE_DISABLED;
    }
    (factor / density).round().min(f64::from(NOISE_DISABLED)) as u32
}

/// Captcha generation parameters.
///
/// Every setter validates its argument first and only then commits it, so a failed call leaves
/// the configuration untouched. Clones share the font list and the random source.
#[derive(Debug, Clone)]
pub struct Config {
    background: Color,
    border: Color,
    characters: Vec<char>,
    width: u32,
    height: u32,
    length: usize,
    noise: Noise,
    font_dpi: f64,
    font_scale: f64,
    fonts: Arc<[Font]>,
    rng: Arc<RandomSource>,
}

impl Config {
    /// Creates a configuration with the default values: a 430x100 white canvas with a black
    /// border, 8 alphanumeric characters, font scale 0.6 at 72 DPI, the bundled fonts, and
    /// noise densities of 0.05.
    pub fn new() -> Result<Self, ConfigError> {
        let fonts = font::bundled()?;
        log::debug!("loaded {} bundled fonts", fonts.len());
        Ok(Config {
            background: Color::WHITE,
            border: Color::BLACK,
            characters: DEFAULT_CHARACTERS.chars().collect(),
            width: 430,
            height: 100,
            length: 8,
            noise: Noise::new(
                DEFAULT_NOISE_DENSITY,
                DEFAULT_NOISE_DENSITY,
                DEFAULT_NOISE_DENSITY,
            ),
            font_dpi: 72.0,
            font_scale: 0.6,
            fonts: fonts.into(),
            rng: Arc::new(RandomSource::from_entropy()),
        })
    }

    pub fn background_color(&self) -> Color {
        self.background
    }

    pub fn border_color(&self) -> Color {
        self.border
    }

    pub fn characters(&self) -> &[char] {
        &self.characters
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn text_length(&self) -> usize {
        self.length
    }

    pub fn noise(&self) -> &Noise {
        &self.noise
    }

    pub fn font_dpi(&self) -> f64 {
        self.font_dpi
    }

    pub fn font_scale(&self) -> f64 {
        self.font_scale
    }

    pub fn fonts(&self) -> &[Font] {
        &self.fonts
    }

    pub fn rng(&self) -> &RandomSource {
        &self.rng
    }

    /// Sets the background color. Any alpha is dropped: the image is always opaque.
    pub fn set_background_color(&mut self, color: Color) {
        self.background = color.opaque();
    }

    /// Sets the border color. Any alpha is dropped.
    pub fn set_border_color(&mut self, color: Color) {
        self.border = color.opaque();
    }

    pub fn set_character_list(&mut self, chars: &str) -> Result<(), ConfigError> {
        if chars.is_empty() {
            return Err(ConfigError::EmptyCharacterList);
        }
        self.characters = chars.chars().collect();
        Ok(())
    }

    pub fn set_text_length(&mut self, length: usize) -> Result<(), ConfigError> {
        if length == 0 {
            return Err(ConfigError::InvalidTextLength);
        }
        self.length = length;
        Ok(())
    }

    pub fn set_font_dpi(&mut self, dpi: f64) -> Result<(), ConfigError> {
        if !(MIN_FONT_DPI..=MAX_FONT_DPI).contains(&dpi) {
            return Err(ConfigError::FontDpiOutOfRange { dpi });
        }
        self.font_dpi = dpi;
        Ok(())
    }

    pub fn set_font_scale(&mut self, scale: f64) -> Result<(), ConfigError> {
        if !(MIN_FONT_SCALE..=MAX_FONT_SCALE).contains(&scale) {
            return Err(ConfigError::FontScaleOutOfRange { scale });
        }
        self.font_scale = scale;
        Ok(())
    }

    pub fn set_dimensions(&mut self, width: u32, height: u32) -> Result<(), ConfigError> {
        if width <= 1 || height <= 1 {
            return Err(ConfigError::InvalidDimensions { width, height });
        }
        if u64::from(width) * u64::from(height) > MAX_PIXELS {
            return Err(ConfigError::ImageTooLarge { width, height });
        }
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Sets the density of dot, rectangle and text noise. A density of zero or less disables
    /// that layer.
    pub fn set_noise_density(&mut self, dot: f64, rect: f64, text: f64) {
        self.noise = Noise::new(dot, rect, text);
    }

    /// Replaces the font list with already-parsed fonts.
    pub fn set_fonts(&mut self, fonts: Vec<Font>) -> Result<(), ConfigError> {
        if fonts.is_empty() {
            return Err(ConfigError::NoFonts);
        }
        log::debug!("using {} fonts", fonts.len());
        self.fonts = fonts.into();
        Ok(())
    }

    /// Replaces the font list with fonts parsed from raw payloads. If any payload fails to
    /// parse, the current fonts are kept.
    pub fn set_fonts_from_data<I>(&mut self, payloads: I) -> Result<(), ConfigError>
    where
        I: IntoIterator,
        I::Item: Into<Vec<u8>>,
    {
        let fonts = font::parse_all(payloads)?;
        self.set_fonts(fonts)
    }

    /// Replaces the font list with fonts read from files. If any file cannot be read or parsed,
    /// the current fonts are kept.
    pub fn set_fonts_from_paths<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<(), ConfigError> {
        let fonts = font::load_all(paths)?;
        self.set_fonts(fonts)
    }

    pub fn set_random_source(&mut self, rng: Arc<RandomSource>) {
        self.rng = rng;
    }

    /// Convenience for deterministic output: replaces the random source with a seeded one.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.set_random_source(Arc::new(RandomSource::from_seed(seed)));
        self
    }

    /// Applies every field present in `settings`. The settings are validated as a whole; if
    /// any field is rejected, nothing is applied.
    pub fn apply(&mut self, settings: &Settings) -> Result<(), ConfigError> {
        let mut next = self.clone();
        if let Some(color) = settings.background {
            next.set_background_color(color);
        }
        if let Some(color) = settings.border {
            next.set_border_color(color);
        }
        if let Some(chars) = &settings.characters {
            next.set_character_list(chars)?;
        }
        if let Some(length) = settings.length {
            next.set_text_length(length)?;
        }
        if let Some(dpi) = settings.font_dpi {
            next.set_font_dpi(dpi)?;
        }
        if let Some(scale) = settings.font_scale {
            next.set_font_scale(scale)?;
        }
        if settings.width.is_some() || settings.height.is_some() {
            next.set_dimensions(
                settings.width.unwrap_or(self.width),
                settings.height.unwrap_or(self.height),
            )?;
        }
        if settings.dot_noise.is_some()
            || settings.rect_noise.is_some()
            || settings.text_noise.is_some()
        {
            next.set_noise_density(
                settings.dot_noise.unwrap_or(self.noise.dot_density),
                settings.rect_noise.unwrap_or(self.noise.rect_density),
                settings.text_noise.unwrap_or(self.noise.text_density),
            );
        }
        *self = next;
        Ok(())
    }
}

/// An optional overlay of generation parameters, readable from JSON or the command line.
#[derive(Debug, Default, Clone, PartialEq, clap::Args, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Image width in pixels.
    #[clap(long)]
    pub width: Option<u32>,

    /// Image height in pixels.
    #[clap(long)]
    pub height: Option<u32>,

    /// Number of characters in the captcha text.
    #[clap(long)]
    pub length: Option<usize>,

    /// Characters to pick the captcha text (and decorative glyphs) from.
    #[clap(long)]
    pub characters: Option<String>,

    /// Background color, as `#rrggbb`.
    #[clap(long)]
    pub background: Option<Color>,

    /// Border color, as `#rrggbb`.
    #[clap(long)]
    pub border: Option<Color>,

    /// Font DPI, between 25 and 300.
    #[clap(long)]
    pub font_dpi: Option<f64>,

    /// Font size relative to the image height, between 0.1 and 5.
    #[clap(long)]
    pub font_scale: Option<f64>,

    /// Density of single-pixel noise; zero disables it.
    #[clap(long)]
    pub dot_noise: Option<f64>,

    /// Density of small rectangle noise; zero disables it.
    #[clap(long)]
    pub rect_noise: Option<f64>,

    /// Density of decorative character noise; zero disables it.
    #[clap(long)]
    pub text_noise: Option<f64>,
}

impl Settings {
    /// Fields set in `other` take precedence over fields set in `self`.
    pub fn merge(self, other: Settings) -> Settings {
        Settings {
            width: other.width.or(self.width),
            height: other.height.or(self.height),
            length: other.length.or(self.length),
            characters: other.characters.or(self.characters),
            background: other.background.or(self.background),
            border: other.border.or(self.border),
            font_dpi: other.font_dpi.or(self.font_dpi),
            font_scale: other.font_scale.or(self.font_scale),
            dot_noise: other.dot_noise.or(self.dot_noise),
            rect_noise: other.rect_noise.or(self.rect_noise),
            text_noise: other.text_noise.or(self.text_noise),
        }
    }
}

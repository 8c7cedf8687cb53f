//! Distorted-text captcha images.
//!
//! ```no_run
//! let config = captcha::Config::new()?;
//! let challenge = captcha::create_image(&config)?;
//! challenge.image.write_png(format!("{}.png", challenge.text))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod canvas;
pub mod captcha;
pub mod color;
pub mod config;
pub mod error;
pub mod finish;
pub mod font;
pub mod glyph;
pub mod math;
pub mod noise;
pub mod rand;
pub mod text;

pub use crate::canvas::Canvas;
pub use crate::captcha::{create_image, Challenge};
pub use crate::color::Color;
pub use crate::config::{Config, Settings, DEFAULT_CHARACTERS};
pub use crate::font::Font;
pub use crate::rand::RandomSource;

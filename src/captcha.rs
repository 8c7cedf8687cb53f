use crate::canvas::Canvas;
use crate::config::Config;
use crate::error::RenderError;
use crate::finish::{draw_border, draw_hollow_line};
use crate::noise::{draw_dot_noise, draw_rect_noise, draw_text_noise};
use crate::rand::RandomSource;
use crate::text::draw_captcha_text;

/// One generated captcha: the expected answer and its rendered image.
#[derive(Debug)]
pub struct Challenge {
    pub text: String,
    pub image: Canvas,
}

/// Generates a new challenge with the parameters in `config`.
///
/// Stages run in a fixed order, each drawing over the previous ones: background fill, dot
/// noise, text noise, the distorted challenge text, rectangle noise, the hollow line and
/// finally the border.
///
/// # Errors
///
/// Fails only if a glyph cannot be rasterized.
pub fn create_image(config: &Config) -> Result<Challenge, RenderError> {
    let rng = config.rng();
    let text = random_text(rng, config.characters(), config.text_length());
    log::debug!(
        "generating {}x{} captcha with {} characters",
        config.width(),
        config.height(),
        config.text_length()
    );

    let mut image = Canvas::new(config.width(), config.height());
    image.fill(config.background_color());

    draw_dot_noise(&mut image, config);
    draw_text_noise(&mut image, config)?;
    draw_captcha_text(&mut image, config, &text)?;
    draw_rect_noise(&mut image, config);
    draw_hollow_line(&mut image, rng, config.background_color());
    draw_border(&mut image, config.border_color());

    Ok(Challenge { text, image })
}

fn random_text(rng: &RandomSource, chars: &[char], length: usize) -> String {
    (0..length).map(|_| chars[rng.next_int(chars.len())]).collect()
}

impl Config {
    /// Shorthand for [`create_image`].
    pub fn create_image(&self) -> Result<Challenge, RenderError> {
        create_image(self)
    }
}

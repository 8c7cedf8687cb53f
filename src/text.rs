//! The challenge text itself.
//!
//! Glyphs are laid out on their own transparent layer, warped there, and only then composited
//! onto the canvas. Warping the isolated layer keeps the noise that was drawn earlier in place.

use crate::canvas::Canvas;
use crate::color::{palette, Color};
use crate::config::Config;
use crate::error::RenderError;
use crate::glyph::draw_text;
use crate::math::{div_or_zero, pi, px};

/// Gap between the canvas edge and the text layer, on every side.
const LAYER_INSET: u32 = 5;

/// Floor for the jittered glyph size, which can otherwise drop to zero or below on very short
/// canvases.
const MIN_FONT_SIZE: f64 = 1.0;

pub const DISTORTION_AMPLITUDE: f64 = 10.0;
pub const DISTORTION_PERIOD: f64 = 200.0;

pub fn draw_captcha_text(
    canvas: &mut Canvas,
    config: &Config,
    text: &str,
) -> Result<(), RenderError> {
    let (Some(layer_w), Some(layer_h)) = (
        canvas.width().checked_sub(2 * LAYER_INSET).filter(|w| *w > 0),
        canvas.height().checked_sub(2 * LAYER_INSET).filter(|h| *h > 0),
    ) else {
        log::debug!(
            "{}x{} canvas has no room for the text layer, skipping text",
            canvas.width(),
            canvas.height()
        );
        return Ok(());
    };

    let mut layer = Canvas::new(layer_w, layer_h);
    lay_out(&mut layer, config, text)?;
    distort(
        &mut layer,
        DISTORTION_AMPLITUDE,
        DISTORTION_PERIOD,
        config.background_color(),
    );
    canvas.composite_over(&layer, LAYER_INSET as i32, LAYER_INSET as i32);
    Ok(())
}

/// Draws each character with a jittered size, font, color and position.
fn lay_out(layer: &mut Canvas, config: &Config, text: &str) -> Result<(), RenderError> {
    let rng = config.rng();
    let fonts = config.fonts();
    let layer_w = i64::from(layer.width());
    let layer_h = i64::from(layer.height());
    let max_font_size = layer_h as f64 * config.font_scale();
    let len = text.chars().count() as i64;
    let slot_offset = div_or_zero(div_or_zero(layer_w, len), max_font_size as i64);
    let x_jitter = (layer_w / 64) as usize;
    let y_jitter = (layer_h / 8) as usize;

    for (i, ch) in text.chars().enumerate() {
        let font_size = (max_font_size - 2.0 * rng.next_float()).max(MIN_FONT_SIZE);
        let font = &fonts[rng.next_int(fonts.len())];
        let color = palette::dark(rng);

        let step = font_size as i64;
        let mut x = step / 4 + i as i64 * step + slot_offset;
        if i > 0 && x_jitter > 0 {
            x -= rng.next_int(x_jitter) as i64;
        }

        let mut y = layer_h / 2 + (max_font_size / 3.0) as i64;
        if y_jitter > 0 {
            y += rng.next_int(y_jitter) as i64;
        }

        let mut buf = [0u8; 4];
        draw_text(
            layer,
            ch.encode_utf8(&mut buf),
            (clamp_i32(x), clamp_i32(y)),
            config.font_dpi(),
            font_size,
            font,
            color,
        )?;
    }

    Ok(())
}

fn clamp_i32(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Warps the layer in place with a sine wave: every pixel that is not `background` is replaced
/// by the pixel at `(x + a*sin(2*pi*y/period), y + a*cos(2*pi*x/period))`.
///
/// Pixels are visited column by column, so later samples may read pixels that were already
/// replaced. Samples falling outside the layer read as transparent.
pub fn distort(layer: &mut Canvas, amplitude: f64, period: f64, background: Color) {
    let background = background.to_premultiplied_argb();
    let dx = pi(2.0) / period;

    for x in 0..layer.width() as i32 {
        for y in 0..layer.height() as i32 {
            if layer.raw_pixel(x, y) == Some(background) {
                continue;
            }

            let xo = amplitude * (f64::from(y) * dx).sin();
            let yo = amplitude * (f64::from(x) * dx).cos();

            let sample = layer
                .raw_pixel(x + px(xo), y + px(yo))
                .unwrap_or(Color::TRANSPARENT.to_premultiplied_argb());
            layer.set_raw_pixel(x, y, sample);
        }
    }
}

//! Noise layers drawn directly onto the canvas: scattered dots, small rectangles and
//! decorative characters.

use crate::canvas::Canvas;
use crate::color::palette;
use crate::config::Config;
use crate::error::RenderError;
use crate::glyph::draw_text;

/// How many noise elements a layer with the given spacing draws on a `width` x `height`
/// canvas.
pub fn noise_count(width: u32, height: u32, spacing: u32) -> usize {
    let area = u64::from(width) * u64::from(height);
    (area / (u64::from(spacing) + 1)) as usize
}

pub fn draw_dot_noise(canvas: &mut Canvas, config: &Config) {
    let rng = config.rng();
    let (w, h) = (canvas.width(), canvas.height());
    let count = noise_count(w, h, config.noise().dot_spacing);
    log::debug!("dot noise: {} dots", count);

    for i in 0..count {
        let mut x = rng.next_int(w as usize) as i32;
        let mut y = rng.next_int(h as usize) as i32;

        // Nudge every other dot so the noise does not look like a regular grid.
        if i % 2 == 0 {
            x += rng.next_int(3) as i32;
            y += rng.next_int(3) as i32;
        }

        canvas.set_pixel(x, y, palette::random(rng));
    }
}

pub fn draw_rect_noise(canvas: &mut Canvas, config: &Config) {
    let rng = config.rng();
    let (w, h) = (canvas.width(), canvas.height());
    let count = noise_count(w, h, config.noise().rect_spacing) / 6;
    log::debug!("rect noise: {} rects", count);

    for _ in 0..count {
        let x = rng.next_int(w as usize) as i32;
        let y = rng.next_int(h as usize) as i32;
        let rect_w = rng.next_int(3) as u32 + 2;
        let rect_h = rng.next_int(3) as u32 + 2;
        canvas.fill_rect(x, y, rect_w, rect_h, palette::middle(rng));
    }
}

pub fn draw_text_noise(canvas: &mut Canvas, config: &Config) -> Result<(), RenderError> {
    let rng = config.rng();
    let fonts = config.fonts();
    let chars = config.characters();
    let (w, h) = (canvas.width(), canvas.height());
    let count = noise_count(w, h, config.noise().text_spacing);
    let max_font_size = f64::from(h) * config.font_scale();
    log::debug!("text noise: {} glyphs", count);

    for _ in 0..count {
        let font_size = max_font_size / 2.0 + rng.next_int(6) as f64 + rng.next_float();
        let font = &fonts[rng.next_int(fonts.len())];
        let color = palette::light(rng);
        let ch = chars[rng.next_int(chars.len())];

        let x = rng.next_int(w as usize) as i32;
        let y = rng.next_int(h as usize) as i32;

        let mut buf = [0u8; 4];
        draw_text(
            canvas,
            ch.encode_utf8(&mut buf),
            (x, y),
            config.font_dpi(),
            font_size,
            font,
            color,
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::color::Color;
    use crate::config::NOISE_DISABLED;

    fn blank(config: &Config) -> Canvas {
        let mut canvas = Canvas::new(config.width(), config.height());
        canvas.fill(Color::WHITE);
        canvas
    }

    fn changed(canvas: &Canvas) -> usize {
        let white = Color::WHITE.to_premultiplied_argb();
        canvas
            .pixels()
            .iter()
            .filter(|px| **px != white)
            .count()
    }

    #[test]
    fn test_noise_count() {
        assert_eq!(noise_count(430, 100, 20), 2047);
        assert_eq!(noise_count(430, 100, 600), 71);
        assert_eq!(noise_count(430, 100, 0), 43000);
        assert_eq!(noise_count(430, 100, NOISE_DISABLED), 0);
    }

    #[test]
    fn test_disabled_layers_draw_nothing() {
        let mut config = Config::new().unwrap().with_seed(5);
        config.set_noise_density(0.0, 0.0, 0.0);
        let mut canvas = blank(&config);
        draw_dot_noise(&mut canvas, &config);
        draw_rect_noise(&mut canvas, &config);
        draw_text_noise(&mut canvas, &config).unwrap();
        assert_eq!(changed(&canvas), 0);
    }

    #[test]
    fn test_dot_noise_draws() {
        let config = Config::new().unwrap().with_seed(5);
        let mut canvas = blank(&config);
        draw_dot_noise(&mut canvas, &config);
        let n = changed(&canvas);
        assert!(n > 1000 && n <= 2047, "{} pixels changed", n);
    }

    #[test]
    fn test_rect_noise_uses_middle_colors() {
        let config = Config::new().unwrap().with_seed(6);
        let mut canvas = blank(&config);
        draw_rect_noise(&mut canvas, &config);
        assert!(changed(&canvas) > 0);
        for y in 0..config.height() as i32 {
            for x in 0..config.width() as i32 {
                let c = canvas.pixel(x, y).unwrap();
                if c != Color::WHITE {
                    assert!([c.r, c.g, c.b].iter().all(|v| (100..255).contains(v)));
                }
            }
        }
    }

    #[test]
    fn test_text_noise_draws() {
        let config = Config::new().unwrap().with_seed(7);
        let mut canvas = blank(&config);
        draw_text_noise(&mut canvas, &config).unwrap();
        assert!(changed(&canvas) > 0);
    }

    #[test]
    fn test_tiny_canvas() {
        let mut config = Config::new().unwrap().with_seed(8);
        config.set_dimensions(2, 2).unwrap();
        config.set_noise_density(10.0, 10.0, 100.0);
        let mut canvas = blank(&config);
        draw_dot_noise(&mut canvas, &config);
        draw_rect_noise(&mut canvas, &config);
        draw_text_noise(&mut canvas, &config).unwrap();
    }
}

//! Final touches: a wavy channel erased through the image, then the border.

use crate::canvas::Canvas;
use crate::color::Color;
use crate::math::{pi, px};
use crate::rand::RandomSource;

/// Erases a sine-shaped band across most of the canvas by painting it in `background`.
///
/// The band starts within the first 5% of the width and ends within the last 10%. Its
/// frequency is random, and about a third of the time the wave is flipped and moved into the
/// lower half.
pub fn draw_hollow_line(canvas: &mut Canvas, rng: &RandomSource, background: Color) {
    let (w, h) = (canvas.width(), canvas.height());
    let begin = (w / 20).max(1) as usize;
    let end = begin * 18;

    let mut x1 = rng.next_int(begin) as f64 + rng.next_float();
    let x2 = (rng.next_int(begin) + end) as f64 + rng.next_float();

    let mut multiple = (rng.next_int(4) as f64 + 1.0 + rng.next_float()) / 5.0;
    if (multiple * 10.0) as i64 % 3 == 0 {
        multiple = -multiple;
    }

    let thickness = (h / 20) as i32;
    let half_h = f64::from(h / 2);
    log::debug!(
        "hollow line: x in [{:.1}, {:.1}), multiplier {:.2}, thickness {}",
        x1,
        x2,
        multiple,
        thickness
    );

    while x1 < x2 {
        let mut y = half_h * (x1 * pi(multiple) / (f64::from(w) + rng.next_float())).sin();
        if multiple < 0.0 {
            y += half_h + rng.next_float();
        }

        for i in 0..=thickness {
            canvas.set_pixel(px(x1), px(y).saturating_add(i), background);
        }
        x1 += 1.0;
    }
}

/// Paints the outermost ring of pixels.
pub fn draw_border(canvas: &mut Canvas, color: Color) {
    let (w, h) = (canvas.width() as i32, canvas.height() as i32);
    for x in 0..w {
        canvas.set_pixel(x, 0, color);
        canvas.set_pixel(x, h - 1, color);
    }
    for y in 0..h {
        canvas.set_pixel(0, y, color);
        canvas.set_pixel(w - 1, y, color);
    }
}

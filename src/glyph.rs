//! Text rasterization.
//!
//! Glyph outlines come from `ttf-parser` and are replayed into a `raqote` path, which the draw
//! target then fills with anti-aliasing. Every text-drawing stage goes through [`draw_text`].

use raqote::{DrawOptions, Path, PathBuilder, Source};
use ttf_parser::{GlyphId, OutlineBuilder};

use crate::canvas::Canvas;
use crate::color::Color;
use crate::error::RenderError;
use crate::font::Font;

/// Points per inch; a font size of `n` points at this DPI is `n` pixels tall.
const POINTS_PER_INCH: f64 = 72.0;

/// Replays a glyph outline in pixel space: scaled, flipped to y-down, and offset so that the
/// glyph origin sits at `origin` on the baseline.
struct PixelOutline {
    path: PathBuilder,
    origin: (f64, f64),
    scale: f64,
}

impl PixelOutline {
    fn new(origin: (f64, f64), scale: f64) -> Self {
        PixelOutline {
            path: PathBuilder::new(),
            origin,
            scale,
        }
    }

    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (
            (self.origin.0 + f64::from(x) * self.scale) as f32,
            (self.origin.1 - f64::from(y) * self.scale) as f32,
        )
    }

    fn finish(self) -> Path {
        self.path.finish()
    }
}

impl OutlineBuilder for PixelOutline {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.path.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.path.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x, y) = self.map(x, y);
        self.path.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x2, y2) = self.map(x2, y2);
        let (x, y) = self.map(x, y);
        self.path.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.path.close();
    }
}

/// Draws `text` with its baseline starting at `(x, y)`, in a solid `color`, clipped to the
/// canvas.
///
/// `font_size` is in points and is converted to pixels with `dpi`. Characters the font does not
/// cover are drawn with its `.notdef` glyph.
///
/// # Errors
///
/// Returns [`RenderError`] if `font_size` or `dpi` is not a positive finite number. Glyphs drawn
/// before an error are not rolled back.
pub fn draw_text(
    canvas: &mut Canvas,
    text: &str,
    (x, y): (i32, i32),
    dpi: f64,
    font_size: f64,
    font: &Font,
    color: Color,
) -> Result<(), RenderError> {
    if !(font_size.is_finite() && font_size > 0.0) {
        return Err(RenderError::InvalidFontSize { size: font_size });
    }
    if !(dpi.is_finite() && dpi > 0.0) {
        return Err(RenderError::InvalidDpi { dpi });
    }

    let face = font.face();
    let pixel_size = font_size * dpi / POINTS_PER_INCH;
    let scale = pixel_size / f64::from(face.units_per_em());
    let source = Source::Solid(color.to_source());
    let options = DrawOptions::new();
    let mut dt = canvas.draw_target();

    let mut pen_x = f64::from(x);
    for ch in text.chars() {
        let glyph = face.glyph_index(ch).unwrap_or_else(|| {
            log::trace!("no glyph for {:?}, using .notdef", ch);
            GlyphId(0)
        });
        let mut outline = PixelOutline::new((pen_x, f64::from(y)), scale);
        // Glyphs without an outline (such as spaces) still advance the pen.
        if face.outline_glyph(glyph, &mut outline).is_some() {
            dt.fill(&outline.finish(), &source, &options);
        }
        log::trace!("drew {:?} at ({:.1}, {}) size {:.1}px", ch, pen_x, y, pixel_size);
        pen_x += f64::from(face.glyph_hor_advance(glyph).unwrap_or(0)) * scale;
    }
    Ok(())
}

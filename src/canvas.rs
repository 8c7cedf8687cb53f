use std::path::Path;

use raqote::{BlendMode, DrawOptions, DrawTarget, Image, Source};

use crate::color::Color;

/// A rectangular RGBA raster that every pipeline stage draws into.
///
/// Pixels are stored premultiplied as `0xAARRGGBB`, the native layout of [`DrawTarget`].
/// Addressing is bounds-checked: reads outside the canvas return `None` and writes outside it
/// are dropped.
///
/// The canvas owns only its pixel buffer, so it can be moved between threads. Drawing
/// operations that need a rasterizer borrow the buffer through a short-lived [`DrawTarget`].
#[derive(Clone, PartialEq, Eq)]
pub struct Canvas {
    data: Vec<u32>,
    width: u32,
    height: u32,
}

impl Canvas {
    /// Creates a fully transparent canvas.
    ///
    /// # Panics
    ///
    /// Panics if `width * height` does not fit in an `i32`, the largest raster the draw target
    /// can address.
    pub fn new(width: u32, height: u32) -> Self {
        let len = u64::from(width) * u64::from(height);
        assert!(
            len <= i32::MAX as u64,
            "canvas of {}x{} pixels is too large",
            width,
            height
        );
        Canvas {
            data: vec![0; len as usize],
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let (x, y) = (u32::try_from(x).ok()?, u32::try_from(y).ok()?);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.raw_pixel(x, y).map(Color::from_premultiplied_argb)
    }

    pub(crate) fn raw_pixel(&self, x: i32, y: i32) -> Option<u32> {
        let i = self.index(x, y)?;
        Some(self.data[i])
    }

    pub(crate) fn set_raw_pixel(&mut self, x: i32, y: i32, px: u32) {
        if let Some(i) = self.index(x, y) {
            self.data[i] = px;
        }
    }

    /// Overwrites one pixel (no blending).
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        self.set_raw_pixel(x, y, color.to_premultiplied_argb());
    }

    /// Overwrites every pixel with `color`.
    pub fn fill(&mut self, color: Color) {
        self.draw_target().clear(color.to_source());
    }

    /// Overwrites the pixels of an axis-aligned rectangle, clipped to the canvas.
    pub fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Color) {
        let options = DrawOptions {
            blend_mode: BlendMode::Src,
            ..DrawOptions::new()
        };
        self.draw_target().fill_rect(
            x as f32,
            y as f32,
            width as f32,
            height as f32,
            &Source::Solid(color.to_source()),
            &options,
        );
    }

    /// Composites `layer` onto this canvas with its top-left corner at `(x, y)`, using the
    /// Porter-Duff "over" operator. Transparent layer pixels leave the canvas untouched.
    pub fn composite_over(&mut self, layer: &Canvas, x: i32, y: i32) {
        let image = Image {
            width: layer.width as i32,
            height: layer.height as i32,
            data: &layer.data,
        };
        self.draw_target()
            .draw_image_at(x as f32, y as f32, &image, &DrawOptions::new());
    }

    /// The premultiplied `0xAARRGGBB` pixels, row-major.
    pub fn pixels(&self) -> &[u32] {
        &self.data
    }

    /// Straight-alpha RGBA bytes, row-major, for handing to an image encoder.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.data.len() * 4);
        for &px in &self.data {
            let c = Color::from_premultiplied_argb(px);
            bytes.extend_from_slice(&[c.r, c.g, c.b, c.a]);
        }
        bytes
    }

    /// Encodes the canvas as an RGBA PNG file.
    pub fn write_png<P: AsRef<Path>>(&self, path: P) -> Result<(), png::EncodingError> {
        DrawTarget::from_vec(self.width as i32, self.height as i32, self.data.clone())
            .write_png(path)
    }

    /// Borrows the pixels as a draw target for rasterizing paths.
    pub(crate) fn draw_target(&mut self) -> DrawTarget<&mut [u32]> {
        DrawTarget::from_backing(self.width as i32, self.height as i32, &mut self.data[..])
    }
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn assert_send<T: Send>() {}

    #[test]
    fn test_canvas_is_send() {
        assert_send::<Canvas>();
    }

    #[test]
    fn test_out_of_range_is_ignored() {
        let mut canvas = Canvas::new(4, 3);
        canvas.set_pixel(-1, 0, Color::BLACK);
        canvas.set_pixel(4, 0, Color::BLACK);
        canvas.set_pixel(0, 3, Color::BLACK);
        assert_eq!(canvas.pixel(-1, 0), None);
        assert_eq!(canvas.pixel(4, 2), None);
        assert_eq!(canvas.pixel(3, 3), None);
        assert!(canvas.to_rgba8().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_fill_and_set() {
        let mut canvas = Canvas::new(5, 5);
        canvas.fill(Color::WHITE);
        canvas.set_pixel(2, 3, Color::rgb(1, 2, 3));
        assert_eq!(canvas.pixel(0, 0), Some(Color::WHITE));
        assert_eq!(canvas.pixel(2, 3), Some(Color::rgb(1, 2, 3)));
        assert_eq!(canvas.to_rgba8().len(), 5 * 5 * 4);
    }

    #[test]
    fn test_fill_rect_is_clipped() {
        let mut canvas = Canvas::new(6, 6);
        canvas.fill(Color::WHITE);
        canvas.fill_rect(4, 4, 4, 4, Color::BLACK);
        assert_eq!(canvas.pixel(4, 4), Some(Color::BLACK));
        assert_eq!(canvas.pixel(5, 5), Some(Color::BLACK));
        assert_eq!(canvas.pixel(3, 3), Some(Color::WHITE));
        assert_eq!(canvas.pixel(3, 5), Some(Color::WHITE));

        canvas.fill_rect(-2, -2, 3, 3, Color::rgb(150, 120, 200));
        assert_eq!(canvas.pixel(0, 0), Some(Color::rgb(150, 120, 200)));
        assert_eq!(canvas.pixel(1, 1), Some(Color::WHITE));
    }

    #[test]
    fn test_fill_rect_replaces_instead_of_blending() {
        let mut canvas = Canvas::new(3, 3);
        canvas.fill(Color::WHITE);
        canvas.fill_rect(0, 0, 3, 3, Color::TRANSPARENT);
        assert!(canvas.pixels().iter().all(|px| *px == 0));
    }

    #[test]
    fn test_composite_over() {
        let mut canvas = Canvas::new(4, 4);
        canvas.fill(Color::WHITE);
        let mut layer = Canvas::new(2, 2);
        layer.set_pixel(0, 0, Color::BLACK);
        layer.set_pixel(1, 1, Color::rgba(255, 0, 0, 0));
        canvas.composite_over(&layer, 1, 1);

        assert_eq!(canvas.pixel(1, 1), Some(Color::BLACK));
        // transparent layer pixels keep the canvas
        assert_eq!(canvas.pixel(2, 1), Some(Color::WHITE));
        assert_eq!(canvas.pixel(2, 2), Some(Color::WHITE));
        assert_eq!(canvas.pixel(0, 0), Some(Color::WHITE));
    }

    #[test]
    fn test_composite_half_alpha() {
        let mut canvas = Canvas::new(1, 1);
        canvas.fill(Color::WHITE);
        let mut layer = Canvas::new(1, 1);
        layer.set_pixel(0, 0, Color::rgba(0, 0, 0, 128));
        canvas.composite_over(&layer, 0, 0);
        let c = canvas.pixel(0, 0).unwrap();
        assert_eq!(c.a, 255);
        assert!((125..=129).contains(&c.r), "got {:?}", c);
    }

    #[test]
    fn test_write_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("canvas.png");
        let mut canvas = Canvas::new(3, 2);
        canvas.fill(Color::rgb(10, 20, 30));
        canvas.write_png(&path).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    #[should_panic(expected = "too large")]
    fn test_oversized_canvas_panics() {
        Canvas::new(3_000_000_000, 2);
    }
}

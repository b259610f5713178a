//! Text rasterisation for the cube-map face labels.
//!
//! Labels are rasterised by `fontdue`, from the embedded DejaVu Serif face
//! unless another TrueType/OpenType font is supplied. Glyph coverage is
//! blended straight into an [`RgbaImage`], so the output is deterministic.

use crate::error::{DemoError, Result};
use fontdue::{Font, FontSettings};
use image::{Rgba, RgbaImage};
use std::path::Path;
use std::sync::Arc;

/// Built-in label font (DejaVu Serif, see `fonts/DejaVu-LICENSE.txt`).
const EMBEDDED_FONT: &[u8] = include_bytes!("fonts/DejaVuSerif.ttf");

/// Font used to draw face labels. Cloning shares the parsed font.
#[derive(Clone)]
pub struct LabelFont {
    font: Arc<Font>,
}

impl std::fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelFont")
            .field("glyphs", &self.font.glyph_count())
            .finish()
    }
}

impl LabelFont {
    /// The embedded serif font.
    pub fn embedded() -> Result<Self> {
        Self::from_bytes(EMBEDDED_FONT)
    }

    /// Parse a font from raw TTF/OTF bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let font = Font::from_bytes(data, FontSettings::default())
            .map_err(|e| DemoError::Font(e.to_string()))?;
        Ok(Self {
            font: Arc::new(font),
        })
    }

    /// Load and parse a font file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_bytes(&data)
    }

    /// Draw `text` centred (horizontally and vertically) on `(cx, cy)` at a
    /// nominal font size of `px` pixels. Anything outside the image is clipped.
    pub fn draw_centered(
        &self,
        image: &mut RgbaImage,
        text: &str,
        cx: f32,
        cy: f32,
        px: f32,
        color: Rgba<u8>,
    ) {
        draw_truetype(&self.font, image, text, cx, cy, px, color);
    }
}

fn draw_truetype(
    font: &Font,
    image: &mut RgbaImage,
    text: &str,
    cx: f32,
    cy: f32,
    px: f32,
    color: Rgba<u8>,
) {
    if px <= 0.0 {
        return;
    }

    let glyphs: Vec<(fontdue::Metrics, Vec<u8>)> =
        text.chars().map(|c| font.rasterize(c, px)).collect();
    let total_advance: f32 = glyphs.iter().map(|(m, _)| m.advance_width).sum();

    // Middle baseline: halfway between ascent and descent
    let (ascent, descent) = font
        .horizontal_line_metrics(px)
        .map(|m| (m.ascent, m.descent))
        .unwrap_or((px * 0.8, -px * 0.2));
    let baseline = cy + (ascent + descent) / 2.0;

    let mut pen_x = cx - total_advance / 2.0;
    for (metrics, bitmap) in &glyphs {
        let left = (pen_x + metrics.xmin as f32).floor() as i64;
        let top = (baseline - (metrics.ymin as f32 + metrics.height as f32)).floor() as i64;

        for gy in 0..metrics.height {
            for gx in 0..metrics.width {
                let coverage = bitmap[gy * metrics.width + gx];
                if coverage > 0 {
                    blend_pixel(image, left + gx as i64, top + gy as i64, color, coverage);
                }
            }
        }

        pen_x += metrics.advance_width;
    }
}

/// Fill an axis-aligned block, clipped to the image.
pub(crate) fn fill_block(image: &mut RgbaImage, x: i64, y: i64, w: u32, h: u32, color: Rgba<u8>) {
    let x_start = x.max(0);
    let y_start = y.max(0);
    let x_end = (x + w as i64).min(image.width() as i64);
    let y_end = (y + h as i64).min(image.height() as i64);

    for py in y_start..y_end {
        for px in x_start..x_end {
            image.put_pixel(px as u32, py as u32, color);
        }
    }
}

fn blend_pixel(image: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>, coverage: u8) {
    if x < 0 || y < 0 || x >= image.width() as i64 || y >= image.height() as i64 {
        return;
    }
    let dst = image.get_pixel_mut(x as u32, y as u32);
    let a = coverage as u32;
    for channel in 0..3 {
        let src = color.0[channel] as u32;
        let old = dst.0[channel] as u32;
        dst.0[channel] = ((src * a + old * (255 - a) + 127) / 255) as u8;
    }
    dst.0[3] = 255;
}

#[cfg(test)]
mod tests {
    use super::*;

    const INK: Rgba<u8> = Rgba([0, 64, 128, 255]);
    const PAPER: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn inked(image: &RgbaImage) -> Vec<(u32, u32)> {
        image
            .enumerate_pixels()
            .filter(|(_, _, p)| **p != PAPER)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    #[test]
    fn embedded_font_covers_every_label_character() {
        let font = LabelFont::embedded().unwrap();
        for c in "pos-neg-xyz".chars() {
            assert_ne!(font.font.lookup_glyph_index(c), 0, "missing glyph for {c:?}");
        }
    }

    #[test]
    fn label_is_centred_horizontally() {
        let font = LabelFont::embedded().unwrap();
        let mut image = RgbaImage::from_pixel(512, 512, PAPER);
        font.draw_centered(&mut image, "pos-x", 256.0, 256.0, 128.0, INK);

        let ink = inked(&image);
        assert!(!ink.is_empty());
        let min_x = ink.iter().map(|p| p.0).min().unwrap();
        let max_x = ink.iter().map(|p| p.0).max().unwrap();
        let centre = (min_x + max_x) as f32 / 2.0;
        assert!((centre - 256.0).abs() < 12.0, "ink centred at {centre}");

        let min_y = ink.iter().map(|p| p.1).min().unwrap();
        let max_y = ink.iter().map(|p| p.1).max().unwrap();
        assert!(min_y > 128 && max_y < 384, "ink spans rows {min_y}..={max_y}");
    }

    #[test]
    fn drawing_is_deterministic() {
        let font = LabelFont::embedded().unwrap();
        let draw = || {
            let mut image = RgbaImage::from_pixel(128, 128, PAPER);
            font.draw_centered(&mut image, "neg-z", 64.0, 64.0, 32.0, INK);
            image
        };
        assert_eq!(draw(), draw());
    }

    #[test]
    fn oversized_text_is_clipped_to_the_image() {
        let font = LabelFont::embedded().unwrap();
        let mut image = RgbaImage::from_pixel(4, 4, PAPER);
        font.draw_centered(&mut image, "pos-x", 2.0, 2.0, 64.0, INK);
        assert_eq!(image.dimensions(), (4, 4));
    }

    #[test]
    fn empty_text_leaves_the_image_untouched() {
        let font = LabelFont::embedded().unwrap();
        let mut image = RgbaImage::from_pixel(64, 64, PAPER);
        font.draw_centered(&mut image, "", 32.0, 32.0, 16.0, INK);
        assert!(inked(&image).is_empty());
    }

    #[test]
    fn garbage_font_bytes_are_rejected() {
        let err = LabelFont::from_bytes(b"definitely not a font").unwrap_err();
        assert!(matches!(err, DemoError::Font(_)));
    }
}

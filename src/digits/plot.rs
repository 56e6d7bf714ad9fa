//! Rendering of test images next to their predicted labels.
//!
//! Images are drawn in a binary colormap (ink dark on white) in a single
//! row, each scaled up and captioned with its predicted digit.

use std::path::Path;

use image::{GrayImage, Luma};

use crate::digits::dataset::NormalizedImages;
use crate::digits::label::ClassificationResult;
use crate::error::PlotError;

/// Upscaling factor applied to every image pixel.
const SCALE: u32 = 4;
/// Gap around tiles and captions, in output pixels.
const MARGIN: u32 = 8;
/// Upscaling factor of the 3×5 caption glyphs.
const GLYPH_SCALE: u32 = 4;

const WHITE: Luma<u8> = Luma([255]);
const INK: Luma<u8> = Luma([0]);

/// 3×5 bitmaps of the digits 0-9, one row per byte, high bit on the left.
const GLYPHS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b001, 0b001, 0b001],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];

/// Draws the first `results.len()` images of `images` with their predictions.
pub fn prediction_grid(
    images: &NormalizedImages,
    results: &[ClassificationResult],
) -> Result<GrayImage, PlotError> {
    if results.is_empty() {
        return Err(PlotError::Empty);
    }
    if results.len() > images.len() {
        return Err(PlotError::CountMismatch {
            images: images.len(),
            predictions: results.len(),
        });
    }

    let tile_w = images.cols as u32 * SCALE;
    let tile_h = images.rows as u32 * SCALE;
    let glyph_w = 3 * GLYPH_SCALE;
    let glyph_h = 5 * GLYPH_SCALE;
    let count = results.len() as u32;

    let width = MARGIN + count * (tile_w + MARGIN);
    let height = MARGIN + tile_h + MARGIN + glyph_h + MARGIN;
    let mut canvas = GrayImage::from_pixel(width, height, WHITE);

    for (i, result) in results.iter().enumerate() {
        let left = MARGIN + i as u32 * (tile_w + MARGIN);

        for (p, &value) in images.image(i).iter().enumerate() {
            let (row, col) = (p / images.cols, p % images.cols);
            let shade = Luma([255 - (value.clamp(0.0, 1.0) * 255.0).round() as u8]);
            fill_rect(
                &mut canvas,
                left + col as u32 * SCALE,
                MARGIN + row as u32 * SCALE,
                SCALE,
                SCALE,
                shade,
            );
        }

        let caption_left = left + tile_w.saturating_sub(glyph_w) / 2;
        let caption_top = MARGIN + tile_h + MARGIN;
        draw_number(&mut canvas, result.predicted_label, caption_left, caption_top);
    }

    Ok(canvas)
}

/// Renders the grid and writes it to `path`; the format follows the extension.
pub fn render_prediction_grid(
    images: &NormalizedImages,
    results: &[ClassificationResult],
    path: &Path,
) -> Result<(), PlotError> {
    prediction_grid(images, results)?.save(path)?;
    Ok(())
}

/// Draws `value` in decimal, left to right from `(left, top)`.
fn draw_number(canvas: &mut GrayImage, value: usize, left: u32, top: u32) {
    let advance = 4 * GLYPH_SCALE;
    for (k, digit) in value.to_string().bytes().enumerate() {
        let glyph = &GLYPHS[usize::from(digit - b'0')];
        let x0 = left + k as u32 * advance;
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..3u32 {
                if bits & (0b100 >> col) != 0 {
                    fill_rect(
                        canvas,
                        x0 + col * GLYPH_SCALE,
                        top + row as u32 * GLYPH_SCALE,
                        GLYPH_SCALE,
                        GLYPH_SCALE,
                        INK,
                    );
                }
            }
        }
    }
}

/// Fills a rectangle, clipped to the canvas.
fn fill_rect(canvas: &mut GrayImage, x: u32, y: u32, w: u32, h: u32, color: Luma<u8>) {
    let x_end = (x + w).min(canvas.width());
    let y_end = (y + h).min(canvas.height());
    for yy in y..y_end {
        for xx in x..x_end {
            canvas.put_pixel(xx, yy, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use image::GenericImageView;

    use super::*;

    fn images(count: usize) -> NormalizedImages {
        let mut values = Vec::new();
        for _ in 0..count {
            // Single lit pixel in the top-left corner of each 2×2 image.
            values.extend_from_slice(&[1.0, 0.0, 0.0, 0.0]);
        }
        NormalizedImages { rows: 2, cols: 2, values }
    }

    fn result(label: usize) -> ClassificationResult {
        ClassificationResult { predicted_label: label, actual_label: None }
    }

    #[test]
    fn grid_has_one_tile_per_prediction() {
        let grid = prediction_grid(&images(5), &[result(0), result(1), result(2)]).unwrap();
        let tile = 2 * SCALE;
        assert_eq!(grid.width(), MARGIN + 3 * (tile + MARGIN));
        assert_eq!(grid.height(), MARGIN + tile + MARGIN + 5 * GLYPH_SCALE + MARGIN);
    }

    #[test]
    fn ink_is_dark_on_white() {
        let grid = prediction_grid(&images(1), &[result(7)]).unwrap();
        assert_eq!(grid.get_pixel(MARGIN, MARGIN), &Luma([0]));
        assert_eq!(grid.get_pixel(MARGIN + SCALE, MARGIN), &Luma([255]));
        assert_eq!(grid.get_pixel(0, 0), &WHITE);
    }

    #[test]
    fn caption_is_drawn_under_the_tile() {
        let grid = prediction_grid(&images(1), &[result(1)]).unwrap();
        let caption_top = MARGIN + 2 * SCALE + MARGIN;
        let inked = (caption_top..grid.height())
            .flat_map(|y| (0..grid.width()).map(move |x| (x, y)))
            .filter(|&(x, y)| grid.get_pixel(x, y) == &INK)
            .count();
        // Glyph "1" has 8 lit cells.
        assert_eq!(inked as u32, 8 * GLYPH_SCALE * GLYPH_SCALE);
    }

    #[test]
    fn rejects_empty_and_oversized_requests() {
        assert!(matches!(prediction_grid(&images(2), &[]), Err(PlotError::Empty)));
        assert!(matches!(
            prediction_grid(&images(1), &[result(0), result(1)]),
            Err(PlotError::CountMismatch { images: 1, predictions: 2 })
        ));
    }

    #[test]
    fn writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("predictions.png");
        render_prediction_grid(&images(2), &[result(3), result(9)], &path).unwrap();
        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.width(), MARGIN + 2 * (2 * SCALE + MARGIN));
    }
}

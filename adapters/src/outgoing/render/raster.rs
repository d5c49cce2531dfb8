use image::{ImageFormat, Rgba, RgbaImage};
use std::path::Path;

use cityposter_application::error::{AppError, AppResult};
use domain::color::RgbColor;

use super::font::{self, ADVANCE_CELLS, GLYPH_ROWS};
use super::projection::Px;
use super::{Fade, Stroke, Surface, TextStyle};

/// Glyph cell edge relative to the font size.
const CELL_PER_FONT_SIZE: f64 = 0.1;

/// RGBA canvas painted with scanline fills and distance-based line stamping.
/// Starts fully transparent.
pub struct RasterSurface {
    image: RgbaImage,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    /// Source-over compositing of `color` at `alpha` onto one pixel.
    fn blend(&mut self, x: u32, y: u32, color: RgbColor, alpha: f64) {
        let alpha = alpha.clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }
        let Some(pixel) = self.image.get_pixel_mut_checked(x, y) else {
            return;
        };

        let [r, g, b, a] = pixel.0;
        let dst_alpha = f64::from(a) / 255.0;
        let out_alpha = alpha + dst_alpha * (1.0 - alpha);
        let channel = |src: u8, dst: u8| {
            let value =
                (f64::from(src) * alpha + f64::from(dst) * dst_alpha * (1.0 - alpha)) / out_alpha;
            value.round().clamp(0.0, 255.0) as u8
        };
        *pixel = Rgba([
            channel(color.r, r),
            channel(color.g, g),
            channel(color.b, b),
            (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8,
        ]);
    }

    /// Half-open pixel index range whose centres fall inside `[start, end)`.
    fn covered(start: f64, end: f64, limit: u32) -> (u32, u32) {
        let first = (start - 0.5).ceil().max(0.0);
        let last = (end - 0.5).ceil().min(f64::from(limit));
        if last <= first {
            (0, 0)
        } else {
            (first as u32, last as u32)
        }
    }

    fn fill_rect(&mut self, left: f64, top: f64, right: f64, bottom: f64, color: RgbColor, alpha: f64) {
        let (width, height) = self.image.dimensions();
        let (x0, x1) = Self::covered(left, right, width);
        let (y0, y1) = Self::covered(top, bottom, height);
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend(x, y, color, alpha);
            }
        }
    }

    fn stamp_segment(&mut self, a: Px, b: Px, stroke: Stroke) {
        let (width, height) = self.image.dimensions();
        let half = (stroke.width / 2.0).max(0.5);
        let reach = half + 1.0;
        let (x0, x1) = Self::covered(a.x.min(b.x) - reach, a.x.max(b.x) + reach, width);
        let (y0, y1) = Self::covered(a.y.min(b.y) - reach, a.y.max(b.y) + reach, height);

        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let length_sq = dx * dx + dy * dy;
        for y in y0..y1 {
            let py = f64::from(y) + 0.5;
            for x in x0..x1 {
                let px = f64::from(x) + 0.5;
                let t = if length_sq > 0.0 {
                    (((px - a.x) * dx + (py - a.y) * dy) / length_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let distance = (px - (a.x + t * dx)).hypot(py - (a.y + t * dy));
                let coverage = (half + 0.5 - distance).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x, y, stroke.color, stroke.alpha * coverage);
                }
            }
        }
    }

    #[cfg(test)]
    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

/// Pairs each vertex with its successor, wrapping around to close the ring.
fn ring_edges(ring: &[Px]) -> impl Iterator<Item = (&Px, &Px)> {
    ring.iter().zip(ring.iter().cycle().skip(1))
}

impl Surface for RasterSurface {
    fn fill_background(&mut self, color: RgbColor) {
        let pixel = Rgba([color.r, color.g, color.b, u8::MAX]);
        for target in self.image.pixels_mut() {
            *target = pixel;
        }
    }

    fn fill_polygon(&mut self, rings: &[Vec<Px>], color: RgbColor) {
        let (width, height) = self.image.dimensions();
        let (min_y, max_y) = rings
            .iter()
            .flatten()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.y), hi.max(p.y))
            });
        if !(min_y.is_finite() && max_y.is_finite()) {
            return;
        }

        let (first_row, end_row) = Self::covered(min_y, max_y, height);
        let mut crossings: Vec<f64> = Vec::new();
        for row in first_row..end_row {
            let sample = f64::from(row) + 0.5;
            crossings.clear();
            for ring in rings {
                for (a, b) in ring_edges(ring) {
                    if (a.y <= sample) != (b.y <= sample) {
                        crossings.push(a.x + (sample - a.y) * (b.x - a.x) / (b.y - a.y));
                    }
                }
            }
            crossings.sort_by(f64::total_cmp);

            for span in crossings.chunks_exact(2) {
                if let [start, end] = span {
                    let (x0, x1) = Self::covered(*start, *end, width);
                    for x in x0..x1 {
                        self.blend(x, row, color, 1.0);
                    }
                }
            }
        }
    }

    fn stroke_polylines(&mut self, lines: &[Vec<Px>], stroke: Stroke) {
        for line in lines {
            match line.as_slice() {
                [] => {}
                [only] => self.stamp_segment(*only, *only, stroke),
                _ => {
                    for pair in line.windows(2) {
                        if let [a, b] = pair {
                            self.stamp_segment(*a, *b, stroke);
                        }
                    }
                }
            }
        }
    }

    fn vertical_fade(&mut self, fade: Fade) {
        let (width, height) = self.image.dimensions();
        let span = fade.bottom - fade.top;
        if span <= 0.0 {
            return;
        }
        let (y0, y1) = Self::covered(fade.top, fade.bottom, height);
        for y in y0..y1 {
            let t = (f64::from(y) + 0.5 - fade.top) / span;
            let alpha = fade.top_alpha + (fade.bottom_alpha - fade.top_alpha) * t;
            for x in 0..width {
                self.blend(x, y, fade.color, alpha);
            }
        }
    }

    /// Block glyphs from the built-in bitmap font; the weight is not rendered.
    fn draw_text(&mut self, text: &str, anchor: Px, style: TextStyle) {
        let cell = (style.size * CELL_PER_FONT_SIZE).max(1.0);
        let advance = ADVANCE_CELLS * cell;
        let count = text.chars().count() as f64;
        let total_width = (count * advance - cell).max(0.0);
        let top = anchor.y - GLYPH_ROWS as f64 * cell;

        let mut left = anchor.x - total_width / 2.0;
        for c in text.chars() {
            if let Some(glyph) = font::glyph(c) {
                for (column, row) in font::lit_cells(glyph) {
                    let x = left + f64::from(column) * cell;
                    let y = top + row as f64 * cell;
                    self.fill_rect(x, y, x + cell, y + cell, style.color, style.alpha);
                }
            }
            left += advance;
        }
    }

    fn save(self, path: &Path) -> AppResult<()> {
        self.image
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| AppError::RenderError {
                message: format!("Failed to write PNG {}: {e}", path.display()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outgoing::render::TextWeight;

    const RED: RgbColor = RgbColor::new(255, 0, 0);

    fn px(x: f64, y: f64) -> Px {
        Px { x, y }
    }

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Px> {
        vec![px(x0, y0), px(x1, y0), px(x1, y1), px(x0, y1)]
    }

    fn alpha_at(image: &RgbaImage, x: u32, y: u32) -> u8 {
        image.get_pixel(x, y).0[3]
    }

    #[test]
    fn fresh_surface_is_transparent() {
        let image = RasterSurface::new(4, 4).into_image();
        assert!(image.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn fills_polygon_interior_only() {
        let mut surface = RasterSurface::new(10, 10);
        surface.fill_polygon(&[square(2.0, 2.0, 8.0, 8.0)], RED);
        let image = surface.into_image();

        assert_eq!(image.get_pixel(5, 5).0, [255, 0, 0, 255]);
        assert_eq!(alpha_at(&image, 1, 5), 0);
        assert_eq!(alpha_at(&image, 8, 5), 0);
        assert_eq!(alpha_at(&image, 2, 2), 255);
    }

    #[test]
    fn inner_ring_leaves_a_hole() {
        let mut surface = RasterSurface::new(10, 10);
        surface.fill_polygon(
            &[square(0.0, 0.0, 10.0, 10.0), square(4.0, 4.0, 6.0, 6.0)],
            RED,
        );
        let image = surface.into_image();

        assert_eq!(alpha_at(&image, 1, 1), 255);
        assert_eq!(alpha_at(&image, 4, 4), 0);
        assert_eq!(alpha_at(&image, 5, 5), 0);
    }

    #[test]
    fn half_alpha_blends_over_background() {
        let mut surface = RasterSurface::new(1, 1);
        surface.fill_background(RgbColor::WHITE);
        surface.blend(0, 0, RgbColor::BLACK, 0.5);

        assert_eq!(surface.into_image().get_pixel(0, 0).0, [128, 128, 128, 255]);
    }

    #[test]
    fn stroke_covers_the_line_and_spares_the_rest() {
        let mut surface = RasterSurface::new(20, 20);
        surface.stroke_polylines(
            &[vec![px(2.0, 10.0), px(18.0, 10.0)]],
            Stroke {
                width: 3.0,
                color: RED,
                alpha: 1.0,
            },
        );
        let image = surface.into_image();

        assert_eq!(alpha_at(&image, 10, 9), 255);
        assert_eq!(alpha_at(&image, 10, 10), 255);
        assert_eq!(alpha_at(&image, 10, 2), 0);
    }

    #[test]
    fn fade_runs_from_opaque_to_clear() {
        let mut surface = RasterSurface::new(2, 10);
        surface.vertical_fade(Fade {
            top: 0.0,
            bottom: 10.0,
            color: RED,
            top_alpha: 1.0,
            bottom_alpha: 0.0,
        });
        let image = surface.into_image();

        assert!(alpha_at(&image, 0, 0) > alpha_at(&image, 0, 5));
        assert!(alpha_at(&image, 0, 5) > alpha_at(&image, 0, 9));
    }

    #[test]
    fn text_is_drawn_above_the_baseline() {
        let mut surface = RasterSurface::new(100, 40);
        surface.draw_text(
            "I",
            px(50.0, 30.0),
            TextStyle {
                size: 20.0,
                color: RED,
                alpha: 1.0,
                weight: TextWeight::Bold,
            },
        );
        let image = surface.into_image();

        let lit: Vec<(u32, u32)> = image
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0[3] > 0)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!lit.is_empty());
        assert!(lit.iter().all(|(_, y)| *y >= 16 && *y < 30));
        assert!(lit.iter().any(|(x, _)| *x == 50));
    }
}

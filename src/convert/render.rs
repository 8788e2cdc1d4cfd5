//! Rasterizes a decoded stitch pattern into an RGB image.
//!
//! Thread runs become polylines on a white canvas; the design is scaled
//! to fit inside the configured maximum size with a fixed padding, never
//! scaled up beyond its native resolution.

use image::{Rgb, RgbImage};

use super::pes::{Pattern, StitchCommand};

/// Thread colors cycled on each color change.
const PALETTE: [Rgb<u8>; 6] = [
    Rgb([0, 0, 0]),       // black
    Rgb([200, 0, 0]),     // red
    Rgb([0, 0, 200]),     // blue
    Rgb([0, 140, 0]),     // green
    Rgb([128, 0, 128]),   // purple
    Rgb([230, 120, 0]),   // orange
];

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub max_width: u32,
    pub max_height: u32,
    pub padding: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_width: 800,
            max_height: 600,
            padding: 50,
        }
    }
}

/// Draw the pattern. The returned image is sized to the scaled pattern
/// bounds plus padding on every side.
pub fn render(pattern: &Pattern, opts: &RenderOptions) -> RgbImage {
    let (min_x, min_y, max_x, max_y) = pattern.bounds().unwrap_or((0, 0, 0, 0));
    let pattern_w = (max_x - min_x) as f64;
    let pattern_h = (max_y - min_y) as f64;
    let padding = opts.padding as f64;

    let scale = if pattern_w > 0.0 && pattern_h > 0.0 {
        let sx = (opts.max_width as f64 - 2.0 * padding) / pattern_w;
        let sy = (opts.max_height as f64 - 2.0 * padding) / pattern_h;
        sx.min(sy).min(1.0)
    } else {
        1.0
    };

    let img_w = (pattern_w * scale) as u32 + 2 * opts.padding;
    let img_h = (pattern_h * scale) as u32 + 2 * opts.padding;
    let mut img = RgbImage::from_pixel(img_w.max(1), img_h.max(1), BACKGROUND);

    let project = |x: i32, y: i32| -> (i32, i32) {
        (
            ((x - min_x) as f64 * scale) as i32 + opts.padding as i32,
            ((y - min_y) as f64 * scale) as i32 + opts.padding as i32,
        )
    };

    let mut prev: Option<(i32, i32)> = None;
    let mut color_index = 0usize;

    for stitch in &pattern.stitches {
        let point = project(stitch.x, stitch.y);
        match stitch.command {
            StitchCommand::ColorChange => {
                color_index = (color_index + 1) % PALETTE.len();
                prev = Some(point);
            }
            StitchCommand::Jump => {
                prev = Some(point);
            }
            StitchCommand::Trim => {
                prev = None;
            }
            StitchCommand::Stitch => {
                if let Some(p) = prev {
                    draw_line(&mut img, p, point, PALETTE[color_index]);
                }
                prev = Some(point);
            }
        }
    }

    img
}

/// Bresenham line with a one-pixel thickening pass so stitches stay
/// visible after JPEG compression.
fn draw_line(img: &mut RgbImage, from: (i32, i32), to: (i32, i32), color: Rgb<u8>) {
    let (mut x0, mut y0) = from;
    let (x1, y1) = to;
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        plot(img, x0, y0, color);
        plot(img, x0 + 1, y0, color);
        plot(img, x0, y0 + 1, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

fn plot(img: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

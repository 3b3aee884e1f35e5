//! Edge detection for document boundary extraction.
//!
//! Sobel gradients, non-maximum suppression along the quantized gradient
//! direction, and double-threshold hysteresis linking. The output is a
//! one-pixel-wide binary edge map suitable for contour tracing.

use crate::{BinaryImage, GrayImage};
use serde::{Deserialize, Serialize};

/// Hysteresis thresholds on the Sobel gradient magnitude.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct EdgeParams {
    /// Magnitudes below this are never edges.
    pub low: f32,
    /// Magnitudes at or above this seed edge chains.
    pub high: f32,
}

impl Default for EdgeParams {
    fn default() -> Self {
        Self {
            low: 75.0,
            high: 200.0,
        }
    }
}

#[inline]
fn px(img: &GrayImage, x: i32, y: i32) -> i32 {
    let xc = x.clamp(0, img.width as i32 - 1) as usize;
    let yc = y.clamp(0, img.height as i32 - 1) as usize;
    img.data[yc * img.width + xc] as i32
}

/// Detect edges in a (pre-smoothed) grayscale image.
pub fn detect_edges(img: &GrayImage, params: &EdgeParams) -> BinaryImage {
    let (w, h) = (img.width, img.height);
    if w < 3 || h < 3 {
        return BinaryImage::new(w, h);
    }

    let mut mag = vec![0f32; w * h];
    let mut dir = vec![0u8; w * h]; // quantized: 0 = E/W, 1 = NE/SW, 2 = N/S, 3 = NW/SE

    for y in 0..h as i32 {
        for x in 0..w as i32 {
            let gx = -px(img, x - 1, y - 1) + px(img, x + 1, y - 1) - 2 * px(img, x - 1, y)
                + 2 * px(img, x + 1, y)
                - px(img, x - 1, y + 1)
                + px(img, x + 1, y + 1);
            let gy = -px(img, x - 1, y - 1) - 2 * px(img, x, y - 1) - px(img, x + 1, y - 1)
                + px(img, x - 1, y + 1)
                + 2 * px(img, x, y + 1)
                + px(img, x + 1, y + 1);

            let i = y as usize * w + x as usize;
            mag[i] = ((gx * gx + gy * gy) as f32).sqrt();

            let angle = (gy as f32).atan2(gx as f32).to_degrees();
            let a = if angle < 0.0 { angle + 180.0 } else { angle };
            dir[i] = if !(22.5..157.5).contains(&a) {
                0
            } else if a < 67.5 {
                1
            } else if a < 112.5 {
                2
            } else {
                3
            };
        }
    }

    // Non-maximum suppression: keep only local maxima across the gradient.
    let neighbor = |i: usize, d: u8| -> (f32, f32) {
        let x = (i % w) as i32;
        let y = (i / w) as i32;
        let (dx, dy) = match d {
            0 => (1i32, 0i32),
            1 => (1, 1),
            2 => (0, 1),
            _ => (-1, 1),
        };
        let at = |xx: i32, yy: i32| -> f32 {
            if xx < 0 || yy < 0 || xx >= w as i32 || yy >= h as i32 {
                0.0
            } else {
                mag[yy as usize * w + xx as usize]
            }
        };
        (at(x + dx, y + dy), at(x - dx, y - dy))
    };

    let mut strong = Vec::new();
    let mut candidate = vec![false; w * h];
    let mut out = BinaryImage::new(w, h);

    for i in 0..w * h {
        let m = mag[i];
        if m < params.low {
            continue;
        }
        let (a, b) = neighbor(i, dir[i]);
        if m < a || m < b {
            continue;
        }
        candidate[i] = true;
        if m >= params.high {
            strong.push(i);
        }
    }

    // Hysteresis: grow from strong seeds through 8-connected candidates.
    let mut stack = strong;
    while let Some(i) = stack.pop() {
        if !candidate[i] {
            continue;
        }
        candidate[i] = false;
        let x = (i % w) as i32;
        let y = (i / w) as i32;
        out.set(x as usize, y as usize);
        for dy in -1i32..=1 {
            for dx in -1i32..=1 {
                let (nx, ny) = (x + dx, y + dy);
                if nx < 0 || ny < 0 || nx >= w as i32 || ny >= h as i32 {
                    continue;
                }
                let ni = ny as usize * w + nx as usize;
                if candidate[ni] {
                    stack.push(ni);
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_step_produces_vertical_edge() {
        let mut img = GrayImage::new(16, 16);
        for y in 0..16 {
            for x in 8..16 {
                img.set(x, y, 255);
            }
        }
        let edges = detect_edges(&img, &EdgeParams::default());

        // Edge pixels concentrate around the step column.
        let mut on_step = 0usize;
        let mut elsewhere = 0usize;
        for y in 2..14 {
            for x in 0..16 {
                if edges.is_set(x, y) {
                    if (6..=9).contains(&x) {
                        on_step += 1;
                    } else {
                        elsewhere += 1;
                    }
                }
            }
        }
        assert!(on_step >= 10, "on_step = {on_step}");
        assert_eq!(elsewhere, 0);
    }

    #[test]
    fn flat_image_has_no_edges() {
        let img = GrayImage {
            width: 10,
            height: 10,
            data: vec![200; 100],
        };
        let edges = detect_edges(&img, &EdgeParams::default());
        assert!(edges.data.iter().all(|&v| v == 0));
    }
}

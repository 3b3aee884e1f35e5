//! Mark scoring: decide which bubble (if any) is filled in each row.

use crate::{DetectorParams, QuestionRow};
use sheetgrade_core::{BinaryImage, Contour};

/// Sentinel recorded for a row with no sufficiently filled bubble.
pub const NO_MARK: i32 = -1;

/// Count ink pixels strictly inside a traced contour.
///
/// For each bounding-box row the boundary's leftmost and rightmost columns
/// delimit the region; the boundary columns themselves are excluded, so an
/// unfilled printed outline contributes only its top and bottom arcs while
/// a penciled-in bubble contributes its whole interior.
fn interior_ink_count(ink: &BinaryImage, contour: &Contour) -> usize {
    let b = contour.bbox;
    let rows = b.height as usize;
    let mut span: Vec<Option<(i32, i32)>> = vec![None; rows];

    for &(x, y) in &contour.points {
        let r = (y - b.y) as usize;
        span[r] = Some(match span[r] {
            Some((lo, hi)) => (lo.min(x), hi.max(x)),
            None => (x, x),
        });
    }

    let mut count = 0usize;
    for (r, s) in span.iter().enumerate() {
        let Some((lo, hi)) = *s else { continue };
        let y = b.y as usize + r;
        for x in (lo + 1)..hi {
            if x >= 0 && ink.is_set(x as usize, y) {
                count += 1;
            }
        }
    }
    count
}

/// Decide the marked option per row on the same thresholded raster the
/// bubbles were detected on.
///
/// The bubble with the maximum interior ink count is the candidate; it is
/// accepted only when that count exceeds `fill_floor_rel` of the sheet
/// height, otherwise the row is recorded as [`NO_MARK`]. Ties keep the
/// first (leftmost) bubble.
pub fn score_marks(ink: &BinaryImage, rows: &[QuestionRow], params: &DetectorParams) -> Vec<i32> {
    let floor = (params.fill_floor_rel * ink.height as f32) as usize;

    rows.iter()
        .map(|row| {
            let mut best_idx = 0usize;
            let mut best_count = 0usize;
            for (i, bubble) in row.bubbles.iter().enumerate() {
                let c = interior_ink_count(ink, &bubble.contour);
                if c > best_count {
                    best_count = c;
                    best_idx = i;
                }
            }
            if best_count > floor {
                best_idx as i32
            } else {
                NO_MARK
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BubbleRegion;
    use sheetgrade_core::trace_external_contours;

    fn draw_disk(bin: &mut BinaryImage, cx: i32, cy: i32, r: f32) {
        for y in 0..bin.height as i32 {
            for x in 0..bin.width as i32 {
                let d = (((x - cx).pow(2) + (y - cy).pow(2)) as f32).sqrt();
                if d <= r {
                    bin.set(x as usize, y as usize);
                }
            }
        }
    }

    fn draw_ring(bin: &mut BinaryImage, cx: i32, cy: i32, r: f32) {
        for y in 0..bin.height as i32 {
            for x in 0..bin.width as i32 {
                let d = (((x - cx).pow(2) + (y - cy).pow(2)) as f32).sqrt();
                if (d - r).abs() <= 0.6 {
                    bin.set(x as usize, y as usize);
                }
            }
        }
    }

    fn row_from(bin: &BinaryImage) -> QuestionRow {
        let mut contours = trace_external_contours(bin);
        contours.sort_by_key(|c| c.bbox.x);
        QuestionRow {
            bubbles: contours
                .into_iter()
                .map(|contour| BubbleRegion {
                    aspect: 1.0,
                    contour,
                })
                .collect(),
        }
    }

    #[test]
    fn filled_bubble_dominates_outlines() {
        let mut bin = BinaryImage::new(260, 100);
        draw_ring(&mut bin, 40, 50, 12.0);
        draw_disk(&mut bin, 100, 50, 12.0);
        draw_ring(&mut bin, 160, 50, 12.0);
        draw_ring(&mut bin, 220, 50, 12.0);

        let row = row_from(&bin);
        assert_eq!(row.bubbles.len(), 4);
        let marks = score_marks(&bin, &[row], &DetectorParams::default());
        assert_eq!(marks, vec![1]);
    }

    #[test]
    fn all_outlines_mean_no_answer() {
        // tall sheet: the fill floor (10% of height) sits far above the
        // few dozen interior pixels an outline contributes
        let mut bin = BinaryImage::new(200, 600);
        for i in 0..3 {
            draw_ring(&mut bin, 40 + i * 60, 300, 12.0);
        }
        let row = row_from(&bin);
        let marks = score_marks(&bin, &[row], &DetectorParams::default());
        assert_eq!(marks, vec![NO_MARK]);
    }

    #[test]
    fn equal_fill_ties_break_leftmost() {
        let mut bin = BinaryImage::new(160, 80);
        draw_disk(&mut bin, 40, 40, 12.0);
        draw_disk(&mut bin, 100, 40, 12.0);
        let row = row_from(&bin);
        let marks = score_marks(&bin, &[row], &DetectorParams::default());
        assert_eq!(marks, vec![0]);
    }

    #[test]
    fn interior_count_excludes_boundary() {
        let mut bin = BinaryImage::new(60, 60);
        draw_ring(&mut bin, 30, 30, 14.0);
        let contours = trace_external_contours(&bin);
        assert_eq!(contours.len(), 1);
        let count = interior_ink_count(&bin, &contours[0]);
        // the ring stroke alone is ~100 px; excluding the boundary
        // columns leaves mostly the top and bottom arcs
        assert!(count < 60, "count = {count}");
    }
}

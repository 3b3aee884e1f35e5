//! Sheet normalization: find the photographed document boundary and warp
//! it onto an upright canonical rectangle.

use crate::{DetectorParams, GradeError};
use log::debug;
use nalgebra::Point2;
use sheetgrade_core::{
    approx_polygon, detect_edges, gaussian_blur_5, homography_from_4pt, trace_external_contours,
    warp_perspective_gray, warp_perspective_rgb, GrayImage, RgbImage,
};

/// Canonical-orientation views of one photographed sheet. Both rasters are
/// produced by the same perspective transform and live only for the
/// duration of a single pipeline invocation.
#[derive(Clone, Debug)]
pub struct NormalizedSheet {
    pub color: RgbImage,
    pub gray: GrayImage,
}

/// Order four quad vertices as top-left, top-right, bottom-right,
/// bottom-left using the coordinate sum/difference rule.
fn order_quad(pts: &[(i32, i32)]) -> [Point2<f32>; 4] {
    let mut tl = 0usize;
    let mut br = 0usize;
    let mut tr = 0usize;
    let mut bl = 0usize;
    for (i, &(x, y)) in pts.iter().enumerate() {
        let sum = x + y;
        let diff = y - x;
        if sum < pts[tl].0 + pts[tl].1 {
            tl = i;
        }
        if sum > pts[br].0 + pts[br].1 {
            br = i;
        }
        if diff < pts[tr].1 - pts[tr].0 {
            tr = i;
        }
        if diff > pts[bl].1 - pts[bl].0 {
            bl = i;
        }
    }
    [tl, tr, br, bl].map(|i| Point2::new(pts[i].0 as f32, pts[i].1 as f32))
}

#[inline]
fn dist(a: Point2<f32>, b: Point2<f32>) -> f32 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

/// Rectify a decoded color image to the canonical sheet rectangle.
///
/// Grayscale conversion, Gaussian smoothing and edge detection feed the
/// contour search; the largest contour whose polygon approximation has
/// exactly four vertices is taken as the document boundary. Returns
/// [`GradeError::Normalization`] when no such contour exists.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "info", skip(color, params), fields(width = color.width, height = color.height))
)]
pub fn normalize_sheet(
    color: &RgbImage,
    params: &DetectorParams,
) -> Result<NormalizedSheet, GradeError> {
    let gray = color.to_gray();
    let blurred = gaussian_blur_5(&gray);
    let edges = detect_edges(&blurred, &params.edge);

    let mut contours = trace_external_contours(&edges);
    contours.sort_by(|a, b| b.enclosed_area().total_cmp(&a.enclosed_area()));

    let quad = contours.iter().find_map(|c| {
        let poly = approx_polygon(c, params.approx_eps_rel * c.perimeter());
        (poly.len() == 4).then_some(poly)
    });
    let Some(quad) = quad else {
        debug!(
            "no four-vertex boundary among {} edge contours",
            contours.len()
        );
        return Err(GradeError::Normalization);
    };

    let [tl, tr, br, bl] = order_quad(&quad);

    let out_w = dist(br, bl).max(dist(tr, tl)).round() as usize + 1;
    let out_h = dist(tr, br).max(dist(tl, bl)).round() as usize + 1;

    let sheet_pts = [
        Point2::new(0.0_f32, 0.0),
        Point2::new(out_w as f32 - 1.0, 0.0),
        Point2::new(out_w as f32 - 1.0, out_h as f32 - 1.0),
        Point2::new(0.0_f32, out_h as f32 - 1.0),
    ];
    let img_pts = [tl, tr, br, bl];

    let h_img_from_sheet =
        homography_from_4pt(&sheet_pts, &img_pts).ok_or(GradeError::Normalization)?;

    debug!("sheet boundary {img_pts:?} -> {out_w}x{out_h}");

    Ok(NormalizedSheet {
        color: warp_perspective_rgb(&color.view(), h_img_from_sheet, out_w, out_h),
        gray: warp_perspective_gray(&gray.view(), h_img_from_sheet, out_w, out_h),
    })
}

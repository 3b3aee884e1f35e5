//! Bubble candidate detection on the normalized sheet.

use crate::DetectorParams;
use log::debug;
use sheetgrade_core::{
    otsu_threshold, threshold_binary_inv, trace_external_contours, BinaryImage, Contour, GrayImage,
};

/// One candidate mark region: a traced contour with its bounding box.
#[derive(Clone, Debug)]
pub struct BubbleRegion {
    pub contour: Contour,
    pub aspect: f32,
}

impl BubbleRegion {
    #[inline]
    pub fn center_x(&self) -> f32 {
        self.contour.bbox.x as f32 + self.contour.bbox.width as f32 / 2.0
    }

    #[inline]
    pub fn center_y(&self) -> f32 {
        self.contour.bbox.y as f32 + self.contour.bbox.height as f32 / 2.0
    }
}

/// Binarize the normalized gray sheet (ink as foreground) and collect the
/// near-square blobs large enough to be bubbles.
///
/// Returns the thresholded raster alongside the candidates; mark scoring
/// must count ink on the very same raster. An empty candidate list is a
/// valid outcome and is reported as a grid error downstream.
pub fn detect_bubbles(
    gray: &GrayImage,
    params: &DetectorParams,
) -> (BinaryImage, Vec<BubbleRegion>) {
    let t = otsu_threshold(gray);
    let ink = threshold_binary_inv(gray, t);

    let contours = trace_external_contours(&ink);
    let total = contours.len();

    let min = params.min_bubble_size;
    let bubbles: Vec<BubbleRegion> = contours
        .into_iter()
        .filter_map(|contour| {
            let b = contour.bbox;
            if b.width < min || b.height < min {
                return None;
            }
            let aspect = b.width as f32 / b.height as f32;
            if aspect < params.aspect_min || aspect > params.aspect_max {
                return None;
            }
            Some(BubbleRegion { contour, aspect })
        })
        .collect();

    debug!(
        "otsu={t}: {} of {total} ink blobs pass the bubble filter",
        bubbles.len()
    );

    (ink, bubbles)
}

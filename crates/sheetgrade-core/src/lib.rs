//! Raster and geometry primitives for bubble-sheet grading.
//!
//! This crate is intentionally small and free of any concrete image
//! container dependency. It provides the building blocks the OMR pipeline
//! in `sheetgrade` composes: owned gray/RGB buffers with borrowed views,
//! 4-point homography estimation and perspective warping, Gaussian
//! smoothing, an edge detector, external contour tracing with polygon
//! approximation, and Otsu global thresholding.

mod contour;
mod edges;
mod filter;
mod homography;
mod image;
mod logger;
mod threshold;

pub use contour::{approx_polygon, trace_external_contours, BoundingBox, Contour};
pub use edges::{detect_edges, EdgeParams};
pub use filter::gaussian_blur_5;
pub use homography::{
    homography_from_4pt, warp_perspective_gray, warp_perspective_rgb, Homography,
};
pub use image::{
    sample_bilinear, sample_bilinear_u8, GrayImage, GrayImageView, RgbImage, RgbImageView,
};
pub use logger::init_with_level;
pub use threshold::{otsu_threshold, threshold_binary_inv, BinaryImage};

use crate::GradeError;
use serde::{Deserialize, Serialize};
use sheetgrade_core::EdgeParams;

pub const MIN_QUESTIONS: usize = 1;
pub const MAX_QUESTIONS: usize = 100;
pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 10;

/// Shape of the answer sheet: how many question rows and how many option
/// bubbles per row. Immutable once a pipeline is built around it.
///
/// Deliberately not deserializable: [`GradingConfig::new`] is the only
/// constructor, so an out-of-range shape cannot exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct GradingConfig {
    questions: usize,
    options: usize,
}

impl GradingConfig {
    /// Validate and build a configuration.
    ///
    /// `questions` must lie in 1..=100 and `options` in 2..=10.
    pub fn new(questions: usize, options: usize) -> Result<Self, GradeError> {
        if !(MIN_QUESTIONS..=MAX_QUESTIONS).contains(&questions)
            || !(MIN_OPTIONS..=MAX_OPTIONS).contains(&options)
        {
            return Err(GradeError::InvalidConfig { questions, options });
        }
        Ok(Self { questions, options })
    }

    #[inline]
    pub fn questions(&self) -> usize {
        self.questions
    }

    #[inline]
    pub fn options(&self) -> usize {
        self.options
    }
}

/// Tuned detection knobs.
///
/// The defaults mirror values calibrated on flatbed-quality captures. All
/// of them are starting points: aspect band, bubble size, row tolerance
/// and fill floor all depend on the printed form and the capture device,
/// and should be re-tuned empirically when either changes.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct DetectorParams {
    /// Minimum bubble bounding-box side in canonical pixels.
    pub min_bubble_size: u32,
    /// Lower bound of the accepted width/height ratio.
    pub aspect_min: f32,
    /// Upper bound of the accepted width/height ratio.
    pub aspect_max: f32,
    /// Vertical-center window for merging bubbles into one question row.
    pub row_tolerance: f32,
    /// Minimum interior ink count to accept a mark, as a fraction of the
    /// normalized sheet height.
    pub fill_floor_rel: f32,
    /// Hysteresis thresholds for document boundary edge detection.
    pub edge: EdgeParams,
    /// Polygon approximation tolerance as a fraction of contour perimeter.
    pub approx_eps_rel: f64,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            min_bubble_size: 20,
            aspect_min: 0.9,
            aspect_max: 1.1,
            row_tolerance: 10.0,
            fill_floor_rel: 0.1,
            edge: EdgeParams::default(),
            approx_eps_rel: 0.02,
        }
    }
}

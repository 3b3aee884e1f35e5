//! Grading state machine and result surface.
//!
//! The state machine from the design is enforced by construction rather
//! than by runtime flags: a [`SheetPipeline`] can only exist with a valid
//! configuration, and a [`Grader`] can only be obtained by successfully
//! processing an answer-key image. Re-configuring consumes the grader and
//! hands back a keyless pipeline, so a stale key can never leak across
//! configurations.

use crate::{assemble_grid, detect_bubbles, normalize_sheet, score_marks};
use crate::{DetectorParams, GradeError, GradingConfig};
use log::{debug, info};
use serde::Serialize;
use sheetgrade_core::RgbImage;

/// Decode JPEG/PNG bytes into the pipeline's raster type.
fn decode_rgb(bytes: &[u8]) -> Result<RgbImage, GradeError> {
    let img = image::load_from_memory(bytes)?.to_rgb8();
    Ok(RgbImage {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.into_raw(),
    })
}

/// A configured, keyless OMR pipeline.
///
/// Holds the immutable grading configuration and detector knobs; each call
/// to [`SheetPipeline::read_marks`] is a self-contained, synchronous run
/// over one image and shares no mutable state with concurrent runs.
#[derive(Clone, Debug)]
pub struct SheetPipeline {
    config: GradingConfig,
    params: DetectorParams,
}

impl SheetPipeline {
    pub fn new(config: GradingConfig) -> Self {
        Self {
            config,
            params: DetectorParams::default(),
        }
    }

    pub fn with_params(mut self, params: DetectorParams) -> Self {
        self.params = params;
        self
    }

    #[inline]
    pub fn config(&self) -> &GradingConfig {
        &self.config
    }

    /// Run the full pipeline on one encoded image: decode, rectify,
    /// detect bubbles, assemble the grid, score the marks.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "info", skip(self, bytes), fields(len = bytes.len()))
    )]
    pub fn read_marks(&self, bytes: &[u8]) -> Result<Vec<i32>, GradeError> {
        let color = decode_rgb(bytes)?;
        let sheet = normalize_sheet(&color, &self.params)?;
        let (ink, bubbles) = detect_bubbles(&sheet.gray, &self.params);
        let rows = assemble_grid(bubbles, &self.config, &self.params)?;
        let marks = score_marks(&ink, &rows, &self.params);
        debug!("scored {} rows", marks.len());
        Ok(marks)
    }

    /// Process the reference sheet and move into the keyed state.
    ///
    /// On failure the pipeline is untouched and remains awaiting a key.
    pub fn process_answer_key(&self, bytes: &[u8]) -> Result<Grader, GradeError> {
        let key = self.read_marks(bytes)?;
        info!("answer key set over {} questions", key.len());
        Ok(Grader {
            pipeline: self.clone(),
            key,
        })
    }
}

/// A pipeline with a stored answer key; the only state that can grade
/// submissions. All grading methods take `&self`, so submissions may be
/// graded from parallel workers; re-keying or re-configuring requires
/// exclusive ownership, which is the caller-side barrier the concurrency
/// contract demands.
#[derive(Clone, Debug)]
pub struct Grader {
    pipeline: SheetPipeline,
    key: Vec<i32>,
}

impl Grader {
    #[inline]
    pub fn answer_key(&self) -> &[i32] {
        &self.key
    }

    #[inline]
    pub fn config(&self) -> &GradingConfig {
        self.pipeline.config()
    }

    /// Grade one submission against the stored key.
    ///
    /// Comparison runs over the overlapping prefix of key and detected
    /// marks, so a shorter detected grid is partial-credit graded rather
    /// than rejected; `total_questions` then reflects the shorter length.
    pub fn evaluate(&self, bytes: &[u8]) -> Result<GradingOutcome, GradeError> {
        let marks = self.pipeline.read_marks(bytes)?;
        Ok(compare_marks(&self.key, marks))
    }

    /// Grade one submission into a tagged per-image report.
    pub fn report(&self, bytes: &[u8]) -> GradingReport {
        self.evaluate(bytes).into()
    }

    /// Grade a batch; one report per image, errors never abort the batch.
    pub fn grade_batch<'a, I>(&self, images: I) -> Vec<GradingReport>
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        images.into_iter().map(|bytes| self.report(bytes)).collect()
    }

    /// Explicitly drop the stored key and return a keyless pipeline for
    /// the new configuration. The caller must re-process a key image
    /// before grading again.
    pub fn reconfigure(self, config: GradingConfig) -> SheetPipeline {
        SheetPipeline {
            config,
            params: self.pipeline.params,
        }
    }
}

fn compare_marks(key: &[i32], marks: Vec<i32>) -> GradingOutcome {
    let graded = key.len().min(marks.len());
    let correct = key
        .iter()
        .zip(&marks)
        .take(graded)
        .filter(|(k, m)| k == m)
        .count();
    let score = if graded > 0 {
        100.0 * correct as f64 / graded as f64
    } else {
        0.0
    };

    GradingOutcome {
        total_questions: graded,
        correct_answers: correct,
        score,
        marked_answers: marks,
        answer_key: key.to_vec(),
    }
}

/// Successful grading of one submission.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GradingOutcome {
    /// Number of positions actually graded.
    pub total_questions: usize,
    pub correct_answers: usize,
    /// Percentage in 0.0..=100.0.
    pub score: f64,
    /// Detected option per row, `-1` for no mark.
    pub marked_answers: Vec<i32>,
    /// The stored key, `-1` for no mark.
    pub answer_key: Vec<i32>,
}

impl GradingOutcome {
    /// Per-question diff rows for the report/export layer.
    pub fn breakdown(&self) -> Vec<QuestionBreakdown> {
        self.marked_answers
            .iter()
            .zip(&self.answer_key)
            .enumerate()
            .map(|(i, (&student, &correct))| QuestionBreakdown {
                question: i + 1,
                student_answer: student,
                correct_answer: correct,
                is_correct: student == correct,
            })
            .collect()
    }
}

/// One row of the per-question export table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct QuestionBreakdown {
    /// 1-based question number.
    pub question: usize,
    pub student_answer: i32,
    pub correct_answer: i32,
    pub is_correct: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Success,
    Error,
}

/// Tagged per-image grading record, the unit of a batch result list.
#[derive(Clone, Debug, Serialize)]
pub struct GradingReport {
    pub status: ReportStatus,
    #[serde(flatten)]
    pub outcome: Option<GradingOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<Result<GradingOutcome, GradeError>> for GradingReport {
    fn from(res: Result<GradingOutcome, GradeError>) -> Self {
        match res {
            Ok(outcome) => Self {
                status: ReportStatus::Success,
                outcome: Some(outcome),
                message: None,
            },
            Err(err) => Self {
                status: ReportStatus::Error,
                outcome: None,
                message: Some(err.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NO_MARK;
    use approx::assert_abs_diff_eq;

    #[test]
    fn comparison_matches_worked_example() {
        let key = vec![0, 1, 2, 3, 0];
        let outcome = compare_marks(&key, vec![0, 1, 2, 3, 1]);
        assert_eq!(outcome.total_questions, 5);
        assert_eq!(outcome.correct_answers, 4);
        assert_abs_diff_eq!(outcome.score, 80.0, epsilon = 1e-9);
    }

    #[test]
    fn shorter_detection_grades_the_prefix() {
        let key = vec![0, 1, 2, 3, 0];
        let outcome = compare_marks(&key, vec![0, 2, 2]);
        assert_eq!(outcome.total_questions, 3);
        assert_eq!(outcome.correct_answers, 2);
        assert_eq!(outcome.answer_key.len(), 5);
    }

    #[test]
    fn no_mark_only_matches_no_mark() {
        let key = vec![NO_MARK, 1];
        let outcome = compare_marks(&key, vec![NO_MARK, NO_MARK]);
        assert_eq!(outcome.correct_answers, 1);
    }

    #[test]
    fn breakdown_zips_marks_and_key() {
        let outcome = compare_marks(&[0, 1], vec![0, 3]);
        let rows = outcome.breakdown();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].question, 1);
        assert!(rows[0].is_correct);
        assert_eq!(rows[1].student_answer, 3);
        assert!(!rows[1].is_correct);
    }

    #[test]
    fn error_report_serializes_with_message_only() {
        let report: GradingReport = Err::<GradingOutcome, _>(GradeError::Normalization).into();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "error");
        assert!(json.get("message").is_some());
        assert!(json.get("score").is_none());
    }

    #[test]
    fn success_report_flattens_outcome() {
        let report: GradingReport = Ok(compare_marks(&[0, 1], vec![0, 1])).into();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["total_questions"], 2);
        assert_eq!(json["score"], 100.0);
        assert!(json.get("message").is_none());
    }
}

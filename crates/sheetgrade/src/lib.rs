//! Optical-mark-recognition grading for photographed bubble sheets.
//!
//! The pipeline rectifies a photographed answer sheet onto a canonical
//! rectangle, binarizes it, clusters the detected bubbles into question
//! rows and decides the marked option per row; a [`Grader`] then diffs a
//! submission's marks against a stored answer key.
//!
//! ## Quickstart
//!
//! ```no_run
//! use sheetgrade::{GradingConfig, SheetPipeline};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let key_bytes = std::fs::read("key.jpg")?;
//! let sheet_bytes = std::fs::read("student.jpg")?;
//!
//! let pipeline = SheetPipeline::new(GradingConfig::new(20, 4)?);
//! let grader = pipeline.process_answer_key(&key_bytes)?;
//!
//! let outcome = grader.evaluate(&sheet_bytes)?;
//! println!("{}/{} -> {:.1}%", outcome.correct_answers, outcome.total_questions, outcome.score);
//! # Ok(())
//! # }
//! ```
//!
//! ## State machine
//!
//! `Unconfigured -> Configured -> KeySet` is modeled by types, not flags:
//! [`GradingConfig::new`] validates the shape, [`SheetPipeline`] is the
//! configured-but-keyless state, and [`SheetPipeline::process_answer_key`]
//! is the only way to obtain a [`Grader`]. [`Grader::reconfigure`]
//! consumes the grader and discards its key explicitly.

mod bubbles;
mod config;
mod error;
mod grader;
mod grid;
mod normalize;
mod score;

pub use bubbles::{detect_bubbles, BubbleRegion};
pub use config::{
    DetectorParams, GradingConfig, MAX_OPTIONS, MAX_QUESTIONS, MIN_OPTIONS, MIN_QUESTIONS,
};
pub use error::GradeError;
pub use grader::{
    Grader, GradingOutcome, GradingReport, QuestionBreakdown, ReportStatus, SheetPipeline,
};
pub use grid::{assemble_grid, QuestionRow};
pub use normalize::{normalize_sheet, NormalizedSheet};
pub use score::{score_marks, NO_MARK};

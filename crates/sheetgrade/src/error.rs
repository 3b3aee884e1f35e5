/// Errors produced while grading one image.
///
/// Every variant is recoverable at the call boundary: a failing image
/// yields its own error report and never poisons the configuration, the
/// stored answer key, or the rest of a batch.
#[derive(thiserror::Error, Debug)]
pub enum GradeError {
    #[error("invalid grading configuration (questions={questions}, options={options})")]
    InvalidConfig { questions: usize, options: usize },

    #[error("could not decode image bytes: {0}")]
    Decode(#[from] image::ImageError),

    #[error("could not detect a four-sided sheet boundary in the image")]
    Normalization,

    #[error("expected {expected} question rows but found only {found}")]
    Grid { expected: usize, found: usize },
}

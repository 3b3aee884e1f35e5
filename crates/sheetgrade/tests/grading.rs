//! End-to-end grading over synthetically rendered sheets.
//!
//! The renderer draws what the pipeline expects from a photographed form:
//! a dark document frame on a larger canvas, unmarked bubbles as thin
//! outlines and marked bubbles as filled disks, then encodes the canvas
//! as PNG so grading starts from raw bytes exactly like production input.

use approx::assert_abs_diff_eq;
use sheetgrade::{GradeError, GradingConfig, ReportStatus, SheetPipeline, NO_MARK};

const CANVAS_W: usize = 700;
const CANVAS_H: usize = 900;

// document frame outer bounds on the canvas, 3 px stroke
const FRAME_X0: usize = 50;
const FRAME_Y0: usize = 40;
const FRAME_X1: usize = 649;
const FRAME_Y1: usize = 839;

const QUESTIONS: usize = 5;
const OPTIONS: usize = 4;
const BUBBLE_R: f32 = 12.0;

struct Canvas {
    data: Vec<u8>, // interleaved RGB
}

impl Canvas {
    fn new() -> Self {
        Self {
            data: vec![255u8; CANVAS_W * CANVAS_H * 3],
        }
    }

    fn put(&mut self, x: usize, y: usize) {
        let i = (y * CANVAS_W + x) * 3;
        self.data[i] = 0;
        self.data[i + 1] = 0;
        self.data[i + 2] = 0;
    }

    fn frame(&mut self) {
        for t in 0..3 {
            for x in FRAME_X0..=FRAME_X1 {
                self.put(x, FRAME_Y0 + t);
                self.put(x, FRAME_Y1 - t);
            }
            for y in FRAME_Y0..=FRAME_Y1 {
                self.put(FRAME_X0 + t, y);
                self.put(FRAME_X1 - t, y);
            }
        }
    }

    fn disk(&mut self, cx: usize, cy: usize) {
        self.circle(cx, cy, |d| d <= BUBBLE_R);
    }

    fn ring(&mut self, cx: usize, cy: usize) {
        self.circle(cx, cy, |d| (d - BUBBLE_R).abs() <= 0.6);
    }

    fn circle(&mut self, cx: usize, cy: usize, pred: impl Fn(f32) -> bool) {
        let r = BUBBLE_R as i32 + 2;
        for dy in -r..=r {
            for dx in -r..=r {
                let d = ((dx * dx + dy * dy) as f32).sqrt();
                if pred(d) {
                    self.put(
                        (cx as i32 + dx) as usize,
                        (cy as i32 + dy) as usize,
                    );
                }
            }
        }
    }

    fn png(&self) -> Vec<u8> {
        let img = image::RgbImage::from_raw(CANVAS_W as u32, CANVAS_H as u32, self.data.clone())
            .expect("canvas buffer");
        let mut out = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
            .expect("png encode");
        out
    }
}

/// Render a sheet with the given per-row answers; `NO_MARK` leaves the
/// whole row unmarked.
fn render_sheet(answers: &[i32]) -> Vec<u8> {
    assert_eq!(answers.len(), QUESTIONS);
    let mut canvas = Canvas::new();
    canvas.frame();

    for (row, &answer) in answers.iter().enumerate() {
        let cy = FRAME_Y0 + 150 + row * 120;
        for opt in 0..OPTIONS {
            let cx = FRAME_X0 + 120 + opt * 120;
            if answer == opt as i32 {
                canvas.disk(cx, cy);
            } else {
                canvas.ring(cx, cy);
            }
        }
    }
    canvas.png()
}

fn pipeline() -> SheetPipeline {
    SheetPipeline::new(GradingConfig::new(QUESTIONS, OPTIONS).unwrap())
}

const KEY: [i32; QUESTIONS] = [0, 1, 2, 3, 0];

#[test]
fn key_grades_itself_perfectly() {
    let key_png = render_sheet(&KEY);
    let grader = pipeline().process_answer_key(&key_png).expect("key");

    assert_eq!(grader.answer_key(), &KEY);

    let outcome = grader.evaluate(&key_png).expect("self-grade");
    assert_eq!(outcome.total_questions, QUESTIONS);
    assert_eq!(outcome.correct_answers, QUESTIONS);
    assert_abs_diff_eq!(outcome.score, 100.0, epsilon = 1e-9);
    assert_eq!(outcome.marked_answers, KEY.to_vec());
}

#[test]
fn one_wrong_answer_scores_eighty() {
    let grader = pipeline()
        .process_answer_key(&render_sheet(&KEY))
        .expect("key");
    let outcome = grader
        .evaluate(&render_sheet(&[0, 1, 2, 3, 1]))
        .expect("grade");

    assert_eq!(outcome.total_questions, 5);
    assert_eq!(outcome.correct_answers, 4);
    assert_abs_diff_eq!(outcome.score, 80.0, epsilon = 1e-9);

    let breakdown = outcome.breakdown();
    assert!(breakdown[..4].iter().all(|b| b.is_correct));
    assert!(!breakdown[4].is_correct);
    assert_eq!(breakdown[4].student_answer, 1);
    assert_eq!(breakdown[4].correct_answer, 0);
}

#[test]
fn unmarked_row_reads_as_no_answer() {
    let grader = pipeline()
        .process_answer_key(&render_sheet(&KEY))
        .expect("key");
    let outcome = grader
        .evaluate(&render_sheet(&[0, 1, 2, 3, NO_MARK]))
        .expect("grade");

    assert_eq!(outcome.marked_answers[4], NO_MARK);
    assert_eq!(outcome.correct_answers, 4);
}

#[test]
fn malformed_bytes_fail_without_poisoning_the_grader() {
    let key_png = render_sheet(&KEY);
    let grader = pipeline().process_answer_key(&key_png).expect("key");

    let report = grader.report(b"definitely not an image");
    assert_eq!(report.status, ReportStatus::Error);
    assert!(report.outcome.is_none());
    assert!(report.message.is_some());

    // key and configuration are untouched
    let outcome = grader.evaluate(&key_png).expect("still grades");
    assert_abs_diff_eq!(outcome.score, 100.0, epsilon = 1e-9);
}

#[test]
fn evaluation_is_idempotent() {
    let grader = pipeline()
        .process_answer_key(&render_sheet(&KEY))
        .expect("key");
    let submission = render_sheet(&[3, 1, 0, 3, NO_MARK]);

    let first = grader.evaluate(&submission).expect("first");
    let second = grader.evaluate(&submission).expect("second");
    assert_eq!(first, second);
}

#[test]
fn missing_rows_surface_a_grid_error() {
    // ask for one more question than the sheet carries
    let pipeline = SheetPipeline::new(GradingConfig::new(QUESTIONS + 1, OPTIONS).unwrap());
    let err = pipeline
        .process_answer_key(&render_sheet(&KEY))
        .err()
        .expect("shortfall");
    match err {
        GradeError::Grid { expected, found } => {
            assert_eq!(expected, QUESTIONS + 1);
            assert_eq!(found, QUESTIONS);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn batch_grading_continues_past_failures() {
    let grader = pipeline()
        .process_answer_key(&render_sheet(&KEY))
        .expect("key");

    let good = render_sheet(&[0, 1, 2, 3, 0]);
    let bad = b"truncated".to_vec();
    let reports = grader.grade_batch([good.as_slice(), bad.as_slice()]);

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].status, ReportStatus::Success);
    assert_eq!(reports[1].status, ReportStatus::Error);
}

#[test]
fn reconfigure_discards_the_key() {
    let grader = pipeline()
        .process_answer_key(&render_sheet(&KEY))
        .expect("key");

    let keyless = grader.reconfigure(GradingConfig::new(QUESTIONS, OPTIONS).unwrap());
    // the keyless pipeline must re-process a key before grading
    let regraded = keyless
        .process_answer_key(&render_sheet(&[1, 1, 1, 1, 1]))
        .expect("new key");
    assert_eq!(regraded.answer_key(), &[1, 1, 1, 1, 1]);
}

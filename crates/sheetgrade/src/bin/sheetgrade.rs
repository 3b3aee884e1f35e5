//! Grade bubble sheets from the command line.
//!
//! ```text
//! sheetgrade --questions 20 --options 4 --key key.jpg sheet1.jpg sheet2.jpg
//! ```
//!
//! Prints one JSON grading report per submission.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use sheetgrade::{GradingConfig, SheetPipeline};

#[derive(Parser, Debug)]
#[command(name = "sheetgrade", about = "OMR bubble-sheet grading", version)]
struct Args {
    /// Number of question rows on the sheet (1-100).
    #[arg(long)]
    questions: usize,

    /// Number of option bubbles per row (2-10).
    #[arg(long)]
    options: usize,

    /// Answer-key sheet image (JPEG/PNG).
    #[arg(long)]
    key: PathBuf,

    /// Submission sheet images.
    #[arg(required = true)]
    submissions: Vec<PathBuf>,

    /// Also print the per-question breakdown for each submission.
    #[arg(long)]
    breakdown: bool,

    /// Log pipeline progress to stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    if args.verbose {
        sheetgrade_core::init_with_level(log::LevelFilter::Debug)?;
    }

    let config = GradingConfig::new(args.questions, args.options)?;
    let pipeline = SheetPipeline::new(config);

    let key_bytes = std::fs::read(&args.key)?;
    let grader = pipeline.process_answer_key(&key_bytes)?;

    for path in &args.submissions {
        let report = match std::fs::read(path) {
            Ok(bytes) => grader.report(&bytes),
            Err(e) => {
                eprintln!("{}: {e}", path.display());
                continue;
            }
        };
        println!("{}", serde_json::to_string(&report)?);
        if args.breakdown {
            if let Some(outcome) = &report.outcome {
                println!("{}", serde_json::to_string(&outcome.breakdown())?);
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("sheetgrade: {e}");
            ExitCode::FAILURE
        }
    }
}

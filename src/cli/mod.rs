// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses the command line with clap and hands each subcommand
// to its use case in Layer 2. Results are printed here and
// nowhere else.
//
//   1. `preprocess` — pages → deskewed pages → line images
//   2. `assemble`   — line images + transcripts → CTC batches
//   3. `evaluate`   — predictions vs ground truth → CER / WER
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{AssembleArgs, Commands, EvaluateArgs, PreprocessArgs};

#[derive(Parser, Debug)]
#[command(
    name = "exam-line-prep",
    version,
    about = "Deskew and segment handwritten exam pages, assemble CTC training batches, score transcriptions."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Preprocess(args) => run_preprocess(args),
            Commands::Assemble(args)   => run_assemble(args),
            Commands::Evaluate(args)   => run_evaluate(args),
        }
    }
}

fn run_preprocess(args: PreprocessArgs) -> Result<()> {
    use crate::application::preprocess_use_case::PreprocessUseCase;

    let report = PreprocessUseCase::new(args.into()).execute()?;
    println!(
        "Preprocessed {} pages ({} skipped, {} without lines): {} line images.",
        report.pages, report.failed, report.without_lines, report.lines
    );
    Ok(())
}

fn run_assemble(args: AssembleArgs) -> Result<()> {
    use crate::application::assemble_use_case::AssembleUseCase;

    let manifest = AssembleUseCase::new(args.into()).execute()?;
    println!(
        "Assembled {} train / {} validation samples ({} dropped, {} skipped), vocabulary size {}.",
        manifest.train_samples,
        manifest.val_samples,
        manifest.report.dropped_total(),
        manifest.skipped_samples,
        manifest.vocabulary_size,
    );
    if manifest.infeasible_labels > 0 {
        println!(
            "{} labels are longer than the target width of {}.",
            manifest.infeasible_labels, manifest.config.target_width
        );
    }
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    use crate::application::evaluate_use_case::EvaluateUseCase;

    let corpus = EvaluateUseCase::new(args.into()).execute()?;
    println!(
        "Scored {} documents ({} without prediction, {} unreadable): CER {:.4}, WER {:.4}",
        corpus.documents.len(), corpus.skipped, corpus.unreadable, corpus.mean.cer, corpus.mean.wer
    );
    Ok(())
}

// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with `clap`.
// All work is delegated to Layer 2 (application).
//
//   1. `freeze`  — freeze a stratified train/val split
//   2. `check`   — print the sanity report as JSON
//   3. `batches` — build both loaders and run one pass each
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use burn::backend::NdArray;
use clap::Parser;
use commands::{BatchesArgs, CheckArgs, Commands, FreezeArgs};

#[derive(Parser, Debug)]
#[command(
    name = "text-cls-data",
    version = "0.1.0",
    about = "Freeze, check and batch text classification datasets."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Freeze(args)  => run_freeze(args),
            Commands::Check(args)   => run_check(args),
            Commands::Batches(args) => run_batches(args),
        }
    }
}

fn run_freeze(args: FreezeArgs) -> Result<()> {
    use crate::application::freeze_use_case::FreezeUseCase;

    let cfg       = args.resolve()?;
    let partition = FreezeUseCase::new(cfg.clone()).execute()?;

    println!(
        "Split frozen: {} train, {} val -> {}",
        partition.train().len(),
        partition.val().len(),
        cfg.split_json.display()
    );
    Ok(())
}

fn run_check(mut args: CheckArgs) -> Result<()> {
    use crate::application::check_use_case::CheckUseCase;

    let cfg    = args.resolve()?;
    let report = CheckUseCase::new(cfg).execute()?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if args.strict && !report.ok {
        anyhow::bail!("Sanity check failed");
    }
    Ok(())
}

fn run_batches(args: BatchesArgs) -> Result<()> {
    use crate::application::loader_use_case::{build_loaders, summarize_pass};

    let cfg    = args.resolve()?;
    let device = Default::default();
    let (encoder, train, val) = build_loaders::<NdArray>(&cfg, &device)?;

    println!(
        "Encoder: max_length={}, padding={:?}, pad_id={}",
        encoder.max_length(),
        encoder.padding(),
        encoder.pad_id()
    );
    for (name, loader) in [("train", &train), ("val", &val)] {
        let pass = summarize_pass(loader)?;
        println!(
            "{name}: {} samples in {} batches, first batch shape {:?}",
            pass.samples, pass.batches, pass.first_shape
        );
    }
    Ok(())
}

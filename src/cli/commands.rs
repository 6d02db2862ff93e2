// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Three subcommands: `freeze`, `check` and `batches`.
//
// Every subcommand accepts --config <json>. Values are layered:
//   PrepConfig::default()  <  config file  <  explicit flags
// so flags are all Option and only override when given.
//
// Reference: Rust Book §12 (Building a CLI Program)

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Args, Subcommand, ValueEnum};

use crate::application::prep_config::PrepConfig;
use crate::domain::traits::PaddingPolicy;
use crate::infra::config_store::load_config;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Freeze a stratified train/validation split of a CSV table
    Freeze(FreezeArgs),

    /// Sanity check a table against its frozen split
    Check(CheckArgs),

    /// Build the train/validation loaders and run one pass of each
    Batches(BatchesArgs),
}

/// Shared by every subcommand.
#[derive(Args, Debug, Default)]
pub struct ConfigArg {
    /// JSON file with a saved preparation config
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl ConfigArg {
    pub fn base(&self) -> Result<PrepConfig> {
        match &self.config {
            Some(path) => load_config(path),
            None => Ok(PrepConfig::default()),
        }
    }
}

#[derive(Args, Debug)]
pub struct FreezeArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    /// Raw CSV with label, title and description columns
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Where the split record (JSON) is written
    #[arg(long)]
    pub split_json: Option<PathBuf>,

    /// Directory for train.csv and val.csv
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long)]
    pub train_ratio: Option<f64>,

    #[arg(long)]
    pub val_ratio: Option<f64>,

    /// Column the split is stratified on
    #[arg(long)]
    pub label_field: Option<String>,
}

impl FreezeArgs {
    pub fn resolve(self) -> Result<PrepConfig> {
        let mut cfg = self.config.base()?;
        override_with(&mut cfg.input_csv, self.input);
        override_with(&mut cfg.split_json, self.split_json);
        override_with(&mut cfg.processed_dir, self.out_dir);
        override_with(&mut cfg.seed, self.seed);
        override_with(&mut cfg.train_ratio, self.train_ratio);
        override_with(&mut cfg.val_ratio, self.val_ratio);
        override_with(&mut cfg.label_field, self.label_field);
        Ok(cfg)
    }
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    #[arg(long)]
    pub input: Option<PathBuf>,

    #[arg(long)]
    pub split_json: Option<PathBuf>,

    /// Exit with an error when the report is not ok
    #[arg(long)]
    pub strict: bool,
}

impl CheckArgs {
    pub fn resolve(&mut self) -> Result<PrepConfig> {
        let mut cfg = self.config.base()?;
        override_with(&mut cfg.input_csv, self.input.take());
        override_with(&mut cfg.split_json, self.split_json.take());
        Ok(cfg)
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum PaddingArg {
    MaxLength,
    Longest,
}

impl From<PaddingArg> for PaddingPolicy {
    fn from(p: PaddingArg) -> Self {
        match p {
            PaddingArg::MaxLength => PaddingPolicy::MaxLength,
            PaddingArg::Longest   => PaddingPolicy::Longest,
        }
    }
}

#[derive(Args, Debug)]
pub struct BatchesArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    #[arg(long)]
    pub train_csv: Option<PathBuf>,

    #[arg(long)]
    pub val_csv: Option<PathBuf>,

    /// tokenizer.json path, directory, or hub name
    #[arg(long)]
    pub tokenizer: Option<String>,

    #[arg(long)]
    pub max_length: Option<usize>,

    #[arg(long, value_enum)]
    pub padding: Option<PaddingArg>,

    #[arg(long)]
    pub batch_size: Option<usize>,

    #[arg(long)]
    pub num_workers: Option<usize>,

    /// Comma-separated columns joined into the text
    #[arg(long, value_delimiter = ',')]
    pub text_fields: Option<Vec<String>>,

    /// Case-fold the text (true/false)
    #[arg(long, action = ArgAction::Set)]
    pub lowercase: Option<bool>,
}

impl BatchesArgs {
    pub fn resolve(self) -> Result<PrepConfig> {
        let mut cfg = self.config.base()?;
        override_with(&mut cfg.train_csv, self.train_csv);
        override_with(&mut cfg.val_csv, self.val_csv);
        if self.tokenizer.is_some() {
            cfg.tokenizer = self.tokenizer;
        }
        override_with(&mut cfg.max_length, self.max_length);
        override_with(&mut cfg.padding, self.padding.map(PaddingPolicy::from));
        override_with(&mut cfg.batch_size, self.batch_size);
        override_with(&mut cfg.num_workers, self.num_workers);
        override_with(&mut cfg.text_fields, self.text_fields);
        override_with(&mut cfg.lowercase, self.lowercase);
        Ok(cfg)
    }
}

fn override_with<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::infra::config_store::save_config;
    use clap::Parser;

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "text-cls-data", "freeze", "--input", "in.csv", "--seed", "7", "--val-ratio", "0.2",
            "--train-ratio", "0.8",
        ])
        .unwrap();
        let Commands::Freeze(args) = cli.command else { panic!("expected freeze") };
        let cfg = args.resolve().unwrap();
        assert_eq!(cfg.input_csv, PathBuf::from("in.csv"));
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.val_ratio, 0.2);
        assert_eq!(cfg.label_field, "label");
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        save_config(&PrepConfig { batch_size: 8, max_length: 64, ..PrepConfig::default() }, &path).unwrap();

        let cli = Cli::try_parse_from([
            "text-cls-data", "batches", "--config", path.to_str().unwrap(), "--max-length", "16",
            "--padding", "longest", "--text-fields", "title",
        ])
        .unwrap();
        let Commands::Batches(args) = cli.command else { panic!("expected batches") };
        let cfg = args.resolve().unwrap();
        assert_eq!(cfg.batch_size, 8);
        assert_eq!(cfg.max_length, 16);
        assert_eq!(cfg.padding, PaddingPolicy::Longest);
        assert_eq!(cfg.text_fields, vec!["title"]);
    }

    #[test]
    fn test_lowercase_flag_can_turn_off_config_value() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        save_config(&PrepConfig { lowercase: true, ..PrepConfig::default() }, &path).unwrap();

        let parse = |extra: &[&str]| {
            let mut argv = vec!["text-cls-data", "batches", "--config", path.to_str().unwrap()];
            argv.extend_from_slice(extra);
            let Commands::Batches(args) = Cli::try_parse_from(argv).unwrap().command else {
                panic!("expected batches")
            };
            args.resolve().unwrap().lowercase
        };
        assert!(parse(&[]));
        assert!(!parse(&["--lowercase", "false"]));
        assert!(parse(&["--lowercase", "true"]));
    }

    #[test]
    fn test_check_strict_flag() {
        let cli = Cli::try_parse_from(["text-cls-data", "check", "--strict"]).unwrap();
        let Commands::Check(args) = cli.command else { panic!("expected check") };
        assert!(args.strict);
    }
}

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "opmerge",
    about = "opmerge — collapse operation logs with merge rules",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Reduce an operation log under a rulebook
    Reduce(ReduceArgs),
    /// Validate a rulebook and list its rules by priority
    Rules(RulesArgs),
}

/// When rules are installed relative to the log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ReduceMode {
    /// Install rules first, then enqueue each operation.
    Cascade,
    /// Seed the queue with the whole log, then install rules.
    Batch,
}

#[derive(Args)]
pub struct ReduceArgs {
    /// JSON-lines operation log
    pub ops: PathBuf,
    /// TOML rulebook
    #[arg(short, long)]
    pub rules: PathBuf,
    #[arg(long, default_value = "cascade")]
    pub mode: ReduceMode,
}

#[derive(Args)]
pub struct RulesArgs {
    /// TOML rulebook
    #[arg(short, long)]
    pub rules: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reduce() {
        let cli = Cli::try_parse_from(["opmerge", "reduce", "--rules", "r.toml", "ops.jsonl"]).unwrap();
        if let Command::Reduce(args) = cli.command {
            assert_eq!(args.rules, PathBuf::from("r.toml"));
            assert_eq!(args.ops, PathBuf::from("ops.jsonl"));
            assert_eq!(args.mode, ReduceMode::Cascade);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_reduce_batch() {
        let cli = Cli::try_parse_from(["opmerge", "reduce", "-r", "r.toml", "--mode", "batch", "ops.jsonl"]).unwrap();
        if let Command::Reduce(args) = cli.command {
            assert_eq!(args.mode, ReduceMode::Batch);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn reduce_requires_rules() {
        assert!(Cli::try_parse_from(["opmerge", "reduce", "ops.jsonl"]).is_err());
    }

    #[test]
    fn parse_rules() {
        let cli = Cli::try_parse_from(["opmerge", "rules", "--rules", "r.toml"]).unwrap();
        assert!(matches!(cli.command, Command::Rules(_)));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["opmerge", "--verbose", "rules", "-r", "r.toml"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn parse_json_format() {
        let cli = Cli::try_parse_from(["opmerge", "--format", "json", "rules", "-r", "r.toml"]).unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
    }
}

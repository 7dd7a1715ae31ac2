use std::collections::HashMap;

use colored::Colorize;
use serde_json::{json, Value};
use tracing::info;

use opmerge_queue::MergeQueue;
use opmerge_rules::RuleKey;

use crate::cli::*;
use crate::oplog;
use crate::rulebook::{RuleConfig, Rulebook};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Reduce(args) => cmd_reduce(&args, &cli.format),
        Command::Rules(args) => cmd_rules(&args, &cli.format),
    }
}

/// A reduced log plus how many operations went into it.
pub struct Reduction {
    pub queue: MergeQueue<Value>,
    pub received: usize,
}

pub fn reduce(args: &ReduceArgs) -> anyhow::Result<Reduction> {
    let rulebook = Rulebook::load(&args.rules)?;
    let ops = oplog::load(&args.ops)?;
    let received = ops.len();

    let queue = match args.mode {
        ReduceMode::Cascade => {
            let mut queue = MergeQueue::new();
            rulebook.install(&mut queue);
            for entry in ops {
                let (op, payload) = entry.into_parts();
                queue.enqueue(op, payload);
            }
            queue
        }
        ReduceMode::Batch => {
            let mut queue = MergeQueue::with_entries(ops);
            rulebook.install(&mut queue);
            queue
        }
    };

    info!(mode = ?args.mode, received, remaining = queue.len(), "operation log reduced");
    Ok(Reduction { queue, received })
}

fn cmd_reduce(args: &ReduceArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let Reduction { queue, received } = reduce(args)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&queue.to_vec())?),
        OutputFormat::Text => {
            let rendered = queue.render()?;
            if !rendered.is_empty() {
                println!("{rendered}");
            }
            eprintln!(
                "{} {} operations reduced to {} entries",
                "✓".green().bold(),
                received,
                queue.len().to_string().bold()
            );
        }
    }
    Ok(())
}

fn cmd_rules(args: &RulesArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let rulebook = Rulebook::load(&args.rules)?;
    let mut queue = MergeQueue::new();
    rulebook.install(&mut queue);

    let by_key: HashMap<RuleKey, &RuleConfig> =
        rulebook.rules.iter().map(|rule| (rule.key(), rule)).collect();
    let ordered: Vec<(RuleKey, &RuleConfig)> = queue
        .rules()
        .keys()
        .into_iter()
        .filter_map(|key| by_key.get(&key).map(|rule| (key, *rule)))
        .collect();

    match format {
        OutputFormat::Json => {
            let listing: Vec<Value> = ordered
                .iter()
                .map(|(key, rule)| {
                    json!({
                        "leading": rule.leading,
                        "trailing": rule.trailing,
                        "tier": key.tier().to_string(),
                        "strategy": rule.strategy,
                        "emit": rule.emit,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        OutputFormat::Text => {
            if ordered.is_empty() {
                println!("No rules.");
            }
            for (key, rule) in &ordered {
                let emit = rule
                    .emit
                    .as_deref()
                    .map(|op| format!(" → {}", op.yellow()))
                    .unwrap_or_default();
                println!(
                    "{}  {}  {}{}",
                    key.tier().to_string().cyan(),
                    key.to_string().bold(),
                    rule.strategy,
                    emit
                );
            }
        }
    }
    Ok(())
}

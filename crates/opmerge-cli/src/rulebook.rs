//! TOML rulebooks: declarative merge rules over JSON payloads.
//!
//! ```toml
//! [[rule]]
//! leading = "add"
//! trailing = "update"
//! strategy = "merge-objects"
//! emit = "add"
//! ```
//!
//! `"*"` on either side is the wildcard pattern.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use opmerge_queue::MergeQueue;
use opmerge_rules::{Entry, Merger, OpId, OpPattern, RuleKey};

use crate::error::{InputError, InputResult};

/// The token that stands for [`OpPattern::Any`] in rulebooks.
pub const WILDCARD: &str = "*";

/// How a rule combines two JSON payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Both entries vanish.
    Annihilate,
    /// Keep the older payload.
    KeepLeading,
    /// Keep the newer payload.
    KeepTrailing,
    /// Shallow object merge; keys from the newer payload win.
    MergeObjects,
    /// Numeric addition.
    Sum,
}

impl Strategy {
    /// Combine two payloads. `None` means the pair annihilates.
    pub fn combine(self, leading: &Value, trailing: &Value) -> Option<Value> {
        match self {
            Self::Annihilate => None,
            Self::KeepLeading => Some(leading.clone()),
            Self::KeepTrailing => Some(trailing.clone()),
            Self::MergeObjects => Some(merge_objects(leading, trailing)),
            Self::Sum => Some(sum(leading, trailing)),
        }
    }

    /// Returns `true` if the strategy produces an entry.
    pub fn emits(self) -> bool {
        !matches!(self, Self::Annihilate)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Annihilate => "annihilate",
            Self::KeepLeading => "keep-leading",
            Self::KeepTrailing => "keep-trailing",
            Self::MergeObjects => "merge-objects",
            Self::Sum => "sum",
        };
        f.write_str(name)
    }
}

fn merge_objects(leading: &Value, trailing: &Value) -> Value {
    match (leading, trailing) {
        (Value::Object(base), Value::Object(overlay)) => {
            let mut merged: Map<String, Value> = base.clone();
            for (key, value) in overlay {
                merged.insert(key.clone(), value.clone());
            }
            Value::Object(merged)
        }
        _ => trailing.clone(),
    }
}

fn sum(leading: &Value, trailing: &Value) -> Value {
    if let (Some(a), Some(b)) = (as_int(leading), as_int(trailing)) {
        if let Some(total) = a.checked_add(b) {
            return Value::from(total);
        }
    }
    let a = leading.as_f64().unwrap_or(0.0);
    let b = trailing.as_f64().unwrap_or(0.0);
    Value::from(a + b)
}

// Non-numbers count as integer zero.
fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        _ => Some(0),
    }
}

/// One `[[rule]]` table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Op id of the older entry, or `"*"`.
    pub leading: String,
    /// Op id of the newer entry, or `"*"`.
    pub trailing: String,
    /// How the payloads combine.
    pub strategy: Strategy,
    /// Op id of the merged entry. Required unless the strategy annihilates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emit: Option<String>,
}

impl RuleConfig {
    /// The registry key this rule is installed under.
    pub fn key(&self) -> RuleKey {
        RuleKey::new(pattern(&self.leading), pattern(&self.trailing))
    }

    /// Build the merge function for this rule.
    pub fn merger(&self) -> impl Merger<Value> + 'static {
        let strategy = self.strategy;
        let emit = self.emit.as_deref().map(OpId::from);
        move |leading: &Value, trailing: &Value| -> Option<Entry<Value>> {
            let payload = strategy.combine(leading, trailing)?;
            Some(Entry {
                op: emit.clone()?,
                payload,
            })
        }
    }
}

/// Parse one side of a rule key.
pub fn pattern(raw: &str) -> OpPattern {
    if raw == WILDCARD {
        OpPattern::Any
    } else {
        OpPattern::from(raw)
    }
}

/// A set of merge rules loaded from TOML.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rulebook {
    /// Rules in file order.
    #[serde(default, rename = "rule")]
    pub rules: Vec<RuleConfig>,
}

impl Rulebook {
    /// Parse and validate a rulebook from TOML text.
    pub fn parse(text: &str) -> InputResult<Self> {
        let rulebook: Self = toml::from_str(text)?;
        rulebook.validate()?;
        Ok(rulebook)
    }

    /// Read, parse, and validate a rulebook file.
    pub fn load(path: &Path) -> InputResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| InputError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Check that every rule can be installed unambiguously.
    pub fn validate(&self) -> InputResult<()> {
        let mut seen = HashSet::new();
        for rule in &self.rules {
            for side in [&rule.leading, &rule.trailing] {
                if side.is_empty() {
                    return Err(InputError::invalid(
                        format!("rule ({}, {})", rule.leading, rule.trailing),
                        "op ids must not be empty",
                    ));
                }
            }
            if !seen.insert(rule.key()) {
                return Err(InputError::DuplicateRule {
                    leading: rule.leading.clone(),
                    trailing: rule.trailing.clone(),
                });
            }
            match rule.emit.as_deref() {
                None if rule.strategy.emits() => {
                    return Err(InputError::MissingEmit {
                        leading: rule.leading.clone(),
                        trailing: rule.trailing.clone(),
                        strategy: rule.strategy.to_string(),
                    });
                }
                Some(op) if op == WILDCARD || op.is_empty() => {
                    return Err(InputError::invalid(
                        format!("rule ({}, {})", rule.leading, rule.trailing),
                        format!("cannot emit {op:?}"),
                    ));
                }
                Some(_) if !rule.strategy.emits() => {
                    tracing::warn!(
                        leading = %rule.leading,
                        trailing = %rule.trailing,
                        "`emit` is ignored for annihilating rules"
                    );
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Install every rule into `queue`, in file order.
    ///
    /// Each installation fully reduces the queue under the rules installed
    /// so far.
    pub fn install(&self, queue: &mut MergeQueue<Value>) {
        for rule in &self.rules {
            let key = rule.key();
            queue.add_merge_rule(key.leading, key.trailing, rule.merger());
        }
    }
}

//! The rule registry and its specificity ranking.
//!
//! [`RuleRegistry`] keeps one storage tier per resolution rank, so lookup is
//! a fixed sequence of at most four map probes and the ranking is exhaustive
//! by construction:
//!
//! | tier | key | storage |
//! |---|---|---|
//! | [`RuleTier::Exact`] | `(a, b)` | nested map `a -> b -> rule` |
//! | [`RuleTier::LeadingAnchored`] | `(a, *)` | map keyed by `a` |
//! | [`RuleTier::TrailingAnchored`] | `(*, b)` | map keyed by `b` |
//! | [`RuleTier::CatchAll`] | `(*, *)` | single optional slot |

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::merger::Merger;
use crate::types::{OpId, OpPattern, RuleKey};

type BoxedMerger<T> = Box<dyn Merger<T>>;

/// The rank at which [`RuleRegistry::resolve`] found a rule.
///
/// Variants are declared in resolution order; lower compares as more
/// specific.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuleTier {
    /// `(leading, trailing)`: both sides named.
    Exact,
    /// `(leading, *)`: anchored on the older entry.
    LeadingAnchored,
    /// `(*, trailing)`: anchored on the newer entry.
    TrailingAnchored,
    /// `(*, *)`: matches every pair.
    CatchAll,
}

impl fmt::Display for RuleTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Exact => "exact",
            Self::LeadingAnchored => "leading-anchored",
            Self::TrailingAnchored => "trailing-anchored",
            Self::CatchAll => "catch-all",
        };
        f.write_str(name)
    }
}

impl RuleKey {
    /// The tier a rule stored under this key resolves at.
    pub fn tier(&self) -> RuleTier {
        match (self.leading.is_any(), self.trailing.is_any()) {
            (false, false) => RuleTier::Exact,
            (false, true) => RuleTier::LeadingAnchored,
            (true, false) => RuleTier::TrailingAnchored,
            (true, true) => RuleTier::CatchAll,
        }
    }
}

/// A rule selected by [`RuleRegistry::resolve`].
pub struct Resolved<'a, T> {
    /// The tier the rule was found at.
    pub tier: RuleTier,
    /// The merge function to apply.
    pub merger: &'a dyn Merger<T>,
}

impl<T> fmt::Debug for Resolved<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolved")
            .field("tier", &self.tier)
            .finish_non_exhaustive()
    }
}

/// Merge rules keyed by `(leading, trailing)` pattern pairs.
///
/// The registry is a pure lookup table: it never inspects a queue and keeps
/// no record of which rule produced which entry.
pub struct RuleRegistry<T> {
    exact: HashMap<OpId, HashMap<OpId, BoxedMerger<T>>>,
    leading: HashMap<OpId, BoxedMerger<T>>,
    trailing: HashMap<OpId, BoxedMerger<T>>,
    catch_all: Option<BoxedMerger<T>>,
}

impl<T> RuleRegistry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            exact: HashMap::new(),
            leading: HashMap::new(),
            trailing: HashMap::new(),
            catch_all: None,
        }
    }

    /// Install `merger` under `key`, overwriting any rule in that slot.
    ///
    /// Returns `true` if a previous rule was replaced.
    pub fn set(&mut self, key: RuleKey, merger: impl Merger<T> + 'static) -> bool {
        let boxed: BoxedMerger<T> = Box::new(merger);
        let replaced = match (&key.leading, &key.trailing) {
            (OpPattern::Exact(a), OpPattern::Exact(b)) => self
                .exact
                .entry(a.clone())
                .or_default()
                .insert(b.clone(), boxed)
                .is_some(),
            (OpPattern::Exact(a), OpPattern::Any) => {
                self.leading.insert(a.clone(), boxed).is_some()
            }
            (OpPattern::Any, OpPattern::Exact(b)) => {
                self.trailing.insert(b.clone(), boxed).is_some()
            }
            (OpPattern::Any, OpPattern::Any) => self.catch_all.replace(boxed).is_some(),
        };
        debug!(rule = %key, replaced, "merge rule installed");
        replaced
    }

    /// Delete the rule in exactly the `key` slot.
    ///
    /// Returns `true` if a rule was present. Other slots that would also
    /// match the same pairs are left alone.
    pub fn remove(&mut self, key: &RuleKey) -> bool {
        let removed = match (&key.leading, &key.trailing) {
            (OpPattern::Exact(a), OpPattern::Exact(b)) => {
                let Some(inner) = self.exact.get_mut(a) else {
                    return false;
                };
                let removed = inner.remove(b).is_some();
                if inner.is_empty() {
                    self.exact.remove(a);
                }
                removed
            }
            (OpPattern::Exact(a), OpPattern::Any) => self.leading.remove(a).is_some(),
            (OpPattern::Any, OpPattern::Exact(b)) => self.trailing.remove(b).is_some(),
            (OpPattern::Any, OpPattern::Any) => self.catch_all.take().is_some(),
        };
        if removed {
            debug!(rule = %key, "merge rule removed");
        }
        removed
    }

    /// Find the single rule that applies to a concrete `(leading, trailing)`
    /// pair.
    ///
    /// First match wins: exact pair, `(leading, *)`, `(*, trailing)`,
    /// `(*, *)`. Rules are never combined.
    pub fn resolve(&self, leading: &OpId, trailing: &OpId) -> Option<Resolved<'_, T>> {
        if let Some(merger) = self.exact.get(leading).and_then(|inner| inner.get(trailing)) {
            return Some(Resolved {
                tier: RuleTier::Exact,
                merger: merger.as_ref(),
            });
        }
        if let Some(merger) = self.leading.get(leading) {
            return Some(Resolved {
                tier: RuleTier::LeadingAnchored,
                merger: merger.as_ref(),
            });
        }
        if let Some(merger) = self.trailing.get(trailing) {
            return Some(Resolved {
                tier: RuleTier::TrailingAnchored,
                merger: merger.as_ref(),
            });
        }
        self.catch_all.as_deref().map(|merger| Resolved {
            tier: RuleTier::CatchAll,
            merger,
        })
    }

    /// Returns `true` if a rule occupies exactly the `key` slot.
    pub fn contains(&self, key: &RuleKey) -> bool {
        match (&key.leading, &key.trailing) {
            (OpPattern::Exact(a), OpPattern::Exact(b)) => self
                .exact
                .get(a)
                .is_some_and(|inner| inner.contains_key(b)),
            (OpPattern::Exact(a), OpPattern::Any) => self.leading.contains_key(a),
            (OpPattern::Any, OpPattern::Exact(b)) => self.trailing.contains_key(b),
            (OpPattern::Any, OpPattern::Any) => self.catch_all.is_some(),
        }
    }

    /// Total number of installed rules.
    pub fn len(&self) -> usize {
        let exact: usize = self.exact.values().map(HashMap::len).sum();
        exact + self.leading.len() + self.trailing.len() + usize::from(self.catch_all.is_some())
    }

    /// Returns `true` if no rules are installed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every rule.
    pub fn clear(&mut self) {
        self.exact.clear();
        self.leading.clear();
        self.trailing.clear();
        self.catch_all = None;
        debug!("merge rules cleared");
    }

    /// Every installed key, in resolution-tier order and sorted by id
    /// within a tier.
    pub fn keys(&self) -> Vec<RuleKey> {
        let mut exact: Vec<(&OpId, &OpId)> = self
            .exact
            .iter()
            .flat_map(|(a, inner)| inner.keys().map(move |b| (a, b)))
            .collect();
        exact.sort();

        let mut leading: Vec<&OpId> = self.leading.keys().collect();
        leading.sort();
        let mut trailing: Vec<&OpId> = self.trailing.keys().collect();
        trailing.sort();

        let mut keys = Vec::with_capacity(self.len());
        keys.extend(exact.into_iter().map(|(a, b)| RuleKey::new(a, b)));
        keys.extend(leading.into_iter().map(|a| RuleKey::new(a, OpPattern::Any)));
        keys.extend(trailing.into_iter().map(|b| RuleKey::new(OpPattern::Any, b)));
        if self.catch_all.is_some() {
            keys.push(RuleKey::new(OpPattern::Any, OpPattern::Any));
        }
        keys
    }
}

impl<T> Default for RuleRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for RuleRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<String> = self.keys().iter().map(ToString::to_string).collect();
        f.debug_struct("RuleRegistry").field("rules", &keys).finish()
    }
}

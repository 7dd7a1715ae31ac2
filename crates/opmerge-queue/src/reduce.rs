//! Reduction: the pairwise merge primitive and the two rescan strategies.
//!
//! Both strategies drive the same primitive, `try_merge_at`,
//! and differ only in where they apply it:
//!
//! - **Tail cascade** keeps merging the last two entries until no rule
//!   applies. It never revisits earlier pairs.
//! - **Full reduction** walks left to right, retrying each index until it
//!   stops merging before moving on. It does not step back after a merge,
//!   so a replacement entry is only checked against its right-hand
//!   neighbour.

use tracing::debug;

use opmerge_rules::RuleTier;

use crate::queue::MergeQueue;

/// The result of one pairwise merge attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MergeStep {
    /// No pair at the index, or no rule for it. Nothing changed.
    Unmatched,
    /// The pair was replaced by the merger's entry.
    Replaced(RuleTier),
    /// The merger returned nothing and both entries were removed.
    Annihilated(RuleTier),
}

impl MergeStep {
    pub(crate) fn is_merged(self) -> bool {
        !matches!(self, Self::Unmatched)
    }
}

impl<T> MergeQueue<T> {
    /// Merge the entries at `index` and `index + 1` if a rule applies.
    ///
    /// The merger runs before anything is removed, so a panicking merger
    /// leaves the queue as it was.
    pub(crate) fn try_merge_at(&mut self, index: usize) -> MergeStep {
        let (Some(leading), Some(trailing)) = (self.entries.get(index), self.entries.get(index + 1))
        else {
            return MergeStep::Unmatched;
        };
        let Some(rule) = self.rules.resolve(&leading.op, &trailing.op) else {
            return MergeStep::Unmatched;
        };

        let tier = rule.tier;
        let merged = rule.merger.merge(&leading.payload, &trailing.payload);
        debug!(
            index,
            leading = %leading.op,
            trailing = %trailing.op,
            %tier,
            into = merged.as_ref().map_or("-", |entry| entry.op.as_str()),
            "merged pair"
        );

        match merged {
            Some(entry) => {
                self.entries.remove(index + 1);
                self.entries[index] = entry;
                MergeStep::Replaced(tier)
            }
            None => {
                self.entries.drain(index..index + 2);
                MergeStep::Annihilated(tier)
            }
        }
    }

    /// Collapse the newest entries into each other for as long as a rule
    /// applies. Returns the number of merges performed.
    pub(crate) fn cascade_tail(&mut self) -> usize {
        let mut merges = 0;
        while self.entries.len() >= 2 {
            let tail = self.entries.len() - 2;
            if !self.try_merge_at(tail).is_merged() {
                break;
            }
            merges += 1;
        }
        if merges > 0 {
            debug!(merges, len = self.entries.len(), "tail cascade");
        }
        merges
    }

    /// Scan the whole queue left to right, merging each index until it
    /// stops changing. Returns the number of merges performed.
    pub(crate) fn reduce_full(&mut self) -> usize {
        let mut merges = 0;
        let mut index = 0;
        while index + 1 < self.entries.len() {
            while self.try_merge_at(index).is_merged() {
                merges += 1;
            }
            index += 1;
        }
        if merges > 0 {
            debug!(merges, len = self.entries.len(), "full reduction");
        }
        merges
    }
}

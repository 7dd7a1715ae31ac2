//! The [`MergeQueue`] container.
//!
//! [`MergeQueue`] owns an ordered sequence of entries (oldest first) and the
//! [`RuleRegistry`] that decides which adjacent entries collapse. Every
//! mutating operation returns with the queue reduced:
//!
//! - [`enqueue`] runs a tail cascade, which only looks at the newest end.
//! - [`add_merge_rule`] runs a full left-to-right reduction, since a new rule
//!   may apply to any pair already queued.
//! - Removing or clearing rules never rescans. Merges are destructive and
//!   stay merged.
//!
//! [`enqueue`]: MergeQueue::enqueue
//! [`add_merge_rule`]: MergeQueue::add_merge_rule

use std::collections::{vec_deque, VecDeque};
use std::fmt;

use serde::Serialize;
use tracing::debug;

use opmerge_rules::{Entry, Merger, OpId, OpPattern, RuleKey, RuleRegistry};

use crate::error::{QueueError, QueueResult};

/// An ordered operation queue that collapses adjacent entries according to
/// merge rules.
///
/// The queue is single-writer: every mutation takes `&mut self` and runs to
/// completion, so a merger can never re-enter the queue that called it.
pub struct MergeQueue<T> {
    /// Queued entries, oldest at the front.
    pub(crate) entries: VecDeque<Entry<T>>,
    /// Active merge rules.
    pub(crate) rules: RuleRegistry<T>,
}

impl<T> MergeQueue<T> {
    /// Create an empty queue with no rules.
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            rules: RuleRegistry::new(),
        }
    }

    /// Create a queue pre-seeded with `entries`, oldest first.
    ///
    /// The entries are taken verbatim: no reduction runs, and the registry
    /// starts empty.
    pub fn with_entries(entries: impl IntoIterator<Item = Entry<T>>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            rules: RuleRegistry::new(),
        }
    }

    /// Number of queued entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // ---------------------------------------------------------------
    // Queue operations
    // ---------------------------------------------------------------

    /// Append an entry, then collapse it into its predecessors for as long
    /// as rules apply at the tail.
    pub fn enqueue(&mut self, op: impl Into<OpId>, payload: T) {
        let entry = Entry::new(op, payload);
        debug!(op = %entry.op, len = self.entries.len() + 1, "enqueued");
        self.entries.push_back(entry);
        self.cascade_tail();
    }

    /// Remove and return the oldest entry.
    pub fn dequeue(&mut self) -> QueueResult<Entry<T>> {
        self.entries.pop_front().ok_or(QueueError::EmptyQueue)
    }

    /// The oldest entry, without removing it.
    pub fn peek(&self) -> Option<&Entry<T>> {
        self.entries.front()
    }

    /// Drop every queued entry. Rules are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Borrowing iterator over the entries, oldest first.
    pub fn iter(&self) -> vec_deque::Iter<'_, Entry<T>> {
        self.entries.iter()
    }

    /// An independent copy of the queued entries, oldest first.
    pub fn to_vec(&self) -> Vec<Entry<T>>
    where
        T: Clone,
    {
        self.entries.iter().cloned().collect()
    }

    // ---------------------------------------------------------------
    // Rule management
    // ---------------------------------------------------------------

    /// Install a merge rule for `(leading, trailing)` and fully reduce the
    /// queue under the new rule set.
    ///
    /// An existing rule for the same pair is overwritten.
    pub fn add_merge_rule(
        &mut self,
        leading: impl Into<OpPattern>,
        trailing: impl Into<OpPattern>,
        merger: impl Merger<T> + 'static,
    ) {
        self.rules.set(RuleKey::new(leading, trailing), merger);
        self.reduce_full();
    }

    /// Remove the rule for exactly `(leading, trailing)`.
    ///
    /// Returns `true` if a rule was removed. Queued entries are untouched.
    pub fn remove_merge_rule(
        &mut self,
        leading: impl Into<OpPattern>,
        trailing: impl Into<OpPattern>,
    ) -> bool {
        self.rules.remove(&RuleKey::new(leading, trailing))
    }

    /// Remove every rule. Queued entries are untouched.
    pub fn clear_merge_rules(&mut self) {
        self.rules.clear();
    }

    /// The active rule set.
    pub fn rules(&self) -> &RuleRegistry<T> {
        &self.rules
    }

    /// Returns `true` if no adjacent pair currently resolves to a rule.
    pub fn is_stable(&self) -> bool {
        self.entries
            .iter()
            .zip(self.entries.iter().skip(1))
            .all(|(leading, trailing)| self.rules.resolve(&leading.op, &trailing.op).is_none())
    }

    // ---------------------------------------------------------------
    // Rendering
    // ---------------------------------------------------------------

    /// Render the queue as `op: <json payload>` lines, oldest first.
    pub fn render(&self) -> QueueResult<String>
    where
        T: Serialize,
    {
        let lines = self
            .entries
            .iter()
            .map(|entry| -> QueueResult<String> {
                let payload = serde_json::to_string(&entry.payload)?;
                Ok(format!("{}: {payload}", entry.op))
            })
            .collect::<QueueResult<Vec<String>>>()?;
        Ok(lines.join("\n"))
    }
}

impl<T> Default for MergeQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Serialize> fmt::Display for MergeQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self.render().map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}

impl<T: fmt::Debug> fmt::Debug for MergeQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeQueue")
            .field("entries", &self.entries)
            .field("rules", &self.rules)
            .finish()
    }
}

impl<T> From<Vec<Entry<T>>> for MergeQueue<T> {
    fn from(entries: Vec<Entry<T>>) -> Self {
        Self::with_entries(entries)
    }
}

impl<T> FromIterator<Entry<T>> for MergeQueue<T> {
    fn from_iter<I: IntoIterator<Item = Entry<T>>>(iter: I) -> Self {
        Self::with_entries(iter)
    }
}

impl<'a, T> IntoIterator for &'a MergeQueue<T> {
    type Item = &'a Entry<T>;
    type IntoIter = vec_deque::Iter<'a, Entry<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<T> IntoIterator for MergeQueue<T> {
    type Item = Entry<T>;
    type IntoIter = vec_deque::IntoIter<Entry<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    /// Helper: the queue's contents as `(op, payload)` pairs.
    fn pairs<T: Clone>(queue: &MergeQueue<T>) -> Vec<(String, T)> {
        queue
            .iter()
            .map(|e| (e.op.to_string(), e.payload.clone()))
            .collect()
    }

    // ---- Test 1: FIFO order without rules ----
    #[test]
    fn fifo_without_rules() {
        let mut queue = MergeQueue::new();
        queue.enqueue("a", json!(1));
        queue.enqueue("b", json!("2"));
        queue.enqueue("c", json!(true));

        assert_eq!(queue.dequeue().unwrap(), Entry::new("a", json!(1)));
        assert_eq!(queue.dequeue().unwrap(), Entry::new("b", json!("2")));
        assert_eq!(queue.dequeue().unwrap(), Entry::new("c", json!(true)));
        assert!(queue.is_empty());
    }

    // ---- Test 2: Empty-queue contract ----
    #[test]
    fn empty_queue_contract() {
        let mut queue: MergeQueue<i32> = MergeQueue::new();
        assert!(queue.peek().is_none());
        assert!(matches!(queue.dequeue(), Err(QueueError::EmptyQueue)));
    }

    // ---- Test 3: Peek does not remove ----
    #[test]
    fn peek_does_not_remove() {
        let mut queue = MergeQueue::new();
        queue.enqueue("a", 1);
        queue.enqueue("b", 2);

        assert_eq!(queue.peek(), Some(&Entry::new("a", 1)));
        assert_eq!(queue.peek(), Some(&Entry::new("a", 1)));
        assert_eq!(queue.dequeue().unwrap(), Entry::new("a", 1));
        assert_eq!(queue.dequeue().unwrap(), Entry::new("b", 2));
    }

    // ---- Test 4: Iteration is restartable ----
    #[test]
    fn iteration_is_restartable() {
        let mut queue = MergeQueue::new();
        queue.enqueue("a", 1);
        queue.enqueue("b", 2);
        queue.enqueue("c", 3);

        let first: Vec<_> = queue.iter().map(|e| e.payload).collect();
        let second: Vec<_> = (&queue).into_iter().map(|e| e.payload).collect();
        assert_eq!(first, vec![1, 2, 3]);
        assert_eq!(first, second);

        let mut seen = Vec::new();
        for entry in &queue {
            seen.push(entry.op.to_string());
        }
        assert_eq!(seen, vec!["a", "b", "c"]);

        let owned: Vec<Entry<i32>> = queue.into_iter().collect();
        assert_eq!(owned.len(), 3);
    }

    // ---- Test 5: Construction is verbatim ----
    #[test]
    fn construction_does_not_reduce() {
        let queue = MergeQueue::with_entries(vec![
            Entry::new("a", 1),
            Entry::new("a", 2),
            Entry::new("a", 3),
        ]);
        assert_eq!(queue.len(), 3);
        assert!(queue.rules().is_empty());
    }

    // ---- Test 6: Snapshot round-trip ----
    #[test]
    fn snapshot_round_trip() {
        let queue: MergeQueue<i32> = vec![Entry::new("a", 1), Entry::new("b", 2), Entry::new("c", 3)].into();
        let copy: MergeQueue<i32> = queue.to_vec().into_iter().collect();
        assert_eq!(copy.to_vec(), queue.to_vec());
    }

    // ---- Test 7: Snapshot is independent ----
    #[test]
    fn snapshot_is_independent() {
        let mut queue = MergeQueue::new();
        queue.enqueue("a", 1);

        let mut snapshot = queue.to_vec();
        snapshot[0].payload = 99;
        snapshot.push(Entry::new("z", 0));

        assert_eq!(pairs(&queue), vec![("a".to_string(), 1)]);
    }

    // ---- Test 8: Clear keeps rules, clear_merge_rules keeps entries ----
    #[test]
    fn clear_and_clear_rules_are_independent() {
        let mut queue = MergeQueue::new();
        queue.enqueue("a", 1);
        queue.enqueue("b", 2);
        queue.add_merge_rule("x", "y", |a: &i32, b: &i32| Some(Entry::new("x", a + b)));

        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.rules().len(), 1);

        queue.enqueue("x", 1);
        queue.enqueue("y", 2);
        assert_eq!(pairs(&queue), vec![("x".to_string(), 3)]);

        queue.clear_merge_rules();
        assert!(queue.rules().is_empty());
        assert_eq!(queue.len(), 1);
    }

    // ---- Test 9: Rendering ----
    #[test]
    fn render_lines() {
        let mut queue = MergeQueue::new();
        queue.enqueue("a", json!(1));
        queue.enqueue("b", json!("2"));
        queue.enqueue("c", json!({"name": "Bob"}));

        assert_eq!(queue.to_string(), "a: 1\nb: \"2\"\nc: {\"name\":\"Bob\"}");
        assert_eq!(MergeQueue::<Value>::new().to_string(), "");
    }

    // ---- Test 10: Render fails on unserializable payloads ----
    #[test]
    fn render_reports_serialization_failure() {
        use std::collections::HashMap;

        // Non-string map keys cannot be JSON object keys.
        let mut payload = HashMap::new();
        payload.insert((1, 2), 3);
        let queue = MergeQueue::with_entries(vec![Entry::new("a", payload)]);
        assert!(matches!(queue.render(), Err(QueueError::Render(_))));
    }

    // ---- Test 11: Removal is not retroactive ----
    #[test]
    fn removing_rule_keeps_merged_entries() {
        let mut queue = MergeQueue::new();
        queue.add_merge_rule("a", "b", |a: &i32, b: &i32| Some(Entry::new("c", a + b)));
        queue.enqueue("a", 1);
        queue.enqueue("b", 2);
        queue.enqueue("a", 5);

        let before = queue.to_vec();
        assert!(queue.remove_merge_rule("a", "b"));
        assert!(!queue.remove_merge_rule("a", "b"));
        assert_eq!(queue.to_vec(), before);

        queue.enqueue("b", 1);
        assert_eq!(queue.len(), 3);
    }

    // ---- Test 12: Stability check ----
    #[test]
    fn stability_reflects_current_rules() {
        let mut queue = MergeQueue::with_entries(vec![Entry::new("a", 1), Entry::new("b", 2)]);
        assert!(queue.is_stable());

        queue.add_merge_rule("a", "b", |a: &i32, b: &i32| Some(Entry::new("c", a + b)));
        assert!(queue.is_stable());
        assert_eq!(queue.len(), 1);
    }
}

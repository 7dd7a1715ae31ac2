//! Self-reducing operation queue.
//!
//! [`MergeQueue`] holds an ordered batch of operations and collapses adjacent
//! ones as they arrive, according to merge rules keyed by operation id. A
//! rule either folds two entries into one or cancels both.
//!
//! # Quick Start
//!
//! ```rust
//! use opmerge_queue::{Entry, MergeQueue};
//!
//! let mut queue = MergeQueue::new();
//! queue.add_merge_rule("inc", "inc", |a: &i64, b: &i64| Some(Entry::new("inc", a + b)));
//! queue.add_merge_rule("inc", "dec", |_: &i64, _: &i64| -> Option<Entry<i64>> { None });
//!
//! queue.enqueue("inc", 1);
//! queue.enqueue("inc", 2);
//! assert_eq!(queue.peek(), Some(&Entry::new("inc", 3)));
//!
//! queue.enqueue("dec", 3);
//! assert!(queue.is_empty());
//! ```

pub mod error;
pub mod queue;
mod reduce;

pub use error::{QueueError, QueueResult};
pub use opmerge_rules::{Entry, Merger, OpId, OpPattern, RuleKey, RuleRegistry, RuleTier};
pub use queue::MergeQueue;

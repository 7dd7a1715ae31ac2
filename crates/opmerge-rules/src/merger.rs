//! The [`Merger`] trait implemented by merge functions.

use crate::types::Entry;

/// Combines the payloads of two adjacent entries.
///
/// Returning `Some(entry)` replaces both entries with `entry`, whose id need
/// not match either input. Returning `None` annihilates both entries.
///
/// Mergers receive read-only payloads and must return fresh values. They
/// must not touch the queue that invoked them; a panic propagates to the
/// caller of the queue operation.
///
/// The trait is object-safe and `Send + Sync` so rules can be stored as
/// `Box<dyn Merger<T>>` and a queue can be handed to another task.
pub trait Merger<T>: Send + Sync {
    /// Merge `leading` (the older entry) with `trailing` (the newer entry).
    fn merge(&self, leading: &T, trailing: &T) -> Option<Entry<T>>;
}

impl<T, F> Merger<T> for F
where
    F: Fn(&T, &T) -> Option<Entry<T>> + Send + Sync,
{
    fn merge(&self, leading: &T, trailing: &T) -> Option<Entry<T>> {
        self(leading, trailing)
    }
}

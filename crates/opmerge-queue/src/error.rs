//! Error types for queue operations.

/// Errors that can occur during queue operations.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// `dequeue` was called on a queue with no entries.
    #[error("queue is empty")]
    EmptyQueue,

    /// A payload could not be serialized while rendering the queue.
    #[error("failed to render payload: {0}")]
    Render(#[from] serde_json::Error),
}

/// Convenience alias for queue results.
pub type QueueResult<T> = Result<T, QueueError>;

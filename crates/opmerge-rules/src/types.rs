//! Core identifier and entry types.
//!
//! Operation ids name the kind of intent an entry carries. Patterns extend
//! them with a wildcard for use in rule keys only.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A concrete operation identifier, such as `"add"` or `"delete"`.
///
/// The engine treats ids as opaque names. There is no reserved value: the
/// wildcard lives in [`OpPattern`], not here.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpId(String);

impl OpId {
    /// Create an operation id from any string-like value.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for OpId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for OpId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OpId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for OpId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// One side of a rule key: either a concrete operation id or the wildcard.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum OpPattern {
    /// Matches exactly one operation id.
    Exact(OpId),
    /// Matches any operation id.
    Any,
}

impl OpPattern {
    /// Returns `true` if this is the wildcard pattern.
    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    /// Returns `true` if the pattern matches `op`.
    pub fn matches(&self, op: &OpId) -> bool {
        match self {
            Self::Exact(id) => id == op,
            Self::Any => true,
        }
    }
}

impl fmt::Display for OpPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(id) => write!(f, "{id}"),
            Self::Any => f.write_str("*"),
        }
    }
}

impl From<OpId> for OpPattern {
    fn from(id: OpId) -> Self {
        Self::Exact(id)
    }
}

impl From<&OpId> for OpPattern {
    fn from(id: &OpId) -> Self {
        Self::Exact(id.clone())
    }
}

impl From<&str> for OpPattern {
    fn from(name: &str) -> Self {
        Self::Exact(OpId::from(name))
    }
}

impl From<String> for OpPattern {
    fn from(name: String) -> Self {
        Self::Exact(OpId::from(name))
    }
}

/// The ordered `(leading, trailing)` pair a merge rule is registered under.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RuleKey {
    /// Pattern for the older of the two adjacent entries.
    pub leading: OpPattern,
    /// Pattern for the newer of the two adjacent entries.
    pub trailing: OpPattern,
}

impl RuleKey {
    /// Build a key from any two pattern-like values.
    pub fn new(leading: impl Into<OpPattern>, trailing: impl Into<OpPattern>) -> Self {
        Self {
            leading: leading.into(),
            trailing: trailing.into(),
        }
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.leading, self.trailing)
    }
}

/// A queued operation: an id plus the payload its mergers interpret.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry<T> {
    /// Which kind of intent this entry carries.
    pub op: OpId,
    /// Opaque data, interpreted only by mergers.
    pub payload: T,
}

impl<T> Entry<T> {
    /// Create an entry.
    pub fn new(op: impl Into<OpId>, payload: T) -> Self {
        Self {
            op: op.into(),
            payload,
        }
    }

    /// Split the entry into its id and payload.
    pub fn into_parts(self) -> (OpId, T) {
        (self.op, self.payload)
    }
}

impl<T> From<(OpId, T)> for Entry<T> {
    fn from((op, payload): (OpId, T)) -> Self {
        Self { op, payload }
    }
}

impl<T> From<(&str, T)> for Entry<T> {
    fn from((op, payload): (&str, T)) -> Self {
        Self::new(op, payload)
    }
}

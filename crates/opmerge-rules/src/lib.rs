//! Merge rules for opmerge.
//!
//! This crate holds the vocabulary shared by every opmerge component: the
//! identifiers that name queued operations, the patterns rules are keyed by,
//! and the registry that resolves which rule (if any) applies to a pair of
//! adjacent operations.
//!
//! # Architecture
//!
//! - **Operation ids** ([`OpId`]) are always concrete. The wildcard is not a
//!   reserved string but a separate [`OpPattern::Any`] variant, so a queued
//!   operation can never be mistaken for a wildcard.
//! - **Rule keys** ([`RuleKey`]) are ordered `(leading, trailing)` pattern
//!   pairs. Each distinct pair owns exactly one slot in the registry.
//! - **Resolution** ([`RuleRegistry::resolve`]) ranks candidate rules by
//!   specificity: exact pair, then leading-anchored, then trailing-anchored,
//!   then the catch-all.
//!
//! # Modules
//!
//! - [`types`] — [`OpId`], [`OpPattern`], [`RuleKey`], [`Entry`]
//! - [`merger`] — The [`Merger`] trait implemented by merge functions
//! - [`registry`] — The [`RuleRegistry`] and its [`RuleTier`] ranking

pub mod merger;
pub mod registry;
pub mod types;

pub use merger::Merger;
pub use registry::{Resolved, RuleRegistry, RuleTier};
pub use types::{Entry, OpId, OpPattern, RuleKey};

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for policy tree construction.

use thiserror::Error;

/// Result type for tree construction.
pub type Result<T> = std::result::Result<T, TreeError>;

/// Structural invariants a policy tree must satisfy.
///
/// The infallible constructors ([`crate::Rule::new`], [`crate::Policy::new`])
/// panic on these; the `try_*` variants return them so that decoders can
/// reject corrupted input without aborting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
	#[error("a rule cannot carry the inapplicable effect")]
	InapplicableRuleEffect,

	#[error("first-target-matching is only valid on policy sets")]
	FirstTargetMatchingOnPolicy,
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Rules: an effect gated by a condition.

use serde::Serialize;

use crate::attribute::{AttributeSet, MatchResult};
use crate::condition::Condition;
use crate::effect::Effect;
use crate::error::{Result, TreeError};

/// A leaf of the policy tree.
///
/// The static effect is never [`Effect::Inapplicable`]; that value only
/// arises from evaluation. Rules serialize for audit output but are only
/// built through the constructors below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
	effect: Effect,
	condition: Condition,
}

impl Rule {
	/// Creates a rule.
	///
	/// # Panics
	///
	/// Panics if `effect` is [`Effect::Inapplicable`]. Such a rule can only
	/// come from a broken parser.
	pub fn new(effect: Effect, condition: Condition) -> Self {
		assert!(
			effect != Effect::Inapplicable,
			"a rule cannot carry the inapplicable effect"
		);
		Self { effect, condition }
	}

	/// Fallible variant of [`Rule::new`] for untrusted input.
	pub fn try_new(effect: Effect, condition: Condition) -> Result<Self> {
		if effect == Effect::Inapplicable {
			return Err(TreeError::InapplicableRuleEffect);
		}
		Ok(Self { effect, condition })
	}

	/// A rule that applies whatever the request.
	pub fn unconditional(effect: Effect) -> Self {
		Self::new(effect, Condition::default())
	}

	pub fn effect(&self) -> Effect {
		self.effect
	}

	pub fn condition(&self) -> &Condition {
		&self.condition
	}

	/// Returns the static effect when the condition holds, `Undetermined`
	/// when it cannot be decided and `Inapplicable` otherwise.
	pub fn evaluate(&self, attributes: &AttributeSet) -> Effect {
		match self.condition.evaluate(attributes) {
			MatchResult::Match => self.effect,
			MatchResult::Undetermined => Effect::Undetermined,
			MatchResult::NoMatch => Effect::Inapplicable,
		}
	}
}

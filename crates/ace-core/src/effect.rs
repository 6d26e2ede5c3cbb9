// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Decision outcomes produced by rules, policies and policy sets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of evaluating a Rule, Policy or PolicySet.
///
/// The declaration order is load-bearing: combining algorithms compare
/// effects by [`Effect::ordinal`], lower values being more restrictive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
	Deny = 0,
	Undetermined = 1,
	PromptOneShot = 2,
	PromptSession = 3,
	PromptBlanket = 4,
	Permit = 5,
	Inapplicable = 6,
	NotMatchingTarget = 7,
	Error = 8,
}

impl Effect {
	/// Returns every effect in ordinal order.
	pub fn all() -> &'static [Effect] {
		&[
			Effect::Deny,
			Effect::Undetermined,
			Effect::PromptOneShot,
			Effect::PromptSession,
			Effect::PromptBlanket,
			Effect::Permit,
			Effect::Inapplicable,
			Effect::NotMatchingTarget,
			Effect::Error,
		]
	}

	/// Numeric priority used by the combining algorithms.
	pub fn ordinal(self) -> u8 {
		self as u8
	}

	/// Inverse of [`Effect::ordinal`].
	pub fn from_ordinal(ordinal: u8) -> Option<Effect> {
		Self::all().get(ordinal as usize).copied()
	}

	/// Returns true for the three prompt variants.
	pub fn is_prompt(self) -> bool {
		matches!(
			self,
			Effect::PromptOneShot | Effect::PromptSession | Effect::PromptBlanket
		)
	}
}

impl fmt::Display for Effect {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Effect::Deny => "deny",
			Effect::Undetermined => "undetermined",
			Effect::PromptOneShot => "prompt_one_shot",
			Effect::PromptSession => "prompt_session",
			Effect::PromptBlanket => "prompt_blanket",
			Effect::Permit => "permit",
			Effect::Inapplicable => "inapplicable",
			Effect::NotMatchingTarget => "not_matching_target",
			Effect::Error => "error",
		};
		f.write_str(name)
	}
}

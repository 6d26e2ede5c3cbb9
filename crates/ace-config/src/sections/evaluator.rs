// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Evaluator configuration section.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A user's standing answer for a capability, merged with the policy result.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Preference {
	/// No preference; the policy result stands.
	#[default]
	Default,
	Permit,
	Deny,
	OneShotPrompt,
	SessionPrompt,
	BlanketPrompt,
}

impl FromStr for Preference {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().replace('-', "_").as_str() {
			"default" => Ok(Preference::Default),
			"permit" => Ok(Preference::Permit),
			"deny" => Ok(Preference::Deny),
			"one_shot_prompt" => Ok(Preference::OneShotPrompt),
			"session_prompt" => Ok(Preference::SessionPrompt),
			"blanket_prompt" => Ok(Preference::BlanketPrompt),
			other => Err(format!("unknown preference '{other}'")),
		}
	}
}

impl fmt::Display for Preference {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Preference::Default => write!(f, "default"),
			Preference::Permit => write!(f, "permit"),
			Preference::Deny => write!(f, "deny"),
			Preference::OneShotPrompt => write!(f, "one_shot_prompt"),
			Preference::SessionPrompt => write!(f, "session_prompt"),
			Preference::BlanketPrompt => write!(f, "blanket_prompt"),
		}
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EvaluatorConfigLayer {
	pub default_preference: Option<Preference>,
}

impl EvaluatorConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.default_preference.is_some() {
			self.default_preference = other.default_preference;
		}
	}

	pub fn finalize(self) -> EvaluatorConfig {
		EvaluatorConfig {
			default_preference: self.default_preference.unwrap_or_default(),
		}
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EvaluatorConfig {
	pub default_preference: Preference,
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy results and their merge with user preferences.

use serde::{Deserialize, Serialize};
use std::fmt;

use ace_config::Preference;
use ace_core::Effect;

/// Decision handed to the enforcement point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyResult {
	Deny,
	Permit,
	PromptOneShot,
	PromptSession,
	PromptBlanket,
	Undetermined,
	NotApplicable,
}

impl PolicyResult {
	pub fn is_prompt(self) -> bool {
		matches!(
			self,
			PolicyResult::PromptOneShot | PolicyResult::PromptSession | PolicyResult::PromptBlanket
		)
	}
}

impl fmt::Display for PolicyResult {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PolicyResult::Deny => write!(f, "deny"),
			PolicyResult::Permit => write!(f, "permit"),
			PolicyResult::PromptOneShot => write!(f, "prompt_one_shot"),
			PolicyResult::PromptSession => write!(f, "prompt_session"),
			PolicyResult::PromptBlanket => write!(f, "prompt_blanket"),
			PolicyResult::Undetermined => write!(f, "undetermined"),
			PolicyResult::NotApplicable => write!(f, "not_applicable"),
		}
	}
}

/// Maps a combined effect to a policy result.
///
/// `NotMatchingTarget` and `Error` have no counterpart and deny.
pub fn effect_to_policy_result(effect: Effect) -> PolicyResult {
	match effect {
		Effect::Deny => PolicyResult::Deny,
		Effect::Undetermined => PolicyResult::Undetermined,
		Effect::PromptOneShot => PolicyResult::PromptOneShot,
		Effect::PromptSession => PolicyResult::PromptSession,
		Effect::PromptBlanket => PolicyResult::PromptBlanket,
		Effect::Permit => PolicyResult::Permit,
		Effect::Inapplicable => PolicyResult::NotApplicable,
		Effect::NotMatchingTarget | Effect::Error => PolicyResult::Deny,
	}
}

/// Merges the user's preference with the policy result.
///
/// | result \ preference | Permit  | Prompt*    | Deny | Default |
/// |---------------------|---------|------------|------|---------|
/// | Permit              | Permit  | Prompt*    | Deny | Permit  |
/// | Prompt*             | Prompt* | strictest  | Deny | Prompt* |
/// | Deny                | Deny    | Deny       | Deny | Deny    |
/// | Undetermined        | Undet.  | Undet.     | Deny | Undet.  |
/// | NotApplicable       | Permit  | Prompt*    | Deny | NotAp.  |
///
/// Among prompts, one-shot is stricter than session, which is stricter than
/// blanket.
pub fn most_restrictive(preference: Preference, result: PolicyResult) -> PolicyResult {
	if preference == Preference::Permit && result == PolicyResult::Permit {
		return PolicyResult::Permit;
	}
	if preference == Preference::Deny || result == PolicyResult::Deny {
		return PolicyResult::Deny;
	}
	if result == PolicyResult::Undetermined {
		return PolicyResult::Undetermined;
	}
	if preference == Preference::Default {
		return result;
	}
	if preference == Preference::OneShotPrompt || result == PolicyResult::PromptOneShot {
		return PolicyResult::PromptOneShot;
	}
	if preference == Preference::SessionPrompt || result == PolicyResult::PromptSession {
		return PolicyResult::PromptSession;
	}
	if preference == Preference::BlanketPrompt || result == PolicyResult::PromptBlanket {
		return PolicyResult::PromptBlanket;
	}
	PolicyResult::Permit
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Target matching for policies and policy sets.

use tracing::trace;

use crate::attribute::{AttributeSet, MatchResult};
use crate::subject::Subject;

/// Outcome of matching a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TargetMatch {
	pub matched: bool,
	/// Set when some subject scanned before the decision was undetermined.
	pub undetermined: bool,
}

/// Matches a target (list of subjects) against request attributes.
///
/// An empty list matches everything. Otherwise subjects are scanned in
/// order and the first `Match` wins, even if earlier subjects were
/// undetermined. When nothing matches the result is a plain no-match; the
/// `undetermined` flag is reported but callers treat the target as not
/// matching.
pub fn matches(subjects: &[Subject], attributes: &AttributeSet) -> TargetMatch {
	if subjects.is_empty() {
		return TargetMatch {
			matched: true,
			undetermined: false,
		};
	}

	let mut outcome = TargetMatch::default();
	for (idx, subject) in subjects.iter().enumerate() {
		match subject.match_subject(attributes) {
			MatchResult::Match => {
				trace!(subject = idx, "target matches");
				outcome.matched = true;
				return outcome;
			}
			MatchResult::Undetermined => {
				trace!(subject = idx, "target subject undetermined");
				outcome.undetermined = true;
			}
			MatchResult::NoMatch => {}
		}
	}
	trace!(undetermined = outcome.undetermined, "target does not match");
	outcome
}

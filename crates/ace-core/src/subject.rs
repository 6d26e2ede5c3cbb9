// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Target subjects.

use serde::{Deserialize, Serialize};

use crate::attribute::{AttributeSet, MatchResult};
use crate::matching::AttributeMatch;

/// One entry of a policy target: every listed predicate must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
	pub attributes: Vec<AttributeMatch>,
}

impl Subject {
	pub fn new(attributes: Vec<AttributeMatch>) -> Self {
		Self { attributes }
	}

	/// Builder: add a predicate.
	pub fn with(mut self, predicate: AttributeMatch) -> Self {
		self.attributes.push(predicate);
		self
	}

	/// Matches the subject against request attributes.
	///
	/// Conjunction over the predicates; an empty subject matches.
	pub fn match_subject(&self, attributes: &AttributeSet) -> MatchResult {
		let mut result = MatchResult::Match;
		for predicate in &self.attributes {
			result = result.and(predicate.evaluate(attributes));
			if result == MatchResult::NoMatch {
				break;
			}
		}
		result
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::attribute::{Attribute, AttributeKind};

	fn attrs() -> AttributeSet {
		vec![
			Attribute::new("id", AttributeKind::Subject).with_value("widget-1"),
			Attribute::new("signer", AttributeKind::Subject).with_undetermined(true),
		]
		.into_iter()
		.collect()
	}

	#[test]
	fn empty_subject_matches() {
		assert_eq!(Subject::default().match_subject(&attrs()), MatchResult::Match);
	}

	#[test]
	fn all_predicates_must_hold() {
		let subject = Subject::default()
			.with(AttributeMatch::equal("id", AttributeKind::Subject, "widget-1"))
			.with(AttributeMatch::equal("id", AttributeKind::Subject, "widget-2"));
		assert_eq!(subject.match_subject(&attrs()), MatchResult::NoMatch);
	}

	#[test]
	fn undetermined_predicate_makes_subject_undetermined() {
		let subject = Subject::default()
			.with(AttributeMatch::equal("id", AttributeKind::Subject, "widget-1"))
			.with(AttributeMatch::equal("signer", AttributeKind::Subject, "vendor"));
		assert_eq!(subject.match_subject(&attrs()), MatchResult::Undetermined);
	}

	#[test]
	fn no_match_beats_undetermined() {
		let subject = Subject::default()
			.with(AttributeMatch::equal("signer", AttributeKind::Subject, "vendor"))
			.with(AttributeMatch::equal("id", AttributeKind::Subject, "other"));
		assert_eq!(subject.match_subject(&attrs()), MatchResult::NoMatch);
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Rule conditions: AND/OR trees of attribute predicates.

use serde::{Deserialize, Serialize};

use crate::attribute::{AttributeSet, MatchResult};
use crate::matching::AttributeMatch;

/// How the members of a [`Condition`] are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombineType {
	#[default]
	And,
	Or,
}

/// A boolean combination of predicates and nested conditions.
///
/// Predicates are evaluated before nested conditions. An empty condition
/// always holds, so a rule without a condition applies unconditionally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
	pub combine: CombineType,
	pub attributes: Vec<AttributeMatch>,
	pub conditions: Vec<Condition>,
}

impl Condition {
	pub fn new(combine: CombineType) -> Self {
		Self {
			combine,
			attributes: Vec::new(),
			conditions: Vec::new(),
		}
	}

	pub fn and() -> Self {
		Self::new(CombineType::And)
	}

	pub fn or() -> Self {
		Self::new(CombineType::Or)
	}

	/// Builder: add a predicate.
	pub fn with_attribute(mut self, predicate: AttributeMatch) -> Self {
		self.attributes.push(predicate);
		self
	}

	/// Builder: add a nested condition.
	pub fn with_condition(mut self, condition: Condition) -> Self {
		self.conditions.push(condition);
		self
	}

	pub fn is_empty(&self) -> bool {
		self.attributes.is_empty() && self.conditions.is_empty()
	}

	/// Evaluates the condition with three-valued logic.
	pub fn evaluate(&self, attributes: &AttributeSet) -> MatchResult {
		if self.is_empty() {
			return MatchResult::Match;
		}

		let results = self
			.attributes
			.iter()
			.map(|p| p.evaluate(attributes))
			.chain(self.conditions.iter().map(|c| c.evaluate(attributes)));

		match self.combine {
			CombineType::And => {
				let mut acc = MatchResult::Match;
				for r in results {
					acc = acc.and(r);
					if acc == MatchResult::NoMatch {
						break;
					}
				}
				acc
			}
			CombineType::Or => {
				let mut acc = MatchResult::NoMatch;
				for r in results {
					acc = acc.or(r);
					if acc == MatchResult::Match {
						break;
					}
				}
				acc
			}
		}
	}

	/// Boolean projection of [`Condition::evaluate`]: only a definite match holds.
	pub fn holds(&self, attributes: &AttributeSet) -> bool {
		self.evaluate(attributes).is_match()
	}

	/// Visits every predicate in the tree, depth first.
	pub fn for_each_predicate<'a>(&'a self, f: &mut impl FnMut(&'a AttributeMatch)) {
		for predicate in &self.attributes {
			f(predicate);
		}
		for condition in &self.conditions {
			condition.for_each_predicate(f);
		}
	}
}

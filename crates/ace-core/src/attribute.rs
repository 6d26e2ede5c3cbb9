// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request attributes and the tri-state match result.
//!
//! - [`Attribute`]: a named value resolved for one request
//! - [`AttributeSet`]: the request-scoped collection the combiner reads
//! - [`MatchResult`]: Match / NoMatch / Undetermined with three-valued logic
//!
//! An attribute is created unresolved (no value) when the set of attributes a
//! policy tree needs is extracted. The Policy Information Point then fills in
//! values or flags the attribute undetermined. During evaluation the set is
//! read-only.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which provider an attribute is resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
	Subject,
	Resource,
	Environment,
	FunctionParam,
}

impl AttributeKind {
	/// Returns all attribute kinds in provider order.
	pub fn all() -> &'static [AttributeKind] {
		&[
			AttributeKind::Subject,
			AttributeKind::Resource,
			AttributeKind::Environment,
			AttributeKind::FunctionParam,
		]
	}
}

impl fmt::Display for AttributeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			AttributeKind::Subject => write!(f, "subject"),
			AttributeKind::Resource => write!(f, "resource"),
			AttributeKind::Environment => write!(f, "environment"),
			AttributeKind::FunctionParam => write!(f, "function_param"),
		}
	}
}

/// Identity of an attribute inside an [`AttributeSet`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributeKey {
	pub name: String,
	pub kind: AttributeKind,
}

impl AttributeKey {
	pub fn new(name: impl Into<String>, kind: AttributeKind) -> Self {
		Self {
			name: name.into(),
			kind,
		}
	}
}

impl fmt::Display for AttributeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.kind, self.name)
	}
}

/// A single request attribute.
///
/// `==` compares every field, value and flag included. The identity of an
/// attribute is its [`AttributeKey`]; [`Attribute::same_name`] compares
/// names only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
	pub name: String,
	pub kind: AttributeKind,
	pub value: Option<String>,
	pub undetermined: bool,
}

impl Attribute {
	/// Creates an unresolved attribute.
	pub fn new(name: impl Into<String>, kind: AttributeKind) -> Self {
		Self {
			name: name.into(),
			kind,
			value: None,
			undetermined: false,
		}
	}

	/// Builder: set the resolved value.
	pub fn with_value(mut self, value: impl Into<String>) -> Self {
		self.value = Some(value.into());
		self
	}

	/// Builder: flag the attribute as undetermined.
	pub fn with_undetermined(mut self, undetermined: bool) -> Self {
		self.undetermined = undetermined;
		self
	}

	pub fn key(&self) -> AttributeKey {
		AttributeKey::new(self.name.clone(), self.kind)
	}

	/// Returns true if both attributes name the same thing, ignoring value and kind.
	pub fn same_name(&self, other: &Attribute) -> bool {
		self.name == other.name
	}

	/// Marks the attribute as undetermined. Only the PIP calls this.
	pub fn set_undetermined(&mut self) {
		self.undetermined = true;
	}

	fn is(&self, name: &str, kind: AttributeKind) -> bool {
		self.kind == kind && self.name == name
	}
}

/// Request-scoped attribute collection, at most one attribute per [`AttributeKey`].
///
/// Iteration order is insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeSet {
	attributes: Vec<Attribute>,
}

impl AttributeSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts an attribute, replacing any attribute with the same key.
	/// Returns the replaced attribute.
	pub fn insert(&mut self, attribute: Attribute) -> Option<Attribute> {
		match self
			.attributes
			.iter_mut()
			.find(|a| a.is(&attribute.name, attribute.kind))
		{
			Some(slot) => Some(std::mem::replace(slot, attribute)),
			None => {
				self.attributes.push(attribute);
				None
			}
		}
	}

	/// Inserts only if no attribute with the same key exists.
	/// Returns true if the attribute was added.
	pub fn insert_if_absent(&mut self, attribute: Attribute) -> bool {
		if self.contains(&attribute.name, attribute.kind) {
			return false;
		}
		self.attributes.push(attribute);
		true
	}

	pub fn get(&self, name: &str, kind: AttributeKind) -> Option<&Attribute> {
		self.attributes.iter().find(|a| a.is(name, kind))
	}

	pub fn get_mut(&mut self, name: &str, kind: AttributeKind) -> Option<&mut Attribute> {
		self.attributes.iter_mut().find(|a| a.is(name, kind))
	}

	/// Finds the first attribute with the given name, whatever its kind.
	pub fn get_by_name(&self, name: &str) -> Option<&Attribute> {
		self.attributes.iter().find(|a| a.name == name)
	}

	pub fn contains(&self, name: &str, kind: AttributeKind) -> bool {
		self.get(name, kind).is_some()
	}

	pub fn len(&self) -> usize {
		self.attributes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.attributes.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
		self.attributes.iter()
	}

	pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Attribute> {
		self.attributes.iter_mut()
	}

	/// Returns the attributes of one kind, in insertion order.
	pub fn of_kind(&self, kind: AttributeKind) -> impl Iterator<Item = &Attribute> {
		self.attributes.iter().filter(move |a| a.kind == kind)
	}

	pub fn clear(&mut self) {
		self.attributes.clear();
	}
}

impl FromIterator<Attribute> for AttributeSet {
	fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
		let mut set = AttributeSet::new();
		for attribute in iter {
			set.insert(attribute);
		}
		set
	}
}

impl Extend<Attribute> for AttributeSet {
	fn extend<I: IntoIterator<Item = Attribute>>(&mut self, iter: I) {
		for attribute in iter {
			self.insert(attribute);
		}
	}
}

impl IntoIterator for AttributeSet {
	type Item = Attribute;
	type IntoIter = std::vec::IntoIter<Attribute>;

	fn into_iter(self) -> Self::IntoIter {
		self.attributes.into_iter()
	}
}

impl<'a> IntoIterator for &'a AttributeSet {
	type Item = &'a Attribute;
	type IntoIter = std::slice::Iter<'a, Attribute>;

	fn into_iter(self) -> Self::IntoIter {
		self.attributes.iter()
	}
}

/// Result of matching a predicate against request attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchResult {
	Match,
	NoMatch,
	Undetermined,
}

impl MatchResult {
	pub fn from_bool(matched: bool) -> Self {
		if matched {
			MatchResult::Match
		} else {
			MatchResult::NoMatch
		}
	}

	/// Three-valued conjunction: NoMatch dominates, then Undetermined.
	pub fn and(self, other: MatchResult) -> MatchResult {
		match (self, other) {
			(MatchResult::NoMatch, _) | (_, MatchResult::NoMatch) => MatchResult::NoMatch,
			(MatchResult::Undetermined, _) | (_, MatchResult::Undetermined) => {
				MatchResult::Undetermined
			}
			_ => MatchResult::Match,
		}
	}

	/// Three-valued disjunction: Match dominates, then Undetermined.
	pub fn or(self, other: MatchResult) -> MatchResult {
		match (self, other) {
			(MatchResult::Match, _) | (_, MatchResult::Match) => MatchResult::Match,
			(MatchResult::Undetermined, _) | (_, MatchResult::Undetermined) => {
				MatchResult::Undetermined
			}
			_ => MatchResult::NoMatch,
		}
	}

	pub fn is_match(self) -> bool {
		self == MatchResult::Match
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	mod attribute_set {
		use super::*;

		#[test]
		fn insert_replaces_same_key() {
			let mut set = AttributeSet::new();
			assert!(set
				.insert(Attribute::new("version", AttributeKind::Subject).with_value("1"))
				.is_none());
			let old = set.insert(Attribute::new("version", AttributeKind::Subject).with_value("2"));
			assert_eq!(old.and_then(|a| a.value), Some("1".to_string()));
			assert_eq!(set.len(), 1);
			assert_eq!(
				set.get("version", AttributeKind::Subject)
					.and_then(|a| a.value.as_deref()),
				Some("2")
			);
		}

		#[test]
		fn kind_is_part_of_identity() {
			let set: AttributeSet = vec![
				Attribute::new("version", AttributeKind::Subject).with_value("1"),
				Attribute::new("version", AttributeKind::Resource).with_value("2"),
			]
			.into_iter()
			.collect();
			assert_eq!(set.len(), 2);
			assert_eq!(set.of_kind(AttributeKind::Resource).count(), 1);
			assert!(!set.contains("version", AttributeKind::Environment));
		}

		#[test]
		fn insert_if_absent_keeps_existing() {
			let mut set = AttributeSet::new();
			assert!(set.insert_if_absent(Attribute::new("a", AttributeKind::Subject).with_value("x")));
			assert!(!set.insert_if_absent(Attribute::new("a", AttributeKind::Subject)));
			assert_eq!(
				set.get("a", AttributeKind::Subject).and_then(|a| a.value.clone()),
				Some("x".to_string())
			);
		}

		#[test]
		fn insertion_order_is_preserved() {
			let set: AttributeSet = ["c", "a", "b"]
				.into_iter()
				.map(|n| Attribute::new(n, AttributeKind::Environment))
				.collect();
			let names: Vec<_> = set.iter().map(|a| a.name.as_str()).collect();
			assert_eq!(names, vec!["c", "a", "b"]);
		}

		#[test]
		fn equality_is_structural() {
			let unresolved = Attribute::new("id", AttributeKind::Subject);
			let resolved = Attribute::new("id", AttributeKind::Subject).with_value("w1");
			assert_ne!(unresolved, resolved);
			assert_eq!(unresolved.key(), resolved.key());
			assert!(unresolved.same_name(&resolved));
		}

		#[test]
		fn same_name_ignores_kind() {
			let a = Attribute::new("id", AttributeKind::Subject);
			let b = Attribute::new("id", AttributeKind::Resource).with_value("v");
			assert!(a.same_name(&b));
			assert_ne!(a.key(), b.key());
		}
	}

	mod match_result {
		use super::*;

		const ALL: [MatchResult; 3] = [
			MatchResult::Match,
			MatchResult::NoMatch,
			MatchResult::Undetermined,
		];

		#[test]
		fn and_truth_table() {
			assert_eq!(MatchResult::Match.and(MatchResult::Match), MatchResult::Match);
			assert_eq!(
				MatchResult::Match.and(MatchResult::Undetermined),
				MatchResult::Undetermined
			);
			assert_eq!(
				MatchResult::Undetermined.and(MatchResult::NoMatch),
				MatchResult::NoMatch
			);
		}

		#[test]
		fn or_truth_table() {
			assert_eq!(MatchResult::NoMatch.or(MatchResult::NoMatch), MatchResult::NoMatch);
			assert_eq!(
				MatchResult::NoMatch.or(MatchResult::Undetermined),
				MatchResult::Undetermined
			);
			assert_eq!(MatchResult::Undetermined.or(MatchResult::Match), MatchResult::Match);
		}

		#[test]
		fn operators_are_commutative() {
			for a in ALL {
				for b in ALL {
					assert_eq!(a.and(b), b.and(a));
					assert_eq!(a.or(b), b.or(a));
				}
			}
		}
	}
}

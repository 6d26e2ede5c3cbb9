// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The policy tree.
//!
//! ```text
//! PolicySet ─┬─ Policy ─┬─ Rule
//!            │          └─ Rule
//!            └─ PolicySet ─ ...
//! ```
//!
//! Ownership follows the tree: a policy owns its rules, a policy set owns its
//! child policies and policy sets. Children keep the order they were added
//! in, which the order-sensitive combining algorithms rely on. The shape
//! invariants (rules under policies, policies under sets) are expressed in
//! the types, so a node whose kind disagrees with its payload cannot exist.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, TreeError};
use crate::rule::Rule;
use crate::subject::Subject;

/// Algorithm folding child effects into one parent effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombineAlgorithm {
	DenyOverride,
	PermitOverride,
	FirstApplicable,
	/// Only meaningful on policy sets.
	FirstTargetMatching,
}

impl CombineAlgorithm {
	pub fn all() -> &'static [CombineAlgorithm] {
		&[
			CombineAlgorithm::DenyOverride,
			CombineAlgorithm::PermitOverride,
			CombineAlgorithm::FirstApplicable,
			CombineAlgorithm::FirstTargetMatching,
		]
	}
}

impl fmt::Display for CombineAlgorithm {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			CombineAlgorithm::DenyOverride => write!(f, "deny-overrides"),
			CombineAlgorithm::PermitOverride => write!(f, "permit-overrides"),
			CombineAlgorithm::FirstApplicable => write!(f, "first-applicable"),
			CombineAlgorithm::FirstTargetMatching => write!(f, "first-matching-target"),
		}
	}
}

/// A set of rules with a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Policy {
	subjects: Vec<Subject>,
	algorithm: CombineAlgorithm,
	rules: Vec<Rule>,
}

impl Policy {
	/// Creates a policy with no rules.
	///
	/// # Panics
	///
	/// Panics on [`CombineAlgorithm::FirstTargetMatching`], which only
	/// policy sets may use.
	pub fn new(algorithm: CombineAlgorithm, subjects: Vec<Subject>) -> Self {
		assert!(
			algorithm != CombineAlgorithm::FirstTargetMatching,
			"first-target-matching is only valid on policy sets"
		);
		Self {
			subjects,
			algorithm,
			rules: Vec::new(),
		}
	}

	/// Fallible variant of [`Policy::new`] for untrusted input.
	pub fn try_new(algorithm: CombineAlgorithm, subjects: Vec<Subject>) -> Result<Self> {
		if algorithm == CombineAlgorithm::FirstTargetMatching {
			return Err(TreeError::FirstTargetMatchingOnPolicy);
		}
		Ok(Self {
			subjects,
			algorithm,
			rules: Vec::new(),
		})
	}

	/// Builder: append a rule.
	pub fn with_rule(mut self, rule: Rule) -> Self {
		self.rules.push(rule);
		self
	}

	pub fn push_rule(&mut self, rule: Rule) {
		self.rules.push(rule);
	}

	pub fn subjects(&self) -> &[Subject] {
		&self.subjects
	}

	pub fn algorithm(&self) -> CombineAlgorithm {
		self.algorithm
	}

	pub fn rules(&self) -> &[Rule] {
		&self.rules
	}
}

/// A set of policies and nested policy sets with a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicySet {
	subjects: Vec<Subject>,
	algorithm: CombineAlgorithm,
	children: Vec<PolicyElement>,
}

impl PolicySet {
	pub fn new(algorithm: CombineAlgorithm, subjects: Vec<Subject>) -> Self {
		Self {
			subjects,
			algorithm,
			children: Vec::new(),
		}
	}

	/// Builder: append a child policy or policy set.
	pub fn with_child(mut self, child: impl Into<PolicyElement>) -> Self {
		self.children.push(child.into());
		self
	}

	pub fn push_child(&mut self, child: impl Into<PolicyElement>) {
		self.children.push(child.into());
	}

	pub fn subjects(&self) -> &[Subject] {
		&self.subjects
	}

	pub fn algorithm(&self) -> CombineAlgorithm {
		self.algorithm
	}

	pub fn children(&self) -> &[PolicyElement] {
		&self.children
	}
}

/// A child of a policy set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PolicyElement {
	Policy(Policy),
	PolicySet(PolicySet),
}

impl From<Policy> for PolicyElement {
	fn from(policy: Policy) -> Self {
		PolicyElement::Policy(policy)
	}
}

impl From<PolicySet> for PolicyElement {
	fn from(set: PolicySet) -> Self {
		PolicyElement::PolicySet(set)
	}
}

/// Node kind tag of a [`TreeNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
	Policy,
	PolicySet,
	Rule,
}

impl fmt::Display for NodeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			NodeKind::Policy => write!(f, "policy"),
			NodeKind::PolicySet => write!(f, "policy_set"),
			NodeKind::Rule => write!(f, "rule"),
		}
	}
}

/// Any node of the policy tree; the unit handed to the combiner and
/// persisted by the serializer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
	Policy(Policy),
	PolicySet(PolicySet),
	Rule(Rule),
}

impl TreeNode {
	pub fn kind(&self) -> NodeKind {
		match self {
			TreeNode::Policy(_) => NodeKind::Policy,
			TreeNode::PolicySet(_) => NodeKind::PolicySet,
			TreeNode::Rule(_) => NodeKind::Rule,
		}
	}

	/// Number of direct children.
	pub fn child_count(&self) -> usize {
		match self {
			TreeNode::Policy(p) => p.rules().len(),
			TreeNode::PolicySet(s) => s.children().len(),
			TreeNode::Rule(_) => 0,
		}
	}
}

impl From<Policy> for TreeNode {
	fn from(policy: Policy) -> Self {
		TreeNode::Policy(policy)
	}
}

impl From<PolicySet> for TreeNode {
	fn from(set: PolicySet) -> Self {
		TreeNode::PolicySet(set)
	}
}

impl From<Rule> for TreeNode {
	fn from(rule: Rule) -> Self {
		TreeNode::Rule(rule)
	}
}

impl From<PolicyElement> for TreeNode {
	fn from(element: PolicyElement) -> Self {
		match element {
			PolicyElement::Policy(p) => TreeNode::Policy(p),
			PolicyElement::PolicySet(s) => TreeNode::PolicySet(s),
		}
	}
}

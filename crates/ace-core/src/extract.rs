// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Collects the attributes a policy tree refers to.

use crate::attribute::{Attribute, AttributeSet};
use crate::matching::AttributeMatch;
use crate::policy::{Policy, PolicyElement, PolicySet, TreeNode};
use crate::subject::Subject;

/// Returns every attribute named by a target or a rule condition in the
/// tree, unresolved and in first-seen order.
///
/// The result is what the Policy Information Point is asked to fill in
/// before evaluation.
pub fn extract_attributes(root: &TreeNode) -> AttributeSet {
	let mut out = AttributeSet::new();
	match root {
		TreeNode::Policy(policy) => collect_policy(policy, &mut out),
		TreeNode::PolicySet(set) => collect_set(set, &mut out),
		TreeNode::Rule(rule) => {
			rule.condition()
				.for_each_predicate(&mut |p| add(p, &mut out));
		}
	}
	out
}

fn collect_set(set: &PolicySet, out: &mut AttributeSet) {
	collect_subjects(set.subjects(), out);
	for child in set.children() {
		match child {
			PolicyElement::Policy(policy) => collect_policy(policy, out),
			PolicyElement::PolicySet(nested) => collect_set(nested, out),
		}
	}
}

fn collect_policy(policy: &Policy, out: &mut AttributeSet) {
	collect_subjects(policy.subjects(), out);
	for rule in policy.rules() {
		rule.condition().for_each_predicate(&mut |p| add(p, out));
	}
}

fn collect_subjects(subjects: &[Subject], out: &mut AttributeSet) {
	for predicate in subjects.iter().flat_map(|s| &s.attributes) {
		add(predicate, out);
	}
}

fn add(predicate: &AttributeMatch, out: &mut AttributeSet) {
	out.insert_if_absent(Attribute::new(predicate.name.clone(), predicate.kind));
}

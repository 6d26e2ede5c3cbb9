// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy tree evaluation.
//!
//! The combiner walks the tree bottom-up against one resolved
//! [`AttributeSet`]:
//!
//! 1. **Target check**: a node whose target does not match yields
//!    [`Effect::NotMatchingTarget`]
//! 2. **Children**: rules (for a policy) or child policies and sets (for a
//!    policy set) are evaluated in order
//! 3. **Fold**: the collected effects are reduced with the node's
//!    [`CombineAlgorithm`] by [`fold`]
//!
//! Evaluation is synchronous, performs no I/O and never mutates the tree
//! or the attributes.

use tracing::{debug, instrument, warn};

use crate::attribute::AttributeSet;
use crate::effect::Effect;
use crate::policy::{CombineAlgorithm, Policy, PolicyElement, PolicySet, TreeNode};
use crate::target;

/// Evaluates a policy tree against a resolved attribute set.
///
/// Shorthand for [`Combiner::new`] followed by [`Combiner::evaluate`].
pub fn evaluate(root: &TreeNode, attributes: &AttributeSet) -> Effect {
	Combiner::new(attributes).evaluate(root)
}

/// Tree walker bound to the attributes of one request.
#[derive(Debug, Clone, Copy)]
pub struct Combiner<'a> {
	attributes: &'a AttributeSet,
}

impl<'a> Combiner<'a> {
	pub fn new(attributes: &'a AttributeSet) -> Self {
		Self { attributes }
	}

	pub fn attributes(&self) -> &'a AttributeSet {
		self.attributes
	}

	/// Top-level entry point, dispatching on the root's kind.
	///
	/// A bare rule is not a policy and cannot be evaluated as a root; it
	/// yields [`Effect::Error`].
	#[instrument(level = "debug", skip_all, fields(root = %root.kind()))]
	pub fn evaluate(&self, root: &TreeNode) -> Effect {
		let effect = match root {
			TreeNode::Policy(policy) => self.eval_policy(policy),
			TreeNode::PolicySet(set) => self.eval_policy_set(set),
			TreeNode::Rule(_) => {
				warn!("policy tree root is a rule, cannot evaluate");
				Effect::Error
			}
		};
		debug!(%effect, "policy tree evaluated");
		effect
	}

	/// Evaluates a policy: target, then rules, then fold.
	///
	/// With [`CombineAlgorithm::FirstApplicable`] the remaining rules are
	/// skipped once one is applicable.
	pub fn eval_policy(&self, policy: &Policy) -> Effect {
		let target = target::matches(policy.subjects(), self.attributes);
		if !target.matched {
			debug!(undetermined = target.undetermined, "policy target does not match");
			return Effect::NotMatchingTarget;
		}

		let algorithm = policy.algorithm();
		let mut effects = Vec::with_capacity(policy.rules().len());
		for rule in policy.rules() {
			let effect = rule.evaluate(self.attributes);
			effects.push(effect);
			if algorithm == CombineAlgorithm::FirstApplicable && effect != Effect::Inapplicable {
				break;
			}
		}

		fold(algorithm, &effects)
	}

	/// Evaluates a policy set: target, then children, then fold.
	///
	/// Children that do not match their own target are left out of the
	/// fold. With [`CombineAlgorithm::FirstTargetMatching`] iteration stops
	/// at the first child that does match.
	pub fn eval_policy_set(&self, set: &PolicySet) -> Effect {
		let target = target::matches(set.subjects(), self.attributes);
		if !target.matched {
			debug!(undetermined = target.undetermined, "policy set target does not match");
			return Effect::NotMatchingTarget;
		}

		let algorithm = set.algorithm();
		let mut effects = Vec::with_capacity(set.children().len());
		for child in set.children() {
			let effect = match child {
				PolicyElement::Policy(policy) => self.eval_policy(policy),
				PolicyElement::PolicySet(nested) => self.eval_policy_set(nested),
			};

			if effect == Effect::NotMatchingTarget {
				continue;
			}
			effects.push(effect);

			if algorithm == CombineAlgorithm::FirstTargetMatching {
				break;
			}
		}

		fold(algorithm, &effects)
	}
}

/// Folds a list of effects with a combining algorithm.
///
/// An [`Effect::Error`] anywhere in the list wins before the algorithm is
/// consulted.
pub fn fold(algorithm: CombineAlgorithm, effects: &[Effect]) -> Effect {
	debug!(%algorithm, ?effects, "combining effects");

	if effects.contains(&Effect::Error) {
		return Effect::Error;
	}

	match algorithm {
		CombineAlgorithm::DenyOverride => deny_overrides(effects),
		CombineAlgorithm::PermitOverride => permit_overrides(effects),
		CombineAlgorithm::FirstApplicable => first_applicable(effects),
		CombineAlgorithm::FirstTargetMatching => first_target_matching(effects),
	}
}

/// Most restrictive effect, by ordinal.
fn deny_overrides(effects: &[Effect]) -> Effect {
	effects
		.iter()
		.copied()
		.min()
		.unwrap_or(Effect::Inapplicable)
}

/// Permit wins outright. Otherwise an undetermined child makes the whole
/// result undetermined, and failing that the most permissive remaining
/// effect is returned.
fn permit_overrides(effects: &[Effect]) -> Effect {
	let mut undetermined = false;
	let mut best: Option<Effect> = None;

	for &effect in effects {
		match effect {
			Effect::Permit => return Effect::Permit,
			Effect::Undetermined => undetermined = true,
			Effect::Inapplicable => {}
			other => {
				if best.map_or(true, |b| other >= b) {
					best = Some(other);
				}
			}
		}
	}

	if undetermined {
		return Effect::Undetermined;
	}
	best.unwrap_or(Effect::Inapplicable)
}

fn first_applicable(effects: &[Effect]) -> Effect {
	effects
		.iter()
		.copied()
		.find(|e| *e != Effect::Inapplicable)
		.unwrap_or(Effect::Inapplicable)
}

/// The caller only collects children whose target matched, so the first
/// element is the decision.
fn first_target_matching(effects: &[Effect]) -> Effect {
	effects.first().copied().unwrap_or(Effect::Inapplicable)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::attribute::{Attribute, AttributeKind};
	use crate::condition::Condition;
	use crate::matching::AttributeMatch;
	use crate::rule::Rule;
	use crate::subject::Subject;
	use proptest::prelude::*;
	use Effect::*;

	fn any_effect() -> impl Strategy<Value = Effect> {
		prop::sample::select(Effect::all().to_vec())
	}

	fn any_algorithm() -> impl Strategy<Value = CombineAlgorithm> {
		prop::sample::select(CombineAlgorithm::all().to_vec())
	}

	mod fold_algorithms {
		use super::*;

		#[test]
		fn deny_override() {
			assert_eq!(fold(CombineAlgorithm::DenyOverride, &[Permit, Deny, Permit]), Deny);
			assert_eq!(fold(CombineAlgorithm::DenyOverride, &[]), Inapplicable);
			assert_eq!(fold(CombineAlgorithm::DenyOverride, &[Permit, Permit]), Permit);
			assert_eq!(
				fold(CombineAlgorithm::DenyOverride, &[Permit, PromptSession, Inapplicable]),
				PromptSession
			);
		}

		#[test]
		fn permit_override() {
			assert_eq!(fold(CombineAlgorithm::PermitOverride, &[Deny, Permit]), Permit);
			assert_eq!(fold(CombineAlgorithm::PermitOverride, &[Deny, Deny]), Deny);
			assert_eq!(
				fold(CombineAlgorithm::PermitOverride, &[Inapplicable, Inapplicable]),
				Inapplicable
			);
			assert_eq!(
				fold(CombineAlgorithm::PermitOverride, &[Inapplicable, Undetermined]),
				Undetermined
			);
			assert_eq!(fold(CombineAlgorithm::PermitOverride, &[]), Inapplicable);
		}

		#[test]
		fn permit_override_prefers_most_permissive_prompt() {
			assert_eq!(
				fold(
					CombineAlgorithm::PermitOverride,
					&[PromptOneShot, Deny, PromptBlanket, PromptSession]
				),
				PromptBlanket
			);
		}

		#[test]
		fn permit_override_undetermined_beats_prompt() {
			assert_eq!(
				fold(CombineAlgorithm::PermitOverride, &[PromptBlanket, Undetermined]),
				Undetermined
			);
			assert_eq!(
				fold(CombineAlgorithm::PermitOverride, &[Undetermined, Deny, Permit]),
				Permit
			);
		}

		#[test]
		fn first_applicable() {
			assert_eq!(
				fold(
					CombineAlgorithm::FirstApplicable,
					&[Inapplicable, Inapplicable, Deny, Permit]
				),
				Deny
			);
			assert_eq!(fold(CombineAlgorithm::FirstApplicable, &[Inapplicable]), Inapplicable);
		}

		#[test]
		fn first_target_matching() {
			assert_eq!(fold(CombineAlgorithm::FirstTargetMatching, &[]), Inapplicable);
			assert_eq!(fold(CombineAlgorithm::FirstTargetMatching, &[Permit]), Permit);
		}

		#[test]
		fn error_wins_for_every_algorithm() {
			for &algorithm in CombineAlgorithm::all() {
				assert_eq!(fold(algorithm, &[Permit, Error]), Error);
				assert_eq!(fold(algorithm, &[Error, Deny]), Error);
			}
		}
	}

	proptest! {
		#[test]
		fn error_anywhere_forces_error(
			algorithm in any_algorithm(),
			mut effects in prop::collection::vec(any_effect(), 0..12),
			pos in any::<prop::sample::Index>(),
		) {
			let idx = pos.index(effects.len() + 1);
			effects.insert(idx, Error);
			prop_assert_eq!(fold(algorithm, &effects), Error);
		}

		#[test]
		fn deny_override_is_minimum_ordinal(effects in prop::collection::vec(any_effect(), 1..12)) {
			prop_assume!(!effects.contains(&Error));
			let min = effects.iter().map(|e| e.ordinal()).min().unwrap();
			prop_assert_eq!(fold(CombineAlgorithm::DenyOverride, &effects).ordinal(), min);
		}

		#[test]
		fn permit_override_with_permit_is_permit(
			mut effects in prop::collection::vec(any_effect(), 0..12),
			pos in any::<prop::sample::Index>(),
		) {
			effects.retain(|e| *e != Error);
			let idx = pos.index(effects.len() + 1);
			effects.insert(idx, Permit);
			prop_assert_eq!(fold(CombineAlgorithm::PermitOverride, &effects), Permit);
		}

		#[test]
		fn folds_ignore_nothing_but_inapplicable_for_first_applicable(
			effects in prop::collection::vec(any_effect(), 0..12),
		) {
			prop_assume!(!effects.contains(&Error));
			let expected = effects.iter().copied().find(|e| *e != Inapplicable).unwrap_or(Inapplicable);
			prop_assert_eq!(fold(CombineAlgorithm::FirstApplicable, &effects), expected);
		}
	}

	fn widget_attrs(id: &str) -> AttributeSet {
		vec![
			Attribute::new("id", AttributeKind::Subject).with_value(id),
			Attribute::new("api", AttributeKind::Resource).with_value("camera"),
			Attribute::new("roaming", AttributeKind::Environment).with_undetermined(true),
		]
		.into_iter()
		.collect()
	}

	fn target(id: &str) -> Vec<Subject> {
		vec![Subject::default().with(AttributeMatch::equal("id", AttributeKind::Subject, id))]
	}

	fn when_api(api: &str) -> Condition {
		Condition::and().with_attribute(AttributeMatch::equal("api", AttributeKind::Resource, api))
	}

	mod policies {
		use super::*;

		#[test]
		fn non_matching_target() {
			let policy = Policy::new(CombineAlgorithm::DenyOverride, target("other"))
				.with_rule(Rule::unconditional(Permit));
			assert_eq!(Combiner::new(&widget_attrs("w1")).eval_policy(&policy), NotMatchingTarget);
		}

		#[test]
		fn undetermined_target_reports_not_matching() {
			let subjects = vec![Subject::default().with(AttributeMatch::equal(
				"roaming",
				AttributeKind::Environment,
				"yes",
			))];
			let policy = Policy::new(CombineAlgorithm::DenyOverride, subjects)
				.with_rule(Rule::unconditional(Permit));
			assert_eq!(Combiner::new(&widget_attrs("w1")).eval_policy(&policy), NotMatchingTarget);
		}

		#[test]
		fn first_applicable_stops_at_first_applicable_rule() {
			let policy = Policy::new(CombineAlgorithm::FirstApplicable, vec![])
				.with_rule(Rule::new(Deny, when_api("geolocation")))
				.with_rule(Rule::new(Permit, when_api("camera")))
				.with_rule(Rule::new(Error, Condition::default()));
			// The trailing Error rule is never reached.
			assert_eq!(Combiner::new(&widget_attrs("w1")).eval_policy(&policy), Permit);
		}

		#[test]
		fn deny_override_evaluates_all_rules() {
			let policy = Policy::new(CombineAlgorithm::DenyOverride, target("w1"))
				.with_rule(Rule::new(Permit, when_api("camera")))
				.with_rule(Rule::new(PromptOneShot, Condition::default()));
			assert_eq!(Combiner::new(&widget_attrs("w1")).eval_policy(&policy), PromptOneShot);
		}

		#[test]
		fn policy_without_rules_is_inapplicable() {
			let policy = Policy::new(CombineAlgorithm::PermitOverride, vec![]);
			assert_eq!(Combiner::new(&widget_attrs("w1")).eval_policy(&policy), Inapplicable);
		}
	}

	mod policy_sets {
		use super::*;

		#[test]
		fn non_matching_child_is_excluded() {
			let set = PolicySet::new(CombineAlgorithm::PermitOverride, vec![])
				.with_child(
					Policy::new(CombineAlgorithm::DenyOverride, target("w1"))
						.with_rule(Rule::unconditional(Deny)),
				)
				.with_child(
					Policy::new(CombineAlgorithm::DenyOverride, target("other"))
						.with_rule(Rule::unconditional(Permit)),
				);
			assert_eq!(evaluate(&set.into(), &widget_attrs("w1")), Deny);
		}

		#[test]
		fn all_children_not_matching_is_inapplicable() {
			let set = PolicySet::new(CombineAlgorithm::DenyOverride, vec![]).with_child(
				Policy::new(CombineAlgorithm::DenyOverride, target("other"))
					.with_rule(Rule::unconditional(Deny)),
			);
			assert_eq!(evaluate(&set.into(), &widget_attrs("w1")), Inapplicable);
		}

		#[test]
		fn first_target_matching_takes_first_matching_child() {
			let set = PolicySet::new(CombineAlgorithm::FirstTargetMatching, vec![])
				.with_child(
					Policy::new(CombineAlgorithm::DenyOverride, target("other"))
						.with_rule(Rule::unconditional(Deny)),
				)
				.with_child(
					Policy::new(CombineAlgorithm::DenyOverride, target("w1"))
						.with_rule(Rule::new(PromptSession, when_api("camera"))),
				)
				.with_child(
					Policy::new(CombineAlgorithm::DenyOverride, vec![])
						.with_rule(Rule::unconditional(Error)),
				);
			assert_eq!(evaluate(&set.into(), &widget_attrs("w1")), PromptSession);
		}

		#[test]
		fn first_target_matching_keeps_inapplicable_child() {
			let set = PolicySet::new(CombineAlgorithm::FirstTargetMatching, vec![])
				.with_child(
					Policy::new(CombineAlgorithm::DenyOverride, vec![])
						.with_rule(Rule::new(Permit, when_api("geolocation"))),
				)
				.with_child(
					Policy::new(CombineAlgorithm::DenyOverride, vec![])
						.with_rule(Rule::unconditional(Deny)),
				);
			assert_eq!(evaluate(&set.into(), &widget_attrs("w1")), Inapplicable);
		}

		#[test]
		fn nested_sets_recurse() {
			let inner = PolicySet::new(CombineAlgorithm::DenyOverride, target("w1")).with_child(
				Policy::new(CombineAlgorithm::PermitOverride, vec![])
					.with_rule(Rule::unconditional(PromptBlanket)),
			);
			let outer = PolicySet::new(CombineAlgorithm::PermitOverride, vec![])
				.with_child(inner)
				.with_child(
					Policy::new(CombineAlgorithm::DenyOverride, vec![])
						.with_rule(Rule::new(Deny, when_api("sms"))),
				);
			assert_eq!(evaluate(&outer.into(), &widget_attrs("w1")), PromptBlanket);
		}

		#[test]
		fn error_in_subtree_propagates() {
			let set = PolicySet::new(CombineAlgorithm::PermitOverride, vec![])
				.with_child(
					Policy::new(CombineAlgorithm::DenyOverride, vec![])
						.with_rule(Rule::unconditional(Permit)),
				)
				.with_child(
					Policy::new(CombineAlgorithm::DenyOverride, vec![])
						.with_rule(Rule::unconditional(Error)),
				);
			assert_eq!(evaluate(&set.into(), &widget_attrs("w1")), Error);
		}

		#[test]
		fn set_target_checked_first() {
			let set = PolicySet::new(CombineAlgorithm::DenyOverride, target("other")).with_child(
				Policy::new(CombineAlgorithm::DenyOverride, vec![])
					.with_rule(Rule::unconditional(Permit)),
			);
			assert_eq!(evaluate(&set.into(), &widget_attrs("w1")), NotMatchingTarget);
		}
	}

	#[test]
	fn rule_root_is_an_error() {
		let root = TreeNode::Rule(Rule::unconditional(Permit));
		assert_eq!(evaluate(&root, &AttributeSet::new()), Error);
	}
}

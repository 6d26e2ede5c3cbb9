// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Encodings of the policy model.
//!
//! Every tree node is written as a [`NodeKind`] tag followed by its body.
//! The reader dispatches on the tag and checks that the node may appear
//! where it was found: rules only under policies, policies and policy sets
//! only under policy sets.
//!
//! Conditions and policy sets nest. Decoding tracks the depth and refuses
//! input nested deeper than [`MAX_DEPTH`].

use std::io::{Read, Write};

use ace_core::{
	Attribute, AttributeKind, AttributeMatch, AttributeSet, CombineAlgorithm, CombineType, Condition,
	Effect, MatchFunction, Modifier, NodeKind, Policy, PolicyElement, PolicySet, Rule, Subject, TreeNode,
};

use crate::codec::{read_len, write_len, write_slice, Persist};
use crate::error::{Result, SerializerError};

/// Deepest nesting accepted when decoding conditions or policy sets.
pub const MAX_DEPTH: usize = 256;

fn check_depth(depth: usize) -> Result<()> {
	if depth > MAX_DEPTH {
		return Err(SerializerError::TooDeep { limit: MAX_DEPTH });
	}
	Ok(())
}

macro_rules! persist_tagged {
	($ty:ty, $what:literal, { $($variant:path => $tag:literal),+ $(,)? }) => {
		impl Persist for $ty {
			fn serialize<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
				let tag: u8 = match self {
					$($variant => $tag,)+
				};
				tag.serialize(w)
			}

			fn deserialize<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
				match u8::deserialize(r)? {
					$($tag => Ok($variant),)+
					tag => Err(SerializerError::UnknownTag { what: $what, tag }),
				}
			}
		}
	};
}

persist_tagged!(AttributeKind, "attribute kind", {
	AttributeKind::Subject => 0,
	AttributeKind::Resource => 1,
	AttributeKind::Environment => 2,
	AttributeKind::FunctionParam => 3,
});

persist_tagged!(MatchFunction, "match function", {
	MatchFunction::Equal => 0,
	MatchFunction::Glob => 1,
	MatchFunction::Regexp => 2,
});

persist_tagged!(Modifier, "modifier", {
	Modifier::None => 0,
	Modifier::Scheme => 1,
	Modifier::Authority => 2,
	Modifier::SchemeAuthority => 3,
	Modifier::Host => 4,
	Modifier::Path => 5,
});

persist_tagged!(CombineType, "condition combine type", {
	CombineType::And => 0,
	CombineType::Or => 1,
});

persist_tagged!(CombineAlgorithm, "combine algorithm", {
	CombineAlgorithm::DenyOverride => 0,
	CombineAlgorithm::PermitOverride => 1,
	CombineAlgorithm::FirstApplicable => 2,
	CombineAlgorithm::FirstTargetMatching => 3,
});

persist_tagged!(NodeKind, "node type", {
	NodeKind::Policy => 0,
	NodeKind::PolicySet => 1,
	NodeKind::Rule => 2,
});

impl Persist for Effect {
	fn serialize<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
		self.ordinal().serialize(w)
	}

	fn deserialize<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
		let tag = u8::deserialize(r)?;
		Effect::from_ordinal(tag).ok_or(SerializerError::UnknownTag { what: "effect", tag })
	}
}

impl Persist for Attribute {
	fn serialize<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
		self.name.serialize(w)?;
		self.kind.serialize(w)?;
		self.value.serialize(w)?;
		self.undetermined.serialize(w)
	}

	fn deserialize<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
		Ok(Attribute {
			name: String::deserialize(r)?,
			kind: AttributeKind::deserialize(r)?,
			value: Option::<String>::deserialize(r)?,
			undetermined: bool::deserialize(r)?,
		})
	}
}

impl Persist for AttributeSet {
	fn serialize<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
		write_len(w, self.len())?;
		for attribute in self {
			attribute.serialize(w)?;
		}
		Ok(())
	}

	fn deserialize<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
		Ok(Vec::<Attribute>::deserialize(r)?.into_iter().collect())
	}
}

impl Persist for AttributeMatch {
	fn serialize<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
		self.name.serialize(w)?;
		self.kind.serialize(w)?;
		self.values.serialize(w)?;
		self.function.serialize(w)?;
		self.modifier.serialize(w)
	}

	fn deserialize<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
		Ok(AttributeMatch {
			name: String::deserialize(r)?,
			kind: AttributeKind::deserialize(r)?,
			values: Vec::deserialize(r)?,
			function: MatchFunction::deserialize(r)?,
			modifier: Modifier::deserialize(r)?,
		})
	}
}

impl Persist for Subject {
	fn serialize<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
		self.attributes.serialize(w)
	}

	fn deserialize<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
		Ok(Subject::new(Vec::deserialize(r)?))
	}
}

impl Persist for Condition {
	fn serialize<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
		self.combine.serialize(w)?;
		self.attributes.serialize(w)?;
		self.conditions.serialize(w)
	}

	fn deserialize<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
		read_condition(r, 0)
	}
}

fn read_condition<R: Read + ?Sized>(r: &mut R, depth: usize) -> Result<Condition> {
	check_depth(depth)?;
	let combine = CombineType::deserialize(r)?;
	let attributes = Vec::deserialize(r)?;

	let count = read_len(r)?;
	let mut conditions = Vec::with_capacity(count.min(256));
	for _ in 0..count {
		conditions.push(read_condition(r, depth + 1)?);
	}
	Ok(Condition {
		combine,
		attributes,
		conditions,
	})
}

/// Rule body: effect, condition.
impl Persist for Rule {
	fn serialize<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
		self.effect().serialize(w)?;
		self.condition().serialize(w)
	}

	fn deserialize<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
		let effect = Effect::deserialize(r)?;
		let condition = Condition::deserialize(r)?;
		Ok(Rule::try_new(effect, condition)?)
	}
}

/// Policy body: target, algorithm, tagged rules.
impl Persist for Policy {
	fn serialize<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
		write_slice(w, self.subjects())?;
		self.algorithm().serialize(w)?;
		write_len(w, self.rules().len())?;
		for rule in self.rules() {
			NodeKind::Rule.serialize(w)?;
			rule.serialize(w)?;
		}
		Ok(())
	}

	fn deserialize<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
		let subjects = Vec::<Subject>::deserialize(r)?;
		let algorithm = CombineAlgorithm::deserialize(r)?;
		let mut policy = Policy::try_new(algorithm, subjects)?;

		let count = read_len(r)?;
		for _ in 0..count {
			match NodeKind::deserialize(r)? {
				NodeKind::Rule => policy.push_rule(Rule::deserialize(r)?),
				other => {
					return Err(SerializerError::InvalidTree(format!(
						"{other} found among the rules of a policy"
					)));
				}
			}
		}
		Ok(policy)
	}
}

/// Policy set body: target, algorithm, tagged children.
impl Persist for PolicySet {
	fn serialize<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
		write_slice(w, self.subjects())?;
		self.algorithm().serialize(w)?;
		write_len(w, self.children().len())?;
		for child in self.children() {
			child.serialize(w)?;
		}
		Ok(())
	}

	fn deserialize<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
		read_policy_set(r, 0)
	}
}

fn read_policy_set<R: Read + ?Sized>(r: &mut R, depth: usize) -> Result<PolicySet> {
	check_depth(depth)?;
	let subjects = Vec::<Subject>::deserialize(r)?;
	let algorithm = CombineAlgorithm::deserialize(r)?;
	let mut set = PolicySet::new(algorithm, subjects);

	let count = read_len(r)?;
	for _ in 0..count {
		set.push_child(read_element(r, depth + 1)?);
	}
	Ok(set)
}

fn read_element<R: Read + ?Sized>(r: &mut R, depth: usize) -> Result<PolicyElement> {
	match NodeKind::deserialize(r)? {
		NodeKind::Policy => Ok(PolicyElement::Policy(Policy::deserialize(r)?)),
		NodeKind::PolicySet => Ok(PolicyElement::PolicySet(read_policy_set(r, depth)?)),
		NodeKind::Rule => Err(SerializerError::InvalidTree(
			"rule found among the children of a policy set".to_string(),
		)),
	}
}

impl Persist for PolicyElement {
	fn serialize<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
		match self {
			PolicyElement::Policy(policy) => {
				NodeKind::Policy.serialize(w)?;
				policy.serialize(w)
			}
			PolicyElement::PolicySet(set) => {
				NodeKind::PolicySet.serialize(w)?;
				set.serialize(w)
			}
		}
	}

	fn deserialize<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
		read_element(r, 0)
	}
}

impl Persist for TreeNode {
	fn serialize<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
		self.kind().serialize(w)?;
		match self {
			TreeNode::Policy(policy) => policy.serialize(w),
			TreeNode::PolicySet(set) => set.serialize(w),
			TreeNode::Rule(rule) => rule.serialize(w),
		}
	}

	fn deserialize<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
		match NodeKind::deserialize(r)? {
			NodeKind::Policy => Ok(TreeNode::Policy(Policy::deserialize(r)?)),
			NodeKind::PolicySet => Ok(TreeNode::PolicySet(PolicySet::deserialize(r)?)),
			NodeKind::Rule => Ok(TreeNode::Rule(Rule::deserialize(r)?)),
		}
	}
}

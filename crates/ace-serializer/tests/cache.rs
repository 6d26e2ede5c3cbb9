// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fs;

use ace_core::{
	AttributeKind, AttributeMatch, CombineAlgorithm, Condition, Effect, Policy, PolicySet, Rule, TreeNode,
};
use ace_serializer::{PolicyTreeCache, SerializerError, FORMAT_VERSION, MAGIC, MAX_DEPTH, MAX_LENGTH};
use tempfile::TempDir;

fn tree() -> TreeNode {
	PolicySet::new(CombineAlgorithm::FirstTargetMatching, vec![])
		.with_child(Policy::new(CombineAlgorithm::DenyOverride, vec![]).with_rule(Rule::unconditional(Effect::Deny)))
		.into()
}

#[test]
fn store_then_load() {
	let dir = TempDir::new().unwrap();
	let cache = PolicyTreeCache::new(dir.path().join("nested"));

	let path = cache.store("policy.xml", &tree()).unwrap();
	assert!(path.ends_with("policy.xml.bin"));
	assert_eq!(cache.load("policy.xml").unwrap(), Some(tree()));
}

#[test]
fn miss_is_none() {
	let dir = TempDir::new().unwrap();
	let cache = PolicyTreeCache::new(dir.path());
	assert_eq!(cache.load("absent").unwrap(), None);
}

#[test]
fn store_replaces_previous_entry() {
	let dir = TempDir::new().unwrap();
	let cache = PolicyTreeCache::new(dir.path());
	cache.store("p", &tree()).unwrap();

	let replacement: TreeNode = Policy::new(CombineAlgorithm::PermitOverride, vec![])
		.with_rule(Rule::unconditional(Effect::Permit))
		.into();
	cache.store("p", &replacement).unwrap();

	assert_eq!(cache.load("p").unwrap(), Some(replacement));
	let leftovers: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
	assert_eq!(leftovers.len(), 1);
}

#[test]
fn stale_entry_is_discarded() {
	let dir = TempDir::new().unwrap();
	let cache = PolicyTreeCache::new(dir.path());
	let path = cache.store("p", &tree()).unwrap();

	let mut bytes = fs::read(&path).unwrap();
	bytes[4] = 0xFF;
	fs::write(&path, bytes).unwrap();

	assert_eq!(cache.load("p").unwrap(), None);
	assert!(!path.exists());
}

#[test]
fn corrupt_entry_is_an_error() {
	let dir = TempDir::new().unwrap();
	let cache = PolicyTreeCache::new(dir.path());
	let path = cache.store("p", &tree()).unwrap();

	let mut bytes = fs::read(&path).unwrap();
	bytes.truncate(bytes.len() - 3);
	fs::write(&path, bytes).unwrap();

	assert!(matches!(cache.load("p"), Err(SerializerError::Io(_))));
}

#[test]
fn invalidate_removes_entry() {
	let dir = TempDir::new().unwrap();
	let cache = PolicyTreeCache::new(dir.path());
	cache.store("p", &tree()).unwrap();

	assert!(cache.invalidate("p").unwrap());
	assert!(!cache.invalidate("p").unwrap());
	assert_eq!(cache.load("p").unwrap(), None);
}

#[test]
fn bad_keys_are_rejected() {
	let dir = TempDir::new().unwrap();
	let cache = PolicyTreeCache::new(dir.path());
	assert!(matches!(
		cache.store("../escape", &tree()),
		Err(SerializerError::InvalidCacheKey(_))
	));
	assert!(matches!(cache.load(""), Err(SerializerError::InvalidCacheKey(_))));
}

#[test]
fn failed_store_leaves_no_partial_entry() {
	let dir = TempDir::new().unwrap();
	let cache = PolicyTreeCache::new(dir.path());
	let oversized = "x".repeat(MAX_LENGTH as usize + 1);
	let root: TreeNode = Policy::new(CombineAlgorithm::DenyOverride, vec![])
		.with_rule(Rule::new(
			Effect::Deny,
			Condition::and().with_attribute(AttributeMatch::equal("api", AttributeKind::Resource, oversized)),
		))
		.into();

	assert!(matches!(
		cache.store("k", &root),
		Err(SerializerError::LengthOverLimit { .. })
	));
	let leftovers: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
	assert!(leftovers.is_empty(), "unexpected files: {leftovers:?}");
}

#[test]
fn deeply_nested_entry_is_an_error() {
	let dir = TempDir::new().unwrap();
	let cache = PolicyTreeCache::new(dir.path());

	let mut bytes = MAGIC.to_vec();
	bytes.push(FORMAT_VERSION);
	bytes.extend([2, Effect::Permit.ordinal()]);
	for _ in 0..100_000 {
		bytes.push(0);
		bytes.extend(0u32.to_le_bytes());
		bytes.extend(1u32.to_le_bytes());
	}
	fs::write(cache.entry_path("p").unwrap(), bytes).unwrap();

	assert!(matches!(
		cache.load("p"),
		Err(SerializerError::TooDeep { limit }) if limit == MAX_DEPTH
	));
}

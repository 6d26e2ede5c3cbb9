// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::cell::Cell;
use std::io;
use std::sync::Arc;

use ace_config::{AceConfig, CacheConfig, EvaluatorConfig};
use ace_core::{CombineAlgorithm, Effect, Policy, Rule, TreeNode};
use ace_evaluator::{load_tree, EvaluatorError, PolicyEvaluator};
use ace_pip::{PolicyInformationPoint, StaticProvider};
use ace_serializer::{PolicyTreeCache, SerializerError, FORMAT_VERSION, MAGIC};
use tempfile::TempDir;

fn tree() -> TreeNode {
	Policy::new(CombineAlgorithm::DenyOverride, vec![])
		.with_rule(Rule::unconditional(Effect::Permit))
		.into()
}

fn pip() -> PolicyInformationPoint {
	let empty = Arc::new(StaticProvider::new());
	PolicyInformationPoint::new(empty.clone(), empty.clone(), empty)
}

#[test]
fn miss_parses_and_stores() {
	let dir = TempDir::new().unwrap();
	let cache = PolicyTreeCache::new(dir.path());

	let root = load_tree(Some(&cache), "policy", || Ok::<_, io::Error>(tree())).unwrap();
	assert_eq!(root, tree());
	assert!(cache.entry_path("policy").unwrap().exists());
}

#[test]
fn hit_skips_parsing() {
	let dir = TempDir::new().unwrap();
	let cache = PolicyTreeCache::new(dir.path());
	cache.store("policy", &tree()).unwrap();

	let parsed = Cell::new(false);
	let root = load_tree(Some(&cache), "policy", || {
		parsed.set(true);
		Ok::<_, io::Error>(tree())
	})
	.unwrap();

	assert_eq!(root, tree());
	assert!(!parsed.get());
}

#[test]
fn corrupt_entry_is_reparsed() {
	let dir = TempDir::new().unwrap();
	let cache = PolicyTreeCache::new(dir.path());
	std::fs::write(cache.entry_path("policy").unwrap(), b"garbage").unwrap();

	let root = load_tree(Some(&cache), "policy", || Ok::<_, io::Error>(tree())).unwrap();
	assert_eq!(root, tree());
	// The reparsed tree replaced the bad entry.
	assert_eq!(cache.load("policy").unwrap(), Some(tree()));
}

#[test]
fn deeply_nested_entry_is_reparsed() {
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
	std::fs::write(cache.entry_path("policy").unwrap(), bytes).unwrap();

	let root = load_tree(Some(&cache), "policy", || Ok::<_, io::Error>(tree())).unwrap();
	assert_eq!(root, tree());
	assert_eq!(cache.load("policy").unwrap(), Some(tree()));
}

#[test]
fn parse_failure_is_reported() {
	let err = load_tree(None, "policy", || {
		Err::<TreeNode, _>(io::Error::new(io::ErrorKind::InvalidData, "bad xml"))
	})
	.unwrap_err();
	match err {
		EvaluatorError::Parse(source) => assert_eq!(source.to_string(), "bad xml"),
		other => panic!("expected parse error, got {other:?}"),
	}
}

#[test]
fn bad_key_is_an_error() {
	let dir = TempDir::new().unwrap();
	let cache = PolicyTreeCache::new(dir.path());

	let err = load_tree(Some(&cache), "../escape", || Ok::<_, io::Error>(tree())).unwrap_err();
	assert!(matches!(
		err,
		EvaluatorError::Serializer(SerializerError::InvalidCacheKey(_))
	));
}

#[test]
fn evaluator_from_config_uses_cache_directory() {
	let dir = TempDir::new().unwrap();
	let config = AceConfig {
		cache: CacheConfig {
			enabled: true,
			directory: dir.path().to_path_buf(),
		},
		..AceConfig::default()
	};

	let evaluator =
		PolicyEvaluator::from_config(&config, "widgets", || Ok::<_, io::Error>(tree()), pip()).unwrap();
	assert_eq!(evaluator.root(), Some(&tree()));
	assert!(dir.path().join("widgets.bin").exists());
}

#[test]
fn disabled_cache_writes_nothing() {
	let dir = TempDir::new().unwrap();
	let config = AceConfig {
		cache: CacheConfig {
			enabled: false,
			directory: dir.path().to_path_buf(),
		},
		..AceConfig::default()
	};

	PolicyEvaluator::from_config(&config, "widgets", || Ok::<_, io::Error>(tree()), pip()).unwrap();
	assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn load_keeps_given_settings() {
	let evaluator = PolicyEvaluator::load(
		None,
		"widgets",
		|| Ok::<_, io::Error>(tree()),
		pip(),
		EvaluatorConfig::default(),
	)
	.unwrap();
	assert_eq!(evaluator.config(), &EvaluatorConfig::default());
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The policy evaluator.
//!
//! Per request:
//!
//! 1. **Extract**: list the attributes the policy tree refers to
//! 2. **Resolve**: ask the Policy Information Point for their values
//! 3. **Combine**: evaluate the tree into one [`Effect`]
//! 4. **Map**: turn the effect into a [`PolicyResult`]
//! 5. **Merge**: apply the user's [`Preference`]
//!
//! Without a policy tree every request is denied.

use ace_config::{AceConfig, EvaluatorConfig, Preference};
use ace_core::{evaluate, extract_attributes, Effect, TreeNode};
use ace_pip::{PipStatus, PolicyInformationPoint, Request};
use ace_serializer::{PolicyTreeCache, SerializerError};
use tracing::{debug, info, instrument, warn};

use crate::error::{EvaluatorError, Result};
use crate::result::{effect_to_policy_result, most_restrictive, PolicyResult};

/// Everything that went into one decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
	pub effect: Effect,
	/// Result before the preference was applied.
	pub policy_result: PolicyResult,
	pub preference: Preference,
	pub result: PolicyResult,
	pub pip_status: PipStatus,
}

#[derive(Debug, Clone)]
pub struct PolicyEvaluator {
	root: Option<TreeNode>,
	pip: PolicyInformationPoint,
	config: EvaluatorConfig,
}

impl PolicyEvaluator {
	pub fn new(root: Option<TreeNode>, pip: PolicyInformationPoint, config: EvaluatorConfig) -> Self {
		Self { root, pip, config }
	}

	/// Builds an evaluator whose tree comes from `cache` when present there,
	/// and from `parse` otherwise. A freshly parsed tree is stored in the
	/// cache.
	pub fn load<F, E>(
		cache: Option<&PolicyTreeCache>,
		key: &str,
		parse: F,
		pip: PolicyInformationPoint,
		config: EvaluatorConfig,
	) -> Result<Self>
	where
		F: FnOnce() -> std::result::Result<TreeNode, E>,
		E: std::error::Error + Send + Sync + 'static,
	{
		let root = load_tree(cache, key, parse)?;
		Ok(Self::new(Some(root), pip, config))
	}

	/// [`PolicyEvaluator::load`] with the cache and evaluator settings taken
	/// from `config`.
	pub fn from_config<F, E>(config: &AceConfig, key: &str, parse: F, pip: PolicyInformationPoint) -> Result<Self>
	where
		F: FnOnce() -> std::result::Result<TreeNode, E>,
		E: std::error::Error + Send + Sync + 'static,
	{
		let cache = config
			.cache
			.enabled
			.then(|| PolicyTreeCache::new(config.cache.directory.clone()));
		Self::load(cache.as_ref(), key, parse, pip, config.evaluator.clone())
	}

	/// [`PolicyEvaluator::from_config`] with configuration loaded from the
	/// standard sources.
	pub fn from_system_config<F, E>(key: &str, parse: F, pip: PolicyInformationPoint) -> Result<Self>
	where
		F: FnOnce() -> std::result::Result<TreeNode, E>,
		E: std::error::Error + Send + Sync + 'static,
	{
		let config = ace_config::load_config()?;
		Self::from_config(&config, key, parse, pip)
	}

	pub fn root(&self) -> Option<&TreeNode> {
		self.root.as_ref()
	}

	/// Replaces the policy tree, e.g. after the policy file changed.
	pub fn update_tree(&mut self, root: Option<TreeNode>) {
		info!(loaded = root.is_some(), "policy tree replaced");
		self.root = root;
	}

	pub fn config(&self) -> &EvaluatorConfig {
		&self.config
	}

	/// Decides `request` with the configured default preference.
	#[instrument(level = "debug", skip_all, fields(handle = request.handle(), phase = %request.phase()))]
	pub fn evaluate_request(&self, request: &Request) -> PolicyResult {
		self.decide(request, self.config.default_preference).result
	}

	/// Decides `request` with an explicit preference.
	pub fn evaluate_request_with_preference(&self, request: &Request, preference: Preference) -> PolicyResult {
		self.decide(request, preference).result
	}

	/// Decides `request` and reports the intermediate values.
	#[instrument(level = "debug", skip_all, fields(handle = request.handle(), preference = %preference))]
	pub fn decide(&self, request: &Request, preference: Preference) -> Decision {
		let Some(root) = &self.root else {
			warn!("no policy tree loaded, denying request");
			return Decision {
				effect: Effect::Error,
				policy_result: PolicyResult::Deny,
				preference,
				result: PolicyResult::Deny,
				pip_status: PipStatus::OK,
			};
		};

		let mut attributes = extract_attributes(root);
		let pip_status = self.pip.get_attributes_values(request, &mut attributes);
		if !pip_status.is_ok() {
			let failed: Vec<_> = pip_status.failed_providers().collect();
			warn!(status = %pip_status, ?failed, "attribute providers reported errors");
		}

		let effect = evaluate(root, &attributes);
		let policy_result = effect_to_policy_result(effect);
		let result = most_restrictive(preference, policy_result);

		debug!(%effect, %policy_result, %result, "request decided");
		Decision {
			effect,
			policy_result,
			preference,
			result,
			pip_status,
		}
	}
}

/// Returns the tree for `key` from `cache`, or parses and caches it.
///
/// Cache trouble other than a bad key never blocks loading: unreadable
/// entries are dropped and a failed store is logged.
pub fn load_tree<F, E>(cache: Option<&PolicyTreeCache>, key: &str, parse: F) -> Result<TreeNode>
where
	F: FnOnce() -> std::result::Result<TreeNode, E>,
	E: std::error::Error + Send + Sync + 'static,
{
	if let Some(cache) = cache {
		match cache.load(key) {
			Ok(Some(root)) => {
				info!(key, "policy tree loaded from cache");
				return Ok(root);
			}
			Ok(None) => debug!(key, "policy tree not cached"),
			Err(e @ SerializerError::InvalidCacheKey(_)) => return Err(e.into()),
			Err(e) => {
				warn!(key, error = %e, "unreadable cache entry, reparsing policy");
				if let Err(e) = cache.invalidate(key) {
					warn!(key, error = %e, "failed to drop cache entry");
				}
			}
		}
	}

	let root = parse().map_err(|e| EvaluatorError::Parse(Box::new(e)))?;
	info!(key, kind = %root.kind(), "policy tree parsed");

	if let Some(cache) = cache {
		if let Err(e) = cache.store(key, &root) {
			warn!(key, error = %e, "failed to cache policy tree");
		}
	}
	Ok(root)
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for the ACE policy decision point.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`ACE_*`)
//!
//! # Usage
//!
//! ```ignore
//! use ace_config::load_config;
//!
//! let config = load_config()?;
//! println!("caching policy trees in {}", config.cache.directory.display());
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::AceConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AceConfig {
	pub logging: LoggingConfig,
	pub cache: CacheConfig,
	pub evaluator: EvaluatorConfig,
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`ACE_*`)
/// 2. Config file (`/etc/ace/ace.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<AceConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	];
	load_from_sources(sources)
}

/// Load configuration from environment only (for testing or simple deployments).
pub fn load_config_from_env() -> Result<AceConfig, ConfigError> {
	let mut merged = AceConfigLayer::default();
	merged.merge(EnvSource.load()?);
	finalize(merged)
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(config_path: impl Into<std::path::PathBuf>) -> Result<AceConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	];
	load_from_sources(sources)
}

/// Merge the given sources in precedence order and finalize.
pub fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<AceConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = AceConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: AceConfigLayer) -> Result<AceConfig, ConfigError> {
	let logging = layer.logging.unwrap_or_default().finalize();
	let cache = layer.cache.unwrap_or_default().finalize();
	let evaluator = layer.evaluator.unwrap_or_default().finalize();

	validate_config(&cache)?;

	info!(
		log_level = %logging.level,
		log_format = %logging.format,
		cache_enabled = cache.enabled,
		cache_dir = %cache.directory.display(),
		default_preference = %evaluator.default_preference,
		"ACE configuration loaded"
	);

	Ok(AceConfig {
		logging,
		cache,
		evaluator,
	})
}

/// Validate cross-field configuration rules.
fn validate_config(cache: &CacheConfig) -> Result<(), ConfigError> {
	if cache.enabled && cache.directory.as_os_str().is_empty() {
		return Err(ConfigError::Validation(
			"the policy tree cache is enabled but no cache directory is set. \
			 Set ACE_CACHE_DIR or disable the cache with ACE_CACHE_ENABLED=0."
				.to_string(),
		));
	}

	Ok(())
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy tree cache configuration section.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_directory() -> PathBuf {
	PathBuf::from("/var/cache/ace")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CacheConfigLayer {
	pub enabled: Option<bool>,
	pub directory: Option<PathBuf>,
}

impl CacheConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.enabled.is_some() {
			self.enabled = other.enabled;
		}
		if other.directory.is_some() {
			self.directory = other.directory;
		}
	}

	pub fn finalize(self) -> CacheConfig {
		CacheConfig {
			enabled: self.enabled.unwrap_or(true),
			directory: self.directory.unwrap_or_else(default_directory),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheConfig {
	pub enabled: bool,
	pub directory: PathBuf,
}

impl Default for CacheConfig {
	fn default() -> Self {
		Self {
			enabled: true,
			directory: default_directory(),
		}
	}
}

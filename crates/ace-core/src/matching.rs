// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Attribute predicates: the leaves of targets and conditions.
//!
//! An [`AttributeMatch`] names a request attribute and lists the values a
//! policy expects. The request value is optionally reduced to one URI
//! component ([`Modifier`]) and then compared with each expected value using
//! a [`MatchFunction`]. One hit is enough.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{LazyLock, Mutex, PoisonError};
use tracing::warn;
use url::Url;

use crate::attribute::{AttributeKind, AttributeSet, MatchResult};

/// Comparison applied between a request value and an expected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchFunction {
	/// Exact string equality.
	Equal,
	/// Shell-style pattern: `*` matches any run, `?` a single character.
	Glob,
	/// Regular expression, matched against the whole value.
	Regexp,
}

impl MatchFunction {
	/// Compares `value` with `pattern`. `None` means the pattern is unusable.
	pub fn apply(self, pattern: &str, value: &str) -> Option<bool> {
		match self {
			MatchFunction::Equal => Some(pattern == value),
			MatchFunction::Glob => compile_anchored(&glob_to_regex(pattern)).map(|re| re.is_match(value)),
			MatchFunction::Regexp => {
				compile_anchored(&format!("(?:{pattern})")).map(|re| re.is_match(value))
			}
		}
	}
}

fn glob_to_regex(pattern: &str) -> String {
	let mut out = String::with_capacity(pattern.len() * 2);
	for c in pattern.chars() {
		match c {
			'*' => out.push_str(".*"),
			'?' => out.push('.'),
			other => out.push_str(&regex::escape(other.encode_utf8(&mut [0u8; 4]))),
		}
	}
	out
}

/// Most patterns kept compiled at once; the cache starts over when full.
const MAX_CACHED_PATTERNS: usize = 1024;

/// Compiled anchored patterns by source. `None` records a pattern that
/// failed to compile.
static PATTERNS: LazyLock<Mutex<HashMap<String, Option<Regex>>>> =
	LazyLock::new(|| Mutex::new(HashMap::new()));

fn compile_anchored(body: &str) -> Option<Regex> {
	let source = format!("^{body}$");
	if let Some(cached) = PATTERNS.lock().unwrap_or_else(PoisonError::into_inner).get(&source) {
		return cached.clone();
	}

	let compiled = match Regex::new(&source) {
		Ok(re) => Some(re),
		Err(e) => {
			warn!(pattern = %body, error = %e, "invalid match pattern");
			None
		}
	};

	let mut patterns = PATTERNS.lock().unwrap_or_else(PoisonError::into_inner);
	if patterns.len() >= MAX_CACHED_PATTERNS {
		patterns.clear();
	}
	patterns.insert(source, compiled.clone());
	compiled
}

/// URI component extracted from the request value before comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
	/// Compare the value as-is.
	#[default]
	None,
	Scheme,
	/// `user@host:port`, without the scheme.
	Authority,
	/// `scheme://user@host:port`.
	SchemeAuthority,
	Host,
	Path,
}

impl Modifier {
	/// Reduces `value` to the selected component.
	///
	/// Returns `None` when the value is not a URI or lacks the component.
	pub fn apply(self, value: &str) -> Option<String> {
		if self == Modifier::None {
			return Some(value.to_string());
		}

		let url = Url::parse(value).ok()?;
		match self {
			Modifier::None => Some(value.to_string()),
			Modifier::Scheme => Some(url.scheme().to_string()),
			Modifier::Host => url.host_str().map(str::to_string),
			Modifier::Path => Some(url.path().to_string()),
			Modifier::Authority => authority(&url),
			Modifier::SchemeAuthority => authority(&url).map(|a| format!("{}://{a}", url.scheme())),
		}
	}
}

fn authority(url: &Url) -> Option<String> {
	let host = url.host_str()?;
	let mut out = String::new();
	if !url.username().is_empty() {
		out.push_str(url.username());
		if let Some(password) = url.password() {
			out.push(':');
			out.push_str(password);
		}
		out.push('@');
	}
	out.push_str(host);
	if let Some(port) = url.port() {
		out.push(':');
		out.push_str(&port.to_string());
	}
	Some(out)
}

/// A single attribute comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeMatch {
	pub name: String,
	pub kind: AttributeKind,
	/// Expected values; any one of them matching is a match.
	pub values: Vec<String>,
	pub function: MatchFunction,
	#[serde(default)]
	pub modifier: Modifier,
}

impl AttributeMatch {
	/// Creates an equality predicate with a single expected value.
	pub fn equal(name: impl Into<String>, kind: AttributeKind, value: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			kind,
			values: vec![value.into()],
			function: MatchFunction::Equal,
			modifier: Modifier::None,
		}
	}

	/// Creates a predicate with the given function and no expected values yet.
	pub fn new(name: impl Into<String>, kind: AttributeKind, function: MatchFunction) -> Self {
		Self {
			name: name.into(),
			kind,
			values: Vec::new(),
			function,
			modifier: Modifier::None,
		}
	}

	/// Builder: add an expected value.
	pub fn with_value(mut self, value: impl Into<String>) -> Self {
		self.values.push(value.into());
		self
	}

	/// Builder: set the URI modifier.
	pub fn with_modifier(mut self, modifier: Modifier) -> Self {
		self.modifier = modifier;
		self
	}

	/// Evaluates the predicate against the request attributes.
	///
	/// An attribute missing from the set, or present with no value, does not
	/// match. A flagged attribute is undetermined whatever its value.
	pub fn evaluate(&self, attributes: &AttributeSet) -> MatchResult {
		let Some(attribute) = attributes.get(&self.name, self.kind) else {
			return MatchResult::NoMatch;
		};

		if attribute.undetermined {
			return MatchResult::Undetermined;
		}

		let Some(raw) = attribute.value.as_deref() else {
			return MatchResult::NoMatch;
		};

		let Some(value) = self.modifier.apply(raw) else {
			return MatchResult::NoMatch;
		};

		let mut result = MatchResult::NoMatch;
		for expected in &self.values {
			match self.function.apply(expected, &value) {
				Some(true) => return MatchResult::Match,
				Some(false) => {}
				None => result = MatchResult::Undetermined,
			}
		}
		result
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Attribute providers.
//!
//! A provider answers a batch of attribute queries for one request, filling
//! in the values it knows and leaving the rest unresolved. The PIP owns one
//! provider per attribute kind; function parameters come from the request
//! itself.

use std::collections::HashMap;

use crate::request::{Handle, Request};

/// One attribute lookup. Providers set `value` in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeQuery {
	pub name: String,
	pub value: Option<String>,
}

impl AttributeQuery {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			value: None,
		}
	}

	pub fn is_resolved(&self) -> bool {
		self.value.is_some()
	}
}

/// Source of attribute values for one attribute kind.
///
/// Calls are synchronous and may block. The returned status is
/// provider-defined; zero means success and only the low byte is kept.
pub trait AttributeProvider: Send + Sync {
	fn get_attributes_values(&self, request: &Request, queries: &mut [AttributeQuery]) -> u32;
}

/// In-memory provider backed by name/value maps.
///
/// Values registered for a specific handle take priority over values shared
/// by every request.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
	shared: HashMap<String, String>,
	per_handle: HashMap<Handle, HashMap<String, String>>,
	status: u32,
}

impl StaticProvider {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder: a value answered for every request.
	pub fn with_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.shared.insert(name.into(), value.into());
		self
	}

	/// Builder: a value answered only for requests from `handle`.
	pub fn with_handle_value(
		mut self,
		handle: Handle,
		name: impl Into<String>,
		value: impl Into<String>,
	) -> Self {
		self.per_handle
			.entry(handle)
			.or_default()
			.insert(name.into(), value.into());
		self
	}

	/// Builder: the status returned from every lookup.
	pub fn with_status(mut self, status: u32) -> Self {
		self.status = status;
		self
	}

	fn lookup(&self, handle: Handle, name: &str) -> Option<&String> {
		self.per_handle
			.get(&handle)
			.and_then(|values| values.get(name))
			.or_else(|| self.shared.get(name))
	}
}

impl AttributeProvider for StaticProvider {
	fn get_attributes_values(&self, request: &Request, queries: &mut [AttributeQuery]) -> u32 {
		for query in queries.iter_mut() {
			if let Some(value) = self.lookup(request.handle(), &query.name) {
				query.value = Some(value.clone());
			}
		}
		self.status
	}
}

/// Parameters of an intercepted API call.
///
/// A key may be added more than once; lookups answer with the first value.
#[derive(Debug, Clone, Default)]
pub struct FunctionParams {
	params: Vec<(String, String)>,
}

impl FunctionParams {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
		self.params.push((key.into(), value.into()));
	}

	/// Builder form of [`FunctionParams::add`].
	pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.add(key, value);
		self
	}

	pub fn get(&self, key: &str) -> Option<&str> {
		self.params
			.iter()
			.find(|(k, _)| k == key)
			.map(|(_, v)| v.as_str())
	}

	/// All values given for `key`, in insertion order.
	pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
		self.params
			.iter()
			.filter(move |(k, _)| k == key)
			.map(|(_, v)| v.as_str())
	}

	pub fn len(&self) -> usize {
		self.params.len()
	}

	pub fn is_empty(&self) -> bool {
		self.params.is_empty()
	}
}

impl AttributeProvider for FunctionParams {
	fn get_attributes_values(&self, _request: &Request, queries: &mut [AttributeQuery]) -> u32 {
		for query in queries.iter_mut() {
			if let Some(value) = self.get(&query.name) {
				query.value = Some(value.to_string());
			}
		}
		0
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::request::ExecutionPhase;

	fn queries(names: &[&str]) -> Vec<AttributeQuery> {
		names.iter().map(|n| AttributeQuery::new(*n)).collect()
	}

	#[test]
	fn static_provider_fills_known_names() {
		let provider = StaticProvider::new().with_value("id", "w1").with_status(4);
		let mut q = queries(&["id", "unknown"]);
		let status = provider.get_attributes_values(&Request::new(1, ExecutionPhase::Invoke), &mut q);
		assert_eq!(status, 4);
		assert_eq!(q[0].value.as_deref(), Some("w1"));
		assert!(!q[1].is_resolved());
	}

	#[test]
	fn handle_values_override_shared() {
		let provider = StaticProvider::new()
			.with_value("version", "1.0")
			.with_handle_value(7, "version", "2.0");
		let mut q = queries(&["version"]);
		provider.get_attributes_values(&Request::new(7, ExecutionPhase::Start), &mut q);
		assert_eq!(q[0].value.as_deref(), Some("2.0"));

		let mut q = queries(&["version"]);
		provider.get_attributes_values(&Request::new(8, ExecutionPhase::Start), &mut q);
		assert_eq!(q[0].value.as_deref(), Some("1.0"));
	}

	#[test]
	fn function_params_answer_first_value() {
		let params = FunctionParams::new()
			.with("param:name", "first")
			.with("param:name", "second");
		assert_eq!(params.get_all("param:name").collect::<Vec<_>>(), vec!["first", "second"]);

		let mut q = queries(&["param:name", "param:other"]);
		let status = params.get_attributes_values(&Request::new(1, ExecutionPhase::Invoke), &mut q);
		assert_eq!(status, 0);
		assert_eq!(q[0].value.as_deref(), Some("first"));
		assert_eq!(q[1].value, None);
	}
}

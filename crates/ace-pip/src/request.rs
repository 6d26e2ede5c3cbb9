// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Access requests.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::provider::AttributeProvider;

/// Identifies the application a request is made on behalf of.
pub type Handle = i32;

/// Lifecycle phase the requesting application is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionPhase {
	#[default]
	Unknown,
	Install,
	Start,
	Invoke,
}

impl fmt::Display for ExecutionPhase {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ExecutionPhase::Unknown => write!(f, "unknown"),
			ExecutionPhase::Install => write!(f, "install"),
			ExecutionPhase::Start => write!(f, "start"),
			ExecutionPhase::Invoke => write!(f, "invoke"),
		}
	}
}

/// One access request handed to the PIP and its providers.
///
/// Requests raised by an intercepted API call carry the call's parameters,
/// which resolve `FunctionParam` attributes.
#[derive(Clone)]
pub struct Request {
	handle: Handle,
	phase: ExecutionPhase,
	function_params: Option<Arc<dyn AttributeProvider>>,
}

impl Request {
	pub fn new(handle: Handle, phase: ExecutionPhase) -> Self {
		Self {
			handle,
			phase,
			function_params: None,
		}
	}

	/// Builder: attach the intercepted call's parameters.
	pub fn with_function_params(mut self, params: Arc<dyn AttributeProvider>) -> Self {
		self.function_params = Some(params);
		self
	}

	pub fn handle(&self) -> Handle {
		self.handle
	}

	pub fn phase(&self) -> ExecutionPhase {
		self.phase
	}

	pub fn function_params(&self) -> Option<&dyn AttributeProvider> {
		self.function_params.as_deref()
	}
}

impl fmt::Debug for Request {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Request")
			.field("handle", &self.handle)
			.field("phase", &self.phase)
			.field("function_params", &self.function_params.is_some())
			.finish()
	}
}

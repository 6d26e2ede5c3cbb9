// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The Policy Information Point.

use std::fmt;
use std::sync::Arc;

use ace_core::{AttributeKind, AttributeSet};
use tracing::{debug, instrument};

use crate::provider::{AttributeProvider, AttributeQuery};
use crate::request::Request;
use crate::status::PipStatus;

/// Resolves attribute values from external providers before evaluation.
///
/// Holds no per-call state, so one instance can serve many threads.
#[derive(Clone)]
pub struct PolicyInformationPoint {
	subject: Arc<dyn AttributeProvider>,
	resource: Arc<dyn AttributeProvider>,
	environment: Arc<dyn AttributeProvider>,
}

impl PolicyInformationPoint {
	pub fn new(
		subject: Arc<dyn AttributeProvider>,
		resource: Arc<dyn AttributeProvider>,
		environment: Arc<dyn AttributeProvider>,
	) -> Self {
		Self {
			subject,
			resource,
			environment,
		}
	}

	/// Fills in `attributes` for `request`.
	///
	/// Attributes are grouped by kind and each group goes to its provider in
	/// one batch. Anything a provider leaves unresolved is flagged
	/// undetermined and keeps its previous value. `FunctionParam` attributes
	/// are asked of the request's own parameters; without them the group is
	/// not queried and adds no status bits, but its attributes are still
	/// flagged.
	///
	/// Returns the providers' statuses, each shifted into its own byte.
	#[instrument(
		level = "debug",
		skip_all,
		fields(handle = request.handle(), phase = %request.phase(), attributes = attributes.len())
	)]
	pub fn get_attributes_values(&self, request: &Request, attributes: &mut AttributeSet) -> PipStatus {
		let mut status = PipStatus::OK;

		for &kind in AttributeKind::all() {
			let mut queries: Vec<AttributeQuery> = attributes
				.of_kind(kind)
				.map(|a| AttributeQuery::new(a.name.clone()))
				.collect();
			if queries.is_empty() {
				continue;
			}

			match self.provider_for(kind, request) {
				Some(provider) => {
					let raw = provider.get_attributes_values(request, &mut queries);
					status |= PipStatus::from_provider(kind, raw);
				}
				None => debug!(%kind, "request carries no function parameters"),
			}

			apply_answers(kind, queries, attributes);
		}

		debug!(%status, "attribute resolution finished");
		status
	}

	fn provider_for<'a>(&'a self, kind: AttributeKind, request: &'a Request) -> Option<&'a dyn AttributeProvider> {
		match kind {
			AttributeKind::Subject => Some(self.subject.as_ref()),
			AttributeKind::Resource => Some(self.resource.as_ref()),
			AttributeKind::Environment => Some(self.environment.as_ref()),
			AttributeKind::FunctionParam => request.function_params(),
		}
	}
}

fn apply_answers(kind: AttributeKind, queries: Vec<AttributeQuery>, attributes: &mut AttributeSet) {
	for query in queries {
		let Some(attribute) = attributes.get_mut(&query.name, kind) else {
			continue;
		};
		match query.value {
			Some(value) => attribute.value = Some(value),
			None => {
				debug!(name = %query.name, %kind, "attribute undetermined");
				attribute.set_undetermined();
			}
		}
	}
}

impl fmt::Debug for PolicyInformationPoint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PolicyInformationPoint").finish_non_exhaustive()
	}
}

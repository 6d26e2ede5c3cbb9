// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use ace_config::ConfigError;
use ace_serializer::SerializerError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EvaluatorError>;

#[derive(Debug, Error)]
pub enum EvaluatorError {
	#[error("configuration error: {0}")]
	Config(#[from] ConfigError),

	#[error("policy cache error: {0}")]
	Serializer(#[from] SerializerError),

	#[error("failed to parse policy: {0}")]
	Parse(#[source] Box<dyn std::error::Error + Send + Sync>),

	#[error("failed to install tracing subscriber: {0}")]
	Tracing(#[from] tracing_subscriber::util::TryInitError),
}

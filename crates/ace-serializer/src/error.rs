// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use ace_core::TreeError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SerializerError>;

#[derive(Debug, Error)]
pub enum SerializerError {
	/// Includes stream underrun, reported as `UnexpectedEof`.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("unknown {what} tag: {tag}")]
	UnknownTag { what: &'static str, tag: u8 },

	#[error("invalid UTF-8 in string: {0}")]
	InvalidUtf8(#[from] std::string::FromUtf8Error),

	#[error("length {len} exceeds limit of {limit}")]
	LengthOverLimit { len: u32, limit: u32 },

	#[error("bad magic: expected ACEP, found {0:?}")]
	BadMagic([u8; 4]),

	#[error("unsupported format version {found} (expected {expected})")]
	UnsupportedVersion { found: u8, expected: u8 },

	#[error("invalid policy tree: {0}")]
	InvalidTree(String),

	#[error("input nested deeper than {limit} levels")]
	TooDeep { limit: usize },

	#[error("invalid cache key: {0:?}")]
	InvalidCacheKey(String),
}

impl SerializerError {
	/// True for envelope mismatches, which mean the data was written by a
	/// different format and should be discarded rather than reported.
	pub fn is_stale(&self) -> bool {
		matches!(
			self,
			SerializerError::BadMagic(_) | SerializerError::UnsupportedVersion { .. }
		)
	}
}

impl From<TreeError> for SerializerError {
	fn from(e: TreeError) -> Self {
		SerializerError::InvalidTree(e.to_string())
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Binary persistence for policy trees.
//!
//! This crate provides:
//! - [`Persist`]: a compact, tag-validated binary encoding for every policy
//!   model type
//! - [`write_tree`] / [`read_tree`]: a versioned envelope around a root node
//! - [`PolicyTreeCache`]: a directory of encoded trees keyed by policy file
//!
//! # Usage
//!
//! ```ignore
//! use ace_serializer::PolicyTreeCache;
//!
//! let cache = PolicyTreeCache::new("/var/cache/ace");
//! cache.store("policy.xml", &root)?;
//! let cached = cache.load("policy.xml")?;
//! ```

pub mod cache;
pub mod codec;
pub mod envelope;
pub mod error;
pub mod model;

pub use cache::PolicyTreeCache;
pub use codec::{deserialize, from_bytes, serialize, to_bytes, write_slice, Persist, MAX_LENGTH};
pub use envelope::{read_tree, write_tree, FORMAT_VERSION, MAGIC};
pub use error::{Result, SerializerError};
pub use model::MAX_DEPTH;

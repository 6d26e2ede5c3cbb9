// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Versioned framing for a persisted policy tree.
//!
//! ```text
//! ┌──────────┬─────────┬──────────────────────┐
//! │ "ACEP"   │ version │ root TreeNode        │
//! │ 4 bytes  │ 1 byte  │ tag + body           │
//! └──────────┴─────────┴──────────────────────┘
//! ```

use std::io::{Read, Write};

use ace_core::TreeNode;
use tracing::debug;

use crate::codec::Persist;
use crate::error::{Result, SerializerError};

pub const MAGIC: [u8; 4] = *b"ACEP";
pub const FORMAT_VERSION: u8 = 1;

/// Writes `root` with the envelope header.
pub fn write_tree<W: Write + ?Sized>(w: &mut W, root: &TreeNode) -> Result<()> {
	w.write_all(&MAGIC)?;
	FORMAT_VERSION.serialize(w)?;
	root.serialize(w)?;
	debug!(kind = %root.kind(), "policy tree written");
	Ok(())
}

/// Reads a tree written by [`write_tree`].
///
/// A foreign magic or another format version fails with an error for which
/// [`SerializerError::is_stale`] is true.
pub fn read_tree<R: Read + ?Sized>(r: &mut R) -> Result<TreeNode> {
	let mut magic = [0u8; 4];
	r.read_exact(&mut magic)?;
	if magic != MAGIC {
		return Err(SerializerError::BadMagic(magic));
	}

	let version = u8::deserialize(r)?;
	if version != FORMAT_VERSION {
		return Err(SerializerError::UnsupportedVersion {
			found: version,
			expected: FORMAT_VERSION,
		});
	}

	let root = TreeNode::deserialize(r)?;
	debug!(kind = %root.kind(), "policy tree read");
	Ok(root)
}

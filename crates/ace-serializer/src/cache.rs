// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! On-disk cache of parsed policy trees.
//!
//! Each entry lives in `<directory>/<key>.bin`. Keys identify a policy file
//! and are chosen by the caller.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use ace_core::TreeNode;
use tracing::{debug, info, instrument, warn};

use crate::envelope::{read_tree, write_tree};
use crate::error::{Result, SerializerError};

#[derive(Debug, Clone)]
pub struct PolicyTreeCache {
	directory: PathBuf,
}

impl PolicyTreeCache {
	pub fn new(directory: impl Into<PathBuf>) -> Self {
		Self {
			directory: directory.into(),
		}
	}

	pub fn directory(&self) -> &Path {
		&self.directory
	}

	/// Path of the entry for `key`.
	pub fn entry_path(&self, key: &str) -> Result<PathBuf> {
		validate_key(key)?;
		Ok(self.directory.join(format!("{key}.bin")))
	}

	/// Writes `root` under `key`, replacing any previous entry.
	///
	/// The tree is written to a temporary file first and renamed into place,
	/// so readers never see a partial entry.
	#[instrument(level = "debug", skip(self, root), fields(dir = %self.directory.display()))]
	pub fn store(&self, key: &str, root: &TreeNode) -> Result<PathBuf> {
		let path = self.entry_path(key)?;
		fs::create_dir_all(&self.directory)?;

		let tmp = self.directory.join(format!(".{key}.bin.tmp"));
		let written = write_entry(&tmp, root).and_then(|()| fs::rename(&tmp, &path).map_err(SerializerError::from));
		if let Err(e) = written {
			if let Err(cleanup) = remove_if_present(&tmp) {
				warn!(path = %tmp.display(), error = %cleanup, "failed to remove partial cache entry");
			}
			return Err(e);
		}

		info!(path = %path.display(), "policy tree cached");
		Ok(path)
	}

	/// Reads the entry for `key`.
	///
	/// Returns `Ok(None)` when there is no entry, or when the entry was
	/// written in another format; such an entry is deleted.
	#[instrument(level = "debug", skip(self), fields(dir = %self.directory.display()))]
	pub fn load(&self, key: &str) -> Result<Option<TreeNode>> {
		let path = self.entry_path(key)?;
		let file = match File::open(&path) {
			Ok(file) => file,
			Err(e) if e.kind() == ErrorKind::NotFound => {
				debug!("cache miss");
				return Ok(None);
			}
			Err(e) => return Err(e.into()),
		};

		match read_tree(&mut BufReader::new(file)) {
			Ok(root) => {
				debug!(kind = %root.kind(), "cache hit");
				Ok(Some(root))
			}
			Err(e) if e.is_stale() => {
				warn!(path = %path.display(), error = %e, "discarding stale cache entry");
				remove_if_present(&path)?;
				Ok(None)
			}
			Err(e) => Err(e),
		}
	}

	/// Removes the entry for `key`. Returns whether one existed.
	pub fn invalidate(&self, key: &str) -> Result<bool> {
		let path = self.entry_path(key)?;
		let removed = remove_if_present(&path)?;
		if removed {
			info!(path = %path.display(), "cache entry invalidated");
		}
		Ok(removed)
	}
}

fn write_entry(tmp: &Path, root: &TreeNode) -> Result<()> {
	let file = File::create(tmp)?;
	let mut writer = BufWriter::new(file);
	write_tree(&mut writer, root)?;
	writer.flush()?;
	writer.get_ref().sync_all()?;
	Ok(())
}

fn remove_if_present(path: &Path) -> Result<bool> {
	match fs::remove_file(path) {
		Ok(()) => Ok(true),
		Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
		Err(e) => Err(e.into()),
	}
}

fn validate_key(key: &str) -> Result<()> {
	let valid = !key.is_empty()
		&& key
			.chars()
			.all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
	if valid {
		Ok(())
	} else {
		Err(SerializerError::InvalidCacheKey(key.to_string()))
	}
}

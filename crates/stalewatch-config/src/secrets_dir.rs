// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Versioned secret files.
//!
//! A secrets directory (Docker swarm mounts them at `/run/secrets/`) holds one
//! file per overridden value. A file matches a key when its name starts with
//! the key, so `AZURE_STORAGE_KEY`, `AZURE_STORAGE_KEY_1` and
//! `AZURE_STORAGE_KEY_v2` all match `AZURE_STORAGE_KEY`. Among matches the
//! highest trailing number wins; a name without one is version 0. Equal
//! versions resolve to the lexicographically smallest name.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::ConfigError;

pub const DEFAULT_SECRETS_PATH: &str = "/run/secrets/";

#[derive(Debug, Clone)]
pub struct SecretsDir {
	path: PathBuf,
	files: Vec<String>,
}

impl SecretsDir {
	/// List the directory once. A missing directory yields no overrides.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
		let path = path.into();
		if !path.is_dir() {
			debug!(path = %path.display(), "secrets directory not found, skipping");
			return Ok(Self {
				path,
				files: Vec::new(),
			});
		}

		let entries = fs::read_dir(&path).map_err(|e| ConfigError::SecretsDir {
			path: path.clone(),
			source: e,
		})?;

		let mut files = Vec::new();
		for entry in entries {
			let entry = entry.map_err(|e| ConfigError::SecretsDir {
				path: path.clone(),
				source: e,
			})?;
			if !entry.path().is_file() {
				continue;
			}
			if let Some(name) = entry.file_name().to_str() {
				files.push(name.to_string());
			}
		}

		debug!(path = %path.display(), count = files.len(), "listed secrets directory");
		Ok(Self { path, files })
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// File name that would be used for `key`, if any.
	pub fn select(&self, key: &str) -> Option<&str> {
		self.files
			.iter()
			.filter(|name| name.starts_with(key))
			.max_by(|a, b| compare_versions(a, b))
			.map(String::as_str)
	}

	/// Trimmed content of the selected file. Empty files count as absent.
	pub fn resolve(&self, key: &str) -> Result<Option<String>, ConfigError> {
		let Some(name) = self.select(key) else {
			return Ok(None);
		};

		let file = self.path.join(name);
		let content = fs::read_to_string(&file).map_err(|e| ConfigError::FileRead {
			path: file.clone(),
			source: e,
		})?;
		trace!(key, file = %name, "secret file override");

		let value = content.trim();
		Ok((!value.is_empty()).then(|| value.to_string()))
	}
}

/// Trailing decimal digits of a file name, 0 when there are none.
pub fn secret_version(name: &str) -> u64 {
	let digits = name.len() - name.trim_end_matches(|c: char| c.is_ascii_digit()).len();
	name[name.len() - digits..].parse().unwrap_or(0)
}

fn compare_versions(a: &str, b: &str) -> Ordering {
	secret_version(a)
		.cmp(&secret_version(b))
		.then_with(|| b.cmp(a))
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Blob storage configuration for the tiles probe.

use serde::Deserialize;
use stalewatch_common_secret::SecretString;

pub const DEFAULT_BLOB_NAME: &str = "tiles.mbtiles";
pub const DEFAULT_TIMEOUT_SECS: u64 = 5 * 60;

/// Blob storage configuration (runtime, fully resolved).
#[derive(Debug, Clone, PartialEq)]
pub struct StorageConfig {
	pub account: String,
	pub key: Option<SecretString>,
	pub container: String,
	pub blob_name: String,
	/// Service endpoint, `https://{account}.blob.core.windows.net` unless overridden.
	pub endpoint: String,
	pub timeout_secs: u64,
}

impl Default for StorageConfig {
	fn default() -> Self {
		StorageConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfigLayer {
	#[serde(default)]
	pub account: Option<String>,
	#[serde(default)]
	pub key: Option<SecretString>,
	#[serde(default)]
	pub container: Option<String>,
	#[serde(default)]
	pub blob_name: Option<String>,
	#[serde(default)]
	pub endpoint: Option<String>,
	#[serde(default)]
	pub timeout_secs: Option<u64>,
}

impl StorageConfigLayer {
	pub fn merge(&mut self, other: StorageConfigLayer) {
		if other.account.is_some() {
			self.account = other.account;
		}
		if other.key.is_some() {
			self.key = other.key;
		}
		if other.container.is_some() {
			self.container = other.container;
		}
		if other.blob_name.is_some() {
			self.blob_name = other.blob_name;
		}
		if other.endpoint.is_some() {
			self.endpoint = other.endpoint;
		}
		if other.timeout_secs.is_some() {
			self.timeout_secs = other.timeout_secs;
		}
	}

	pub fn finalize(self) -> StorageConfig {
		let account = self.account.unwrap_or_default();
		let endpoint = self
			.endpoint
			.unwrap_or_else(|| format!("https://{account}.blob.core.windows.net"));
		StorageConfig {
			endpoint: endpoint.trim_end_matches('/').to_string(),
			account,
			key: self.key.filter(|k| !k.is_blank()),
			container: self.container.unwrap_or_default(),
			blob_name: self
				.blob_name
				.unwrap_or_else(|| DEFAULT_BLOB_NAME.to_string()),
			timeout_secs: self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
		}
	}
}

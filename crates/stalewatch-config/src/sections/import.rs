// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Import pipeline status page configuration.

use serde::Deserialize;
use stalewatch_common_secret::SecretString;

use crate::error::ConfigError;

pub const DEFAULT_DISPLAY_NAME: &str = "Jore-import";
pub const DEFAULT_START_MARKER: &str = "The import started at <strong>";
pub const DEFAULT_TERMINATOR: &str = "UTC";

/// One status page to check, e.g. `dev` at `https://dev.kartat.hsl.fi/jore-import/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImportEndpointConfig {
	pub label: String,
	pub url: String,
}

impl ImportEndpointConfig {
	pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
		Self {
			label: label.into(),
			url: url.into(),
		}
	}
}

fn default_endpoints() -> Vec<ImportEndpointConfig> {
	vec![
		ImportEndpointConfig::new("dev", "https://dev.kartat.hsl.fi/jore-import/"),
		ImportEndpointConfig::new("stage", "https://stage.kartat.hsl.fi/jore-import/"),
		ImportEndpointConfig::new("prod", "https://prod.kartat.hsl.fi/jore-import/"),
	]
}

/// Parse a `label=url,label=url` list.
pub fn parse_endpoint_list(key: &str, value: &str) -> Result<Vec<ImportEndpointConfig>, ConfigError> {
	value
		.split(',')
		.map(str::trim)
		.filter(|entry| !entry.is_empty())
		.map(|entry| {
			let (label, url) = entry.split_once('=').ok_or_else(|| ConfigError::InvalidValue {
				key: key.to_string(),
				message: format!("expected label=url, got '{entry}'"),
			})?;
			let (label, url) = (label.trim(), url.trim());
			if label.is_empty() || url.is_empty() {
				return Err(ConfigError::InvalidValue {
					key: key.to_string(),
					message: format!("empty label or url in '{entry}'"),
				});
			}
			Ok(ImportEndpointConfig::new(label, url))
		})
		.collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportConfig {
	pub username: String,
	pub password: Option<SecretString>,
	pub endpoints: Vec<ImportEndpointConfig>,
	/// Name used in notifications, e.g. `Jore-import (dev) is not responding.`
	pub display_name: String,
	/// Text immediately preceding the start timestamp on the status page.
	pub start_marker: String,
	/// Text immediately following the start timestamp.
	pub terminator: String,
}

impl Default for ImportConfig {
	fn default() -> Self {
		ImportConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportConfigLayer {
	#[serde(default)]
	pub username: Option<String>,
	#[serde(default)]
	pub password: Option<SecretString>,
	#[serde(default)]
	pub endpoints: Option<Vec<ImportEndpointConfig>>,
	#[serde(default)]
	pub display_name: Option<String>,
	#[serde(default)]
	pub start_marker: Option<String>,
	#[serde(default)]
	pub terminator: Option<String>,
}

impl ImportConfigLayer {
	pub fn merge(&mut self, other: ImportConfigLayer) {
		if other.username.is_some() {
			self.username = other.username;
		}
		if other.password.is_some() {
			self.password = other.password;
		}
		if other.endpoints.is_some() {
			self.endpoints = other.endpoints;
		}
		if other.display_name.is_some() {
			self.display_name = other.display_name;
		}
		if other.start_marker.is_some() {
			self.start_marker = other.start_marker;
		}
		if other.terminator.is_some() {
			self.terminator = other.terminator;
		}
	}

	pub fn finalize(self) -> ImportConfig {
		ImportConfig {
			username: self.username.unwrap_or_default(),
			password: self.password,
			endpoints: self.endpoints.unwrap_or_else(default_endpoints),
			display_name: self
				.display_name
				.unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
			start_marker: self
				.start_marker
				.unwrap_or_else(|| DEFAULT_START_MARKER.to_string()),
			terminator: self
				.terminator
				.unwrap_or_else(|| DEFAULT_TERMINATOR.to_string()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_endpoints() {
		let config = ImportConfig::default();
		let labels: Vec<&str> = config.endpoints.iter().map(|e| e.label.as_str()).collect();
		assert_eq!(labels, vec!["dev", "stage", "prod"]);
		assert_eq!(config.display_name, "Jore-import");
		assert_eq!(config.start_marker, "The import started at <strong>");
		assert_eq!(config.terminator, "UTC");
	}

	#[test]
	fn test_parse_endpoint_list() {
		let endpoints = parse_endpoint_list(
			"JORE_IMPORT_ENDPOINTS",
			" dev=https://dev.example.com/ , prod=https://prod.example.com/,",
		)
		.unwrap();
		assert_eq!(
			endpoints,
			vec![
				ImportEndpointConfig::new("dev", "https://dev.example.com/"),
				ImportEndpointConfig::new("prod", "https://prod.example.com/"),
			]
		);
	}

	#[test]
	fn test_parse_endpoint_list_url_may_contain_equals() {
		let endpoints = parse_endpoint_list("K", "dev=https://x.example.com/?a=b").unwrap();
		assert_eq!(endpoints[0].url, "https://x.example.com/?a=b");
	}

	#[test]
	fn test_parse_endpoint_list_rejects_missing_separator() {
		let err = parse_endpoint_list("JORE_IMPORT_ENDPOINTS", "https://dev.example.com/").unwrap_err();
		assert!(matches!(err, ConfigError::InvalidValue { .. }));
	}

	#[test]
	fn test_deserialize_endpoint_tables() {
		let layer: ImportConfigLayer = toml::from_str(
			r#"
username = "importer"

[[endpoints]]
label = "dev"
url = "https://dev.example.com/"
"#,
		)
		.unwrap();
		assert_eq!(layer.username.as_deref(), Some("importer"));
		assert_eq!(
			layer.endpoints,
			Some(vec![ImportEndpointConfig::new("dev", "https://dev.example.com/")])
		);
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: defaults, TOML file, environment and secrets directory.
//!
//! The environment and the secrets directory share one key table (see
//! [`keys`]); a secret file named after a key overrides the variable.

use std::path::PathBuf;

use stalewatch_common_secret::SecretString;
use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::MonitorConfigLayer;
use crate::secrets_dir::{SecretsDir, DEFAULT_SECRETS_PATH};
use crate::sections::import::parse_endpoint_list;
use crate::sections::{
	HttpConfigLayer, ImportConfigLayer, LoggingConfigLayer, NotifyConfigLayer, RegistryConfigLayer,
	ScheduleConfigLayer, StorageConfigLayer,
};

pub const DEFAULT_CONFIG_PATH: &str = "/etc/stalewatch/monitor.toml";

/// Variable names understood by [`EnvSource`] and [`SecretsDirSource`].
pub mod keys {
	pub const CONFIG_FILE: &str = "STALEWATCH_CONFIG_FILE";
	pub const SECRETS_PATH: &str = "SECRETS_PATH";

	pub const AZURE_TILES_CONTAINER: &str = "AZURE_TILES_CONTAINER";
	pub const AZURE_STORAGE_ACCOUNT: &str = "AZURE_STORAGE_ACCOUNT";
	pub const AZURE_STORAGE_KEY: &str = "AZURE_STORAGE_KEY";
	pub const AZURE_TILES_BLOB: &str = "AZURE_TILES_BLOB";
	pub const AZURE_BLOB_ENDPOINT: &str = "AZURE_BLOB_ENDPOINT";
	pub const AZURE_BLOB_TIMEOUT_SECS: &str = "AZURE_BLOB_TIMEOUT_SECS";

	pub const SLACK_WEBHOOK_URL: &str = "SLACK_WEBHOOK_URL";
	pub const SLACK_MONITOR_MENTION: &str = "SLACK_MONITOR_MENTION";
	pub const ENVIRONMENT: &str = "ENVIRONMENT";

	pub const DAILY_TASK_SCHEDULE: &str = "DAILY_TASK_SCHEDULE";
	pub const SCHEDULE_TIMEZONE: &str = "SCHEDULE_TIMEZONE";
	pub const MAX_DELAY_DAYS: &str = "MAX_DELAY_DAYS";
	pub const PROBE_TIMEOUT_SECS: &str = "PROBE_TIMEOUT_SECS";

	pub const JORE_IMPORT_USERNAME: &str = "JORE_IMPORT_USERNAME";
	pub const JORE_IMPORT_PASSWORD: &str = "JORE_IMPORT_PASSWORD";
	pub const JORE_IMPORT_ENDPOINTS: &str = "JORE_IMPORT_ENDPOINTS";

	pub const DOCKER_REPOSITORY: &str = "DOCKER_REPOSITORY";
	pub const DOCKER_TRACKED_TAGS: &str = "DOCKER_TRACKED_TAGS";
	pub const DOCKER_HUB_URL: &str = "DOCKER_HUB_URL";

	pub const HOST: &str = "HOST";
	pub const PORT: &str = "PORT";
	pub const LOG_LEVEL: &str = "LOG_LEVEL";
}

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
	SecretsDir = 60,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<MonitorConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<MonitorConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(MonitorConfigLayer::default())
	}
}

/// TOML file configuration source.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new(DEFAULT_CONFIG_PATH)
	}

	/// Path from `STALEWATCH_CONFIG_FILE`, else the system path.
	pub fn from_env() -> Self {
		match env_var(keys::CONFIG_FILE) {
			Some(path) => Self::new(path),
			None => Self::system(),
		}
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<MonitorConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(MonitorConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: MonitorConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<MonitorConfigLayer, ConfigError> {
		debug!("loading environment variables");
		layer_from_lookup(|key| Ok(env_var(key)))
	}
}

/// Versioned secret files, one per key.
pub struct SecretsDirSource {
	path: PathBuf,
}

impl SecretsDirSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// Path from `SECRETS_PATH`, else `/run/secrets/`.
	pub fn from_env() -> Self {
		Self::new(env_var(keys::SECRETS_PATH).unwrap_or_else(|| DEFAULT_SECRETS_PATH.to_string()))
	}
}

impl ConfigSource for SecretsDirSource {
	fn name(&self) -> &'static str {
		"secrets-dir"
	}

	fn precedence(&self) -> Precedence {
		Precedence::SecretsDir
	}

	fn load(&self) -> Result<MonitorConfigLayer, ConfigError> {
		debug!(path = %self.path.display(), "loading secrets directory");
		let dir = SecretsDir::open(&self.path)?;
		layer_from_lookup(|key| dir.resolve(key))
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

/// Build a layer from a key lookup. Absent keys leave the field unset.
pub fn layer_from_lookup<F>(lookup: F) -> Result<MonitorConfigLayer, ConfigError>
where
	F: Fn(&str) -> Result<Option<String>, ConfigError>,
{
	let secret = |key: &str| -> Result<Option<SecretString>, ConfigError> {
		Ok(lookup(key)?.map(SecretString::new))
	};

	let storage = StorageConfigLayer {
		account: lookup(keys::AZURE_STORAGE_ACCOUNT)?,
		key: secret(keys::AZURE_STORAGE_KEY)?,
		container: lookup(keys::AZURE_TILES_CONTAINER)?,
		blob_name: lookup(keys::AZURE_TILES_BLOB)?,
		endpoint: lookup(keys::AZURE_BLOB_ENDPOINT)?,
		timeout_secs: parse_value(keys::AZURE_BLOB_TIMEOUT_SECS, lookup(keys::AZURE_BLOB_TIMEOUT_SECS)?)?,
	};

	let notify = NotifyConfigLayer {
		webhook_url: secret(keys::SLACK_WEBHOOK_URL)?,
		mention: lookup(keys::SLACK_MONITOR_MENTION)?,
		environment: lookup(keys::ENVIRONMENT)?,
	};

	let schedule = ScheduleConfigLayer {
		cron: lookup(keys::DAILY_TASK_SCHEDULE)?,
		timezone: lookup(keys::SCHEDULE_TIMEZONE)?,
		max_delay_days: parse_value(keys::MAX_DELAY_DAYS, lookup(keys::MAX_DELAY_DAYS)?)?,
		probe_timeout_secs: parse_value(keys::PROBE_TIMEOUT_SECS, lookup(keys::PROBE_TIMEOUT_SECS)?)?,
	};

	let import = ImportConfigLayer {
		username: lookup(keys::JORE_IMPORT_USERNAME)?,
		password: secret(keys::JORE_IMPORT_PASSWORD)?,
		endpoints: lookup(keys::JORE_IMPORT_ENDPOINTS)?
			.map(|v| parse_endpoint_list(keys::JORE_IMPORT_ENDPOINTS, &v))
			.transpose()?,
		..Default::default()
	};

	let registry = RegistryConfigLayer {
		repository: lookup(keys::DOCKER_REPOSITORY)?,
		tracked_tags: lookup(keys::DOCKER_TRACKED_TAGS)?.map(|v| parse_list(&v)),
		page_size: None,
		base_url: lookup(keys::DOCKER_HUB_URL)?,
	};

	let http = HttpConfigLayer {
		host: lookup(keys::HOST)?,
		port: parse_value(keys::PORT, lookup(keys::PORT)?)?,
	};

	let logging = LoggingConfigLayer {
		level: lookup(keys::LOG_LEVEL)?,
	};

	Ok(MonitorConfigLayer {
		storage: Some(storage),
		registry: Some(registry),
		import: Some(import),
		notify: Some(notify),
		schedule: Some(schedule),
		http: Some(http),
		logging: Some(logging),
	})
}

fn parse_value<T: std::str::FromStr>(key: &str, value: Option<String>) -> Result<Option<T>, ConfigError> {
	match value {
		Some(v) => v.trim().parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: key.to_string(),
			message: format!("invalid {} value '{v}'", std::any::type_name::<T>()),
		}),
		None => Ok(None),
	}
}

fn parse_list(value: &str) -> Vec<String> {
	value
		.split(',')
		.map(|s| s.trim().to_string())
		.filter(|s| !s.is_empty())
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;
	use tempfile::TempDir;

	fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Result<Option<String>, ConfigError> {
		let map: HashMap<String, String> = pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		move |key| Ok(map.get(key).cloned())
	}

	#[test]
	fn test_precedence_ordering() {
		assert!(Precedence::Defaults < Precedence::ConfigFile);
		assert!(Precedence::ConfigFile < Precedence::Environment);
		assert!(Precedence::Environment < Precedence::SecretsDir);
	}

	#[test]
	fn test_empty_lookup_sets_nothing() {
		let layer = layer_from_lookup(lookup_from(&[])).unwrap();
		let storage = layer.storage.unwrap();
		assert!(storage.account.is_none());
		assert!(storage.key.is_none());
		assert!(layer.schedule.unwrap().max_delay_days.is_none());
		assert!(layer.import.unwrap().endpoints.is_none());
	}

	#[test]
	fn test_lookup_maps_every_section() {
		let layer = layer_from_lookup(lookup_from(&[
			(keys::AZURE_STORAGE_ACCOUNT, "tilesacct"),
			(keys::AZURE_STORAGE_KEY, "a2V5"),
			(keys::AZURE_TILES_CONTAINER, "tiles"),
			(keys::SLACK_WEBHOOK_URL, "https://hooks.example.com/T0"),
			(keys::ENVIRONMENT, "prod"),
			(keys::DAILY_TASK_SCHEDULE, "0 0 6 * * *"),
			(keys::MAX_DELAY_DAYS, "3.5"),
			(keys::PROBE_TIMEOUT_SECS, "45"),
			(keys::JORE_IMPORT_ENDPOINTS, "dev=https://dev.example.com/"),
			(keys::DOCKER_TRACKED_TAGS, "dev, prod ,,next"),
			(keys::PORT, "9100"),
			(keys::LOG_LEVEL, "debug"),
		]))
		.unwrap();

		let storage = layer.storage.unwrap();
		assert_eq!(storage.account.as_deref(), Some("tilesacct"));
		assert_eq!(storage.key.unwrap().expose(), "a2V5");
		assert_eq!(layer.notify.unwrap().environment.as_deref(), Some("prod"));
		let schedule = layer.schedule.unwrap();
		assert_eq!(schedule.cron.as_deref(), Some("0 0 6 * * *"));
		assert_eq!(schedule.max_delay_days, Some(3.5));
		assert_eq!(schedule.probe_timeout_secs, Some(45));
		let endpoints = layer.import.unwrap().endpoints.unwrap();
		assert_eq!(endpoints.len(), 1);
		assert_eq!(endpoints[0].label, "dev");
		assert_eq!(
			layer.registry.unwrap().tracked_tags.unwrap(),
			vec!["dev", "prod", "next"]
		);
		assert_eq!(layer.http.unwrap().port, Some(9100));
		assert_eq!(layer.logging.unwrap().level.as_deref(), Some("debug"));
	}

	#[test]
	fn test_invalid_number_is_rejected() {
		let err = layer_from_lookup(lookup_from(&[(keys::PORT, "ninety")])).unwrap_err();
		assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "PORT"));

		let err = layer_from_lookup(lookup_from(&[(keys::MAX_DELAY_DAYS, "week")])).unwrap_err();
		assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "MAX_DELAY_DAYS"));
	}

	#[test]
	fn test_malformed_endpoint_list_is_rejected() {
		let err =
			layer_from_lookup(lookup_from(&[(keys::JORE_IMPORT_ENDPOINTS, "https://dev.example.com/")]))
				.unwrap_err();
		assert!(matches!(err, ConfigError::InvalidValue { .. }));
	}

	#[test]
	fn test_toml_source_missing_file_is_empty() {
		let layer = TomlSource::new("/nonexistent/monitor.toml").load().unwrap();
		assert!(layer.storage.is_none());
	}

	#[test]
	fn test_toml_source_reads_file() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join("monitor.toml");
		std::fs::write(&path, "[notify]\nenvironment = \"stage\"\n").unwrap();

		let layer = TomlSource::new(&path).load().unwrap();
		assert_eq!(layer.notify.unwrap().environment.as_deref(), Some("stage"));
	}

	#[test]
	fn test_toml_source_parse_error() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join("monitor.toml");
		std::fs::write(&path, "[http\nport = 1").unwrap();

		let err = TomlSource::new(&path).load().unwrap_err();
		assert!(matches!(err, ConfigError::TomlParse { .. }));
	}

	#[test]
	fn test_secrets_dir_source_reads_versioned_files() {
		let dir = TempDir::new().unwrap();
		std::fs::write(dir.path().join("AZURE_STORAGE_KEY_1"), "old").unwrap();
		std::fs::write(dir.path().join("AZURE_STORAGE_KEY_2"), "new\n").unwrap();
		std::fs::write(dir.path().join("ENVIRONMENT"), "dev").unwrap();

		let layer = SecretsDirSource::new(dir.path()).load().unwrap();
		assert_eq!(layer.storage.unwrap().key.unwrap().expose(), "new");
		assert_eq!(layer.notify.unwrap().environment.as_deref(), Some("dev"));
	}
}

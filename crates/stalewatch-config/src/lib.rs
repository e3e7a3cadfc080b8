// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered configuration for the freshness monitor.
//!
//! Sources, lowest precedence first:
//! - built-in defaults
//! - TOML file (`STALEWATCH_CONFIG_FILE`, default `/etc/stalewatch/monitor.toml`)
//! - environment variables
//! - versioned secret files (`SECRETS_PATH`, default `/run/secrets/`)
//!
//! # Usage
//!
//! ```ignore
//! use stalewatch_config::load_config;
//!
//! let config = load_config()?;
//! println!("Liveness server on {}", config.socket_addr());
//! ```

pub mod error;
pub mod layer;
pub mod secrets_dir;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::MonitorConfigLayer;
pub use secrets_dir::SecretsDir;
pub use sections::*;
pub use sources::{
	keys, layer_from_lookup, ConfigSource, DefaultsSource, EnvSource, Precedence, SecretsDirSource,
	TomlSource,
};

use tracing::{debug, info};

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Fully resolved monitor configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitorConfig {
	pub storage: StorageConfig,
	pub registry: RegistryConfig,
	pub import: ImportConfig,
	pub notify: NotifyConfig,
	pub schedule: ScheduleConfig,
	pub http: HttpConfig,
	pub logging: LoggingConfig,
}

impl MonitorConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from all sources with standard precedence.
pub fn load_config() -> Result<MonitorConfig> {
	load_config_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::from_env()),
		Box::new(EnvSource),
		Box::new(SecretsDirSource::from_env()),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(config_path: impl Into<std::path::PathBuf>) -> Result<MonitorConfig> {
	load_config_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
		Box::new(SecretsDirSource::from_env()),
	])
}

/// Merge the given sources in precedence order and finalize.
pub fn load_config_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<MonitorConfig> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = MonitorConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: MonitorConfigLayer) -> Result<MonitorConfig> {
	let config = MonitorConfig {
		storage: layer.storage.unwrap_or_default().finalize(),
		registry: layer.registry.unwrap_or_default().finalize(),
		import: layer.import.unwrap_or_default().finalize(),
		notify: layer.notify.unwrap_or_default().finalize(),
		schedule: layer.schedule.unwrap_or_default().finalize(),
		http: layer.http.unwrap_or_default().finalize(),
		logging: layer.logging.unwrap_or_default().finalize(),
	};

	validate_config(&config)?;

	info!(
		host = %config.http.host,
		port = config.http.port,
		environment = %config.notify.environment,
		schedule = %config.schedule.cron,
		timezone = %config.schedule.timezone,
		max_delay_days = config.schedule.max_delay_days,
		probe_timeout_secs = config.schedule.probe_timeout_secs,
		storage_account = %config.storage.account,
		container = %config.storage.container,
		storage_key_configured = config.storage.key.is_some(),
		docker_repository = %config.registry.repository,
		import_endpoints = config.import.endpoints.len(),
		slack_configured = config.notify.webhook_url.is_some(),
		"Monitor configuration loaded"
	);

	Ok(config)
}

/// Validate cross-field configuration rules.
fn validate_config(config: &MonitorConfig) -> Result<()> {
	let max_delay = config.schedule.max_delay_days;
	if !max_delay.is_finite() || max_delay < 0.0 {
		return Err(ConfigError::Validation(format!(
			"{} must be a non-negative number of days, got {max_delay}",
			keys::MAX_DELAY_DAYS
		)));
	}

	if config.schedule.probe_timeout_secs == 0 {
		return Err(ConfigError::Validation(format!(
			"{} must be at least one second",
			keys::PROBE_TIMEOUT_SECS
		)));
	}

	if config.schedule.cron.trim().is_empty() {
		return Err(ConfigError::Validation(format!(
			"{} must not be empty",
			keys::DAILY_TASK_SCHEDULE
		)));
	}

	if config.registry.tracked_tags.is_empty() {
		return Err(ConfigError::Validation(format!(
			"{} must name at least one tag",
			keys::DOCKER_TRACKED_TAGS
		)));
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sections::{NotifyConfigLayer, ScheduleConfigLayer, StorageConfigLayer};
	use stalewatch_common_secret::SecretString;
	use tempfile::TempDir;

	struct StaticSource {
		precedence: Precedence,
		layer: MonitorConfigLayer,
	}

	impl ConfigSource for StaticSource {
		fn name(&self) -> &'static str {
			"static"
		}

		fn precedence(&self) -> Precedence {
			self.precedence
		}

		fn load(&self) -> std::result::Result<MonitorConfigLayer, ConfigError> {
			Ok(self.layer.clone())
		}
	}

	fn environment_layer(env: &str) -> MonitorConfigLayer {
		MonitorConfigLayer {
			notify: Some(NotifyConfigLayer {
				environment: Some(env.to_string()),
				..Default::default()
			}),
			..Default::default()
		}
	}

	#[test]
	fn test_defaults() {
		let config = finalize(MonitorConfigLayer::default()).unwrap();
		assert_eq!(config.socket_addr(), "0.0.0.0:9000");
		assert_eq!(config.schedule.cron, "0 0 5 * * *");
		assert_eq!(config.schedule.max_delay_days, 7.0);
		assert_eq!(config.notify.environment, "unknown");
		assert_eq!(config.storage.blob_name, "tiles.mbtiles");
		assert_eq!(config.registry.tracked_tags, vec!["dev", "prod"]);
		assert_eq!(config.import.endpoints.len(), 3);
		assert!(config.notify.webhook_url.is_none());
	}

	#[test]
	fn test_higher_precedence_wins_regardless_of_order() {
		let config = load_config_from_sources(vec![
			Box::new(StaticSource {
				precedence: Precedence::SecretsDir,
				layer: environment_layer("from-secret"),
			}),
			Box::new(StaticSource {
				precedence: Precedence::Environment,
				layer: environment_layer("from-env"),
			}),
			Box::new(DefaultsSource),
		])
		.unwrap();
		assert_eq!(config.notify.environment, "from-secret");
	}

	#[test]
	fn test_lower_precedence_fills_gaps() {
		let file_layer = MonitorConfigLayer {
			storage: Some(StorageConfigLayer {
				container: Some("tiles".to_string()),
				..Default::default()
			}),
			..Default::default()
		};
		let config = load_config_from_sources(vec![
			Box::new(StaticSource {
				precedence: Precedence::ConfigFile,
				layer: file_layer,
			}),
			Box::new(StaticSource {
				precedence: Precedence::Environment,
				layer: environment_layer("prod"),
			}),
		])
		.unwrap();
		assert_eq!(config.storage.container, "tiles");
		assert_eq!(config.notify.environment, "prod");
	}

	#[test]
	fn test_secret_file_overrides_toml() {
		let dir = TempDir::new().unwrap();
		let toml_path = dir.path().join("monitor.toml");
		std::fs::write(&toml_path, "[storage]\nkey = \"from-file\"\naccount = \"acct\"\n").unwrap();
		let secrets = dir.path().join("secrets");
		std::fs::create_dir(&secrets).unwrap();
		std::fs::write(secrets.join("AZURE_STORAGE_KEY_3"), "from-secret\n").unwrap();

		let config = load_config_from_sources(vec![
			Box::new(DefaultsSource),
			Box::new(TomlSource::new(&toml_path)),
			Box::new(SecretsDirSource::new(&secrets)),
		])
		.unwrap();
		assert_eq!(config.storage.account, "acct");
		assert_eq!(
			config.storage.key,
			Some(SecretString::new("from-secret".to_string()))
		);
	}

	#[test]
	fn test_negative_threshold_rejected() {
		let layer = MonitorConfigLayer {
			schedule: Some(ScheduleConfigLayer {
				max_delay_days: Some(-1.0),
				..Default::default()
			}),
			..Default::default()
		};
		assert!(matches!(finalize(layer), Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_non_finite_threshold_rejected() {
		let layer = MonitorConfigLayer {
			schedule: Some(ScheduleConfigLayer {
				max_delay_days: Some(f64::NAN),
				..Default::default()
			}),
			..Default::default()
		};
		assert!(matches!(finalize(layer), Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_zero_probe_timeout_rejected() {
		let layer = MonitorConfigLayer {
			schedule: Some(ScheduleConfigLayer {
				probe_timeout_secs: Some(0),
				..Default::default()
			}),
			..Default::default()
		};
		assert!(matches!(finalize(layer), Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_summary_does_not_leak_secrets() {
		let layer = MonitorConfigLayer {
			notify: Some(NotifyConfigLayer {
				webhook_url: Some(SecretString::new("https://hooks.example.com/secret".to_string())),
				..Default::default()
			}),
			..Default::default()
		};
		let config = finalize(layer).unwrap();
		assert!(!format!("{config:?}").contains("hooks.example.com/secret"));
	}
}

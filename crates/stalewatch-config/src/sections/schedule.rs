// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Check schedule and staleness threshold.

use serde::Deserialize;

/// Daily at 05:00:00 (six-field cron, seconds first).
pub const DEFAULT_CRON: &str = "0 0 5 * * *";
pub const DEFAULT_TIMEZONE: &str = "UTC";
pub const DEFAULT_MAX_DELAY_DAYS: f64 = 7.0;
/// Upper bound for a single probe, matching the blob request abort.
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleConfig {
	pub cron: String,
	/// IANA timezone the cron expression is evaluated in.
	pub timezone: String,
	/// Staleness threshold shared by every probe.
	pub max_delay_days: f64,
	/// A probe still running after this many seconds is reported unreachable.
	pub probe_timeout_secs: u64,
}

impl Default for ScheduleConfig {
	fn default() -> Self {
		ScheduleConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleConfigLayer {
	#[serde(default)]
	pub cron: Option<String>,
	#[serde(default)]
	pub timezone: Option<String>,
	#[serde(default)]
	pub max_delay_days: Option<f64>,
	#[serde(default)]
	pub probe_timeout_secs: Option<u64>,
}

impl ScheduleConfigLayer {
	pub fn merge(&mut self, other: ScheduleConfigLayer) {
		if other.cron.is_some() {
			self.cron = other.cron;
		}
		if other.timezone.is_some() {
			self.timezone = other.timezone;
		}
		if other.max_delay_days.is_some() {
			self.max_delay_days = other.max_delay_days;
		}
		if other.probe_timeout_secs.is_some() {
			self.probe_timeout_secs = other.probe_timeout_secs;
		}
	}

	pub fn finalize(self) -> ScheduleConfig {
		ScheduleConfig {
			cron: self.cron.unwrap_or_else(|| DEFAULT_CRON.to_string()),
			timezone: self
				.timezone
				.unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
			max_delay_days: self.max_delay_days.unwrap_or(DEFAULT_MAX_DELAY_DAYS),
			probe_timeout_secs: self
				.probe_timeout_secs
				.unwrap_or(DEFAULT_PROBE_TIMEOUT_SECS),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_values() {
		let config = ScheduleConfig::default();
		assert_eq!(config.cron, "0 0 5 * * *");
		assert_eq!(config.timezone, "UTC");
		assert_eq!(config.max_delay_days, 7.0);
		assert_eq!(config.probe_timeout_secs, 300);
	}

	#[test]
	fn test_deserialize_fractional_threshold() {
		let layer: ScheduleConfigLayer = toml::from_str("max_delay_days = 3.5").unwrap();
		assert_eq!(layer.max_delay_days, Some(3.5));
	}
}

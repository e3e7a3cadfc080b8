// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Notification sink configuration.

use serde::Deserialize;
use stalewatch_common_secret::SecretString;

#[derive(Debug, Clone, PartialEq)]
pub struct NotifyConfig {
	/// Incoming webhook. `None` means notifications only go to the log.
	pub webhook_url: Option<SecretString>,
	/// Prepended to error notifications, e.g. `<!channel>` or `<@U123>`.
	pub mention: String,
	/// Deployment label shown in every notification.
	pub environment: String,
}

impl Default for NotifyConfig {
	fn default() -> Self {
		NotifyConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotifyConfigLayer {
	#[serde(default)]
	pub webhook_url: Option<SecretString>,
	#[serde(default)]
	pub mention: Option<String>,
	#[serde(default)]
	pub environment: Option<String>,
}

impl NotifyConfigLayer {
	pub fn merge(&mut self, other: NotifyConfigLayer) {
		if other.webhook_url.is_some() {
			self.webhook_url = other.webhook_url;
		}
		if other.mention.is_some() {
			self.mention = other.mention;
		}
		if other.environment.is_some() {
			self.environment = other.environment;
		}
	}

	pub fn finalize(self) -> NotifyConfig {
		NotifyConfig {
			webhook_url: self.webhook_url.filter(|url| !url.is_blank()),
			mention: self.mention.unwrap_or_default(),
			environment: self.environment.unwrap_or_else(|| "unknown".to_string()),
		}
	}
}

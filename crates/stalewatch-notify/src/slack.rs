// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use stalewatch_common_secret::SecretString;
use stalewatch_config::NotifyConfig;
use tracing::{debug, warn};

use crate::{Notifier, Severity};

/// Total deadline for one webhook POST.
pub const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
	#[error("webhook request failed: {0}")]
	Request(#[from] reqwest::Error),

	#[error("webhook returned {status}: {body}")]
	Status { status: u16, body: String },
}

#[derive(Debug, Serialize)]
struct SlackMessage<'a> {
	text: &'a str,
}

/// Posts to a Slack incoming webhook.
pub struct SlackNotifier {
	client: reqwest::Client,
	webhook_url: SecretString,
	mention: String,
	environment: String,
	timeout: Duration,
}

impl SlackNotifier {
	pub fn new(
		client: reqwest::Client,
		webhook_url: SecretString,
		mention: impl Into<String>,
		environment: impl Into<String>,
	) -> Self {
		Self {
			client,
			webhook_url,
			mention: mention.into(),
			environment: environment.into(),
			timeout: DEFAULT_WEBHOOK_TIMEOUT,
		}
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	/// `None` when no webhook URL is configured.
	pub fn from_config(client: reqwest::Client, config: &NotifyConfig) -> Option<Self> {
		let webhook_url = config.webhook_url.clone()?;
		Some(Self::new(
			client,
			webhook_url,
			config.mention.clone(),
			config.environment.clone(),
		))
	}

	/// Info: `[env] message`. Error: `mention [env] :warning: message`.
	pub fn format_text(&self, severity: Severity, message: &str) -> String {
		match severity {
			Severity::Info => format!("[{}] {message}", self.environment),
			Severity::Error if self.mention.is_empty() => {
				format!("[{}] :warning: {message}", self.environment)
			}
			Severity::Error => format!("{} [{}] :warning: {message}", self.mention, self.environment),
		}
	}

	pub async fn post(&self, text: &str) -> Result<(), NotifyError> {
		let response = self
			.client
			.post(self.webhook_url.expose())
			.json(&SlackMessage { text })
			.timeout(self.timeout)
			.send()
			.await?;

		if !response.status().is_success() {
			return Err(NotifyError::Status {
				status: response.status().as_u16(),
				body: response.text().await.unwrap_or_default(),
			});
		}
		Ok(())
	}
}

#[async_trait]
impl Notifier for SlackNotifier {
	async fn notify(&self, severity: Severity, message: &str) {
		let text = self.format_text(severity, message);
		match self.post(&text).await {
			Ok(()) => debug!(?severity, "Slack notification delivered"),
			Err(e) => warn!(?severity, error = %e, "Failed to deliver Slack notification"),
		}
	}
}

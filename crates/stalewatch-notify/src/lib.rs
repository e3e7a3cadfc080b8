// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Outbound notifications.
//!
//! A [`Notifier`] never fails: delivery problems are logged and dropped, so a
//! broken webhook cannot take a check cycle down with it.

mod logging;
mod recording;
mod slack;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use stalewatch_config::NotifyConfig;

pub use logging::LogNotifier;
pub use recording::{Notification, RecordingNotifier};
pub use slack::{NotifyError, SlackNotifier, DEFAULT_WEBHOOK_TIMEOUT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
	Info,
	Error,
}

#[async_trait]
pub trait Notifier: Send + Sync {
	async fn notify(&self, severity: Severity, message: &str);

	async fn report_info(&self, message: &str) {
		self.notify(Severity::Info, message).await
	}

	async fn report_error(&self, message: &str) {
		self.notify(Severity::Error, message).await
	}
}

/// Slack when a webhook URL is configured, log-only otherwise.
pub fn notifier_from_config(client: reqwest::Client, config: &NotifyConfig) -> Arc<dyn Notifier> {
	match SlackNotifier::from_config(client, config) {
		Some(slack) => Arc::new(slack),
		None => {
			tracing::info!("No Slack webhook configured, notifications go to the log only");
			Arc::new(LogNotifier::new(&config.environment))
		}
	}
}

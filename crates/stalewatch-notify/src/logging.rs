// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use tracing::{error, info};

use crate::{Notifier, Severity};

/// Writes notifications to the tracing log.
#[derive(Debug, Clone)]
pub struct LogNotifier {
	environment: String,
}

impl LogNotifier {
	pub fn new(environment: impl Into<String>) -> Self {
		Self {
			environment: environment.into(),
		}
	}
}

#[async_trait]
impl Notifier for LogNotifier {
	async fn notify(&self, severity: Severity, message: &str) {
		match severity {
			Severity::Info => info!(environment = %self.environment, "{message}"),
			Severity::Error => error!(environment = %self.environment, "{message}"),
		}
	}
}

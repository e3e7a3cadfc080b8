// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{Notifier, Severity};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
	pub severity: Severity,
	pub message: String,
}

/// Keeps every notification in memory, in delivery order.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
	notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn notifications(&self) -> Vec<Notification> {
		self.notifications.lock().await.clone()
	}

	pub async fn len(&self) -> usize {
		self.notifications.lock().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.notifications.lock().await.is_empty()
	}
}

#[async_trait]
impl Notifier for RecordingNotifier {
	async fn notify(&self, severity: Severity, message: &str) {
		self.notifications.lock().await.push(Notification {
			severity,
			message: message.to_string(),
		});
	}
}

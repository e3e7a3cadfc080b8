// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::ProbeError;
use crate::types::ProbeResult;

/// One check against one remote resource.
#[async_trait]
pub trait FreshnessProbe: Send + Sync {
	/// Human-readable name of the checked resource.
	fn subject(&self) -> &str;

	/// Fetch the resource's last-updated time and judge it against `now`.
	async fn probe(&self, now: DateTime<Utc>) -> Result<ProbeResult, ProbeError>;

	/// Result reported when [`FreshnessProbe::probe`] fails.
	fn unreachable(&self, error: &ProbeError) -> ProbeResult;

	/// Like `probe`, but failures are logged and reported as `Unreachable`.
	async fn run(&self, now: DateTime<Utc>) -> ProbeResult {
		match self.probe(now).await {
			Ok(result) => {
				debug!(
					probe = %self.subject(),
					verdict = ?result.verdict,
					age_in_days = ?result.age_in_days,
					"Probe finished"
				);
				result
			}
			Err(error) => {
				warn!(probe = %self.subject(), error = %error, "Probe failed");
				self.unreachable(&error)
			}
		}
	}
}

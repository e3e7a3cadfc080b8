// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stalewatch_common_secret::SecretString;
use stalewatch_config::{ImportConfig, ImportEndpointConfig};
use tracing::{debug, instrument};

use crate::age::{evaluate_age, format_days, AgeVerdict};
use crate::error::ProbeError;
use crate::import_page::parse_import_started_at;
use crate::probe::FreshnessProbe;
use crate::types::ProbeResult;

/// Start time of the last run of an import service, read from its
/// Basic-auth protected status page.
pub struct ImportEndpointProbe {
	client: reqwest::Client,
	url: String,
	username: String,
	password: Option<SecretString>,
	start_marker: String,
	terminator: String,
	max_delay_days: f64,
	subject: String,
}

impl ImportEndpointProbe {
	pub fn new(
		client: reqwest::Client,
		import: &ImportConfig,
		endpoint: &ImportEndpointConfig,
		max_delay_days: f64,
	) -> Self {
		Self {
			client,
			url: endpoint.url.clone(),
			username: import.username.clone(),
			password: import.password.clone(),
			start_marker: import.start_marker.clone(),
			terminator: import.terminator.clone(),
			max_delay_days,
			subject: format!("{} ({})", import.display_name, endpoint.label),
		}
	}

	async fn fetch_page(&self) -> Result<String, ProbeError> {
		debug!(url = %self.url, "Fetching import status page");
		let response = self
			.client
			.get(&self.url)
			.basic_auth(&self.username, self.password.as_ref().map(|p| p.expose()))
			.send()
			.await?;

		if !response.status().is_success() {
			return Err(ProbeError::from_response(response).await);
		}
		Ok(response.text().await?)
	}
}

#[async_trait]
impl FreshnessProbe for ImportEndpointProbe {
	fn subject(&self) -> &str {
		&self.subject
	}

	#[instrument(skip(self), fields(probe = %self.subject))]
	async fn probe(&self, now: DateTime<Utc>) -> Result<ProbeResult, ProbeError> {
		let body = self.fetch_page().await?;
		let started_at = parse_import_started_at(&body, &self.start_marker, &self.terminator)?;

		let verdict = evaluate_age(Some(started_at), now, self.max_delay_days);
		let age = match verdict {
			AgeVerdict::Fresh { age_in_days } | AgeVerdict::Stale { age_in_days } => age_in_days,
			AgeVerdict::Unknown => {
				return Err(ProbeError::MissingTimestamp("import start time".to_string()))
			}
		};

		let detail = format!("{} last started {} days ago.", self.subject, format_days(age));
		Ok(ProbeResult::from_age(&self.subject, verdict, detail))
	}

	fn unreachable(&self, _error: &ProbeError) -> ProbeResult {
		ProbeResult::unreachable(&self.subject, format!("{} is not responding.", self.subject))
	}
}

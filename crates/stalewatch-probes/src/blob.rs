// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{AUTHORIZATION, LAST_MODIFIED};
use stalewatch_common_secret::SecretString;
use stalewatch_config::StorageConfig;
use tracing::{debug, instrument};

use crate::age::{evaluate_age, format_days, AgeVerdict};
use crate::azure::{rfc1123, SharedKeyCredential, API_VERSION};
use crate::error::ProbeError;
use crate::probe::FreshnessProbe;
use crate::types::{capitalize, ProbeResult};

/// `Last-Modified` of a single blob, read with "Get Blob Properties".
pub struct BlobProbe {
	client: reqwest::Client,
	account: String,
	key: Option<SecretString>,
	endpoint: String,
	container: String,
	blob_name: String,
	timeout: Duration,
	max_delay_days: f64,
	subject: String,
}

impl BlobProbe {
	pub fn new(client: reqwest::Client, storage: &StorageConfig, max_delay_days: f64) -> Self {
		let subject = format!(
			"{} in \"/{}\"",
			capitalize(&storage.blob_name),
			storage.container
		);
		Self {
			client,
			account: storage.account.clone(),
			key: storage.key.clone(),
			endpoint: storage.endpoint.clone(),
			container: storage.container.clone(),
			blob_name: storage.blob_name.clone(),
			timeout: Duration::from_secs(storage.timeout_secs),
			max_delay_days,
			subject,
		}
	}

	fn path(&self) -> String {
		format!("/{}/{}", self.container, self.blob_name)
	}

	async fn fetch_last_modified(&self) -> Result<DateTime<Utc>, ProbeError> {
		let path = self.path();
		let url = format!("{}{}", self.endpoint, path);
		let date = rfc1123(Utc::now());

		let mut request = self
			.client
			.head(&url)
			.header("x-ms-date", &date)
			.header("x-ms-version", API_VERSION);

		// Without a key the request goes out anonymously (public containers).
		if let Some(key) = &self.key {
			let credential = SharedKeyCredential::new(&self.account, key)?;
			let authorization = credential.authorization(
				"HEAD",
				&[("x-ms-date", date.as_str()), ("x-ms-version", API_VERSION)],
				&path,
			);
			request = request.header(AUTHORIZATION, authorization);
		}

		debug!(url = %url, "Fetching blob properties");
		let response = tokio::time::timeout(self.timeout, request.send())
			.await
			.map_err(|_| ProbeError::Timeout(self.timeout))??;

		if !response.status().is_success() {
			return Err(ProbeError::from_response(response).await);
		}

		let header = response
			.headers()
			.get(LAST_MODIFIED)
			.ok_or_else(|| ProbeError::MissingTimestamp("no Last-Modified header".to_string()))?;
		let value = header
			.to_str()
			.map_err(|e| ProbeError::InvalidResponse(format!("Last-Modified is not text: {e}")))?;

		DateTime::parse_from_rfc2822(value)
			.map(|dt| dt.with_timezone(&Utc))
			.map_err(|e| ProbeError::InvalidResponse(format!("Last-Modified '{value}': {e}")))
	}
}

#[async_trait]
impl FreshnessProbe for BlobProbe {
	fn subject(&self) -> &str {
		&self.subject
	}

	#[instrument(skip(self), fields(probe = %self.subject))]
	async fn probe(&self, now: DateTime<Utc>) -> Result<ProbeResult, ProbeError> {
		let last_modified = self.fetch_last_modified().await?;
		let verdict = evaluate_age(Some(last_modified), now, self.max_delay_days);

		let detail = match verdict {
			AgeVerdict::Stale { age_in_days } => format!(
				"Tileset outdated. {} container was last updated {} days ago.",
				self.subject,
				format_days(age_in_days)
			),
			AgeVerdict::Fresh { age_in_days } => format!(
				"{} container was last updated {} days ago.",
				self.subject,
				format_days(age_in_days)
			),
			AgeVerdict::Unknown => {
				return Err(ProbeError::MissingTimestamp("Last-Modified".to_string()))
			}
		};

		Ok(ProbeResult::from_age(&self.subject, verdict, detail))
	}

	fn unreachable(&self, error: &ProbeError) -> ProbeResult {
		ProbeResult::unreachable(
			&self.subject,
			format!("{} container is not responding: {error}", self.subject),
		)
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use stalewatch_config::RegistryConfig;
use tracing::{debug, instrument};

use crate::age::{evaluate_age, format_days, AgeVerdict};
use crate::error::ProbeError;
use crate::probe::FreshnessProbe;
use crate::types::{capitalize, ProbeResult};

#[derive(Debug, Deserialize)]
struct TagPage {
	results: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
	name: String,
	#[serde(default)]
	tag_last_pushed: Option<String>,
}

/// Push age of allow-listed tags in one Docker Hub repository, reported as a
/// single aggregated result.
pub struct RegistryTagProbe {
	client: reqwest::Client,
	url: String,
	tracked_tags: Vec<String>,
	max_delay_days: f64,
	subject: String,
}

impl RegistryTagProbe {
	pub fn new(client: reqwest::Client, registry: &RegistryConfig, max_delay_days: f64) -> Self {
		let image = registry
			.repository
			.rsplit('/')
			.next()
			.unwrap_or(&registry.repository);
		Self {
			client,
			url: format!(
				"{}/v2/repositories/{}/tags/?page_size={}",
				registry.base_url, registry.repository, registry.page_size
			),
			tracked_tags: registry.tracked_tags.clone(),
			max_delay_days,
			subject: format!("{} dockerhub images", capitalize(image)),
		}
	}

	async fn fetch_tags(&self) -> Result<Vec<TagEntry>, ProbeError> {
		debug!(url = %self.url, "Fetching tag list");
		let response = self.client.get(&self.url).send().await?;
		if !response.status().is_success() {
			return Err(ProbeError::from_response(response).await);
		}

		let body = response.text().await?;
		let page: TagPage = serde_json::from_str(&body)
			.map_err(|e| ProbeError::InvalidResponse(format!("tag list: {e}")))?;
		Ok(page.results)
	}

	/// Tracked tags in response order with their ages.
	fn assess(
		&self,
		entries: &[TagEntry],
		now: DateTime<Utc>,
	) -> Result<Vec<(String, AgeVerdict)>, ProbeError> {
		let mut assessed = Vec::new();
		for entry in entries.iter().filter(|e| self.tracked_tags.contains(&e.name)) {
			let pushed = entry
				.tag_last_pushed
				.as_deref()
				.and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
				.map(|dt| dt.with_timezone(&Utc));

			match evaluate_age(pushed, now, self.max_delay_days) {
				AgeVerdict::Unknown => {
					return Err(ProbeError::MissingTimestamp(format!(
						"tag '{}' has no valid tag_last_pushed",
						entry.name
					)))
				}
				verdict => assessed.push((entry.name.clone(), verdict)),
			}
		}

		if assessed.is_empty() {
			return Err(ProbeError::MissingTimestamp(format!(
				"none of the tracked tags ({}) were listed",
				self.tracked_tags.join(", ")
			)));
		}
		Ok(assessed)
	}
}

#[async_trait]
impl FreshnessProbe for RegistryTagProbe {
	fn subject(&self) -> &str {
		&self.subject
	}

	#[instrument(skip(self), fields(probe = %self.subject))]
	async fn probe(&self, now: DateTime<Utc>) -> Result<ProbeResult, ProbeError> {
		let entries = self.fetch_tags().await?;
		let assessed = self.assess(&entries, now)?;

		let listing = assessed
			.iter()
			.map(|(name, verdict)| {
				let age = verdict.age_in_days().unwrap_or_default();
				format!("{name}: {} days", format_days(age))
			})
			.collect::<Vec<_>>()
			.join(", ");

		let oldest = assessed
			.iter()
			.filter_map(|(_, verdict)| verdict.age_in_days())
			.fold(f64::MIN, f64::max);
		let any_stale = assessed.iter().any(|(_, verdict)| verdict.is_stale());

		let (verdict, detail) = if any_stale {
			(
				AgeVerdict::Stale { age_in_days: oldest },
				format!("Image or images outdated. {} last modified: {listing}", self.subject),
			)
		} else {
			(
				AgeVerdict::Fresh { age_in_days: oldest },
				format!("{} last modified: {listing}", self.subject),
			)
		};

		Ok(ProbeResult::from_age(&self.subject, verdict, detail))
	}

	fn unreachable(&self, error: &ProbeError) -> ProbeResult {
		ProbeResult::unreachable(
			&self.subject,
			format!("{} could not be checked: {error}", self.subject),
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::Verdict;
	use chrono::{Duration, TimeZone};
	use serde_json::json;
	use wiremock::matchers::{method, path, query_param};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	fn now() -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
	}

	fn pushed(days: i64) -> String {
		(now() - Duration::days(days)).to_rfc3339()
	}

	fn probe(server: &MockServer) -> RegistryTagProbe {
		let config = RegistryConfig {
			repository: "hsldevcom/hsl-map-server".to_string(),
			tracked_tags: vec!["dev".to_string(), "prod".to_string()],
			page_size: 10_000,
			base_url: server.uri(),
		};
		RegistryTagProbe::new(stalewatch_common_http::new_client(), &config, 7.0)
	}

	async fn mount_tags(server: &MockServer, body: serde_json::Value) {
		Mock::given(method("GET"))
			.and(path("/v2/repositories/hsldevcom/hsl-map-server/tags/"))
			.and(query_param("page_size", "10000"))
			.respond_with(ResponseTemplate::new(200).set_body_json(body))
			.mount(server)
			.await;
	}

	#[tokio::test]
	async fn test_one_stale_tracked_tag_makes_result_stale() {
		let server = MockServer::start().await;
		mount_tags(
			&server,
			json!({
				"count": 3,
				"results": [
					{"name": "dev", "tag_last_pushed": pushed(3)},
					{"name": "prod", "tag_last_pushed": pushed(9)},
					{"name": "staging", "tag_last_pushed": pushed(100)}
				]
			}),
		)
		.await;

		let result = probe(&server).run(now()).await;
		assert_eq!(result.verdict, Verdict::Stale);
		assert_eq!(result.age_in_days, Some(9.0));
		assert_eq!(
			result.detail_message,
			"Image or images outdated. Hsl-map-server dockerhub images last modified: \
			 dev: 3.0 days, prod: 9.0 days"
		);
		assert!(!result.detail_message.contains("staging"));
	}

	#[tokio::test]
	async fn test_all_tracked_tags_fresh() {
		let server = MockServer::start().await;
		mount_tags(
			&server,
			json!({
				"results": [
					{"name": "latest", "tag_last_pushed": pushed(40)},
					{"name": "prod", "tag_last_pushed": pushed(2)},
					{"name": "dev", "tag_last_pushed": pushed(1)}
				]
			}),
		)
		.await;

		let result = probe(&server).run(now()).await;
		assert_eq!(result.verdict, Verdict::Fresh);
		assert_eq!(
			result.detail_message,
			"Hsl-map-server dockerhub images last modified: prod: 2.0 days, dev: 1.0 days"
		);
	}

	#[tokio::test]
	async fn test_no_tracked_tags_is_unreachable() {
		let server = MockServer::start().await;
		mount_tags(
			&server,
			json!({"results": [{"name": "latest", "tag_last_pushed": pushed(1)}]}),
		)
		.await;

		let err = probe(&server).probe(now()).await.unwrap_err();
		assert!(matches!(err, ProbeError::MissingTimestamp(_)));

		let result = probe(&server).run(now()).await;
		assert_eq!(result.verdict, Verdict::Unreachable);
		assert!(result
			.detail_message
			.starts_with("Hsl-map-server dockerhub images could not be checked: "));
	}

	#[tokio::test]
	async fn test_unlisted_tracked_tag_is_left_out() {
		let server = MockServer::start().await;
		mount_tags(
			&server,
			json!({"results": [{"name": "dev", "tag_last_pushed": pushed(2)}]}),
		)
		.await;

		let result = probe(&server).run(now()).await;
		assert_eq!(result.verdict, Verdict::Fresh);
		assert_eq!(
			result.detail_message,
			"Hsl-map-server dockerhub images last modified: dev: 2.0 days"
		);
	}

	#[tokio::test]
	async fn test_unparseable_push_time_is_unreachable() {
		let server = MockServer::start().await;
		mount_tags(
			&server,
			json!({"results": [
				{"name": "dev", "tag_last_pushed": pushed(1)},
				{"name": "prod", "tag_last_pushed": null}
			]}),
		)
		.await;

		let result = probe(&server).run(now()).await;
		assert_eq!(result.verdict, Verdict::Unreachable);
		assert!(result.detail_message.contains("'prod'"));
	}

	#[tokio::test]
	async fn test_malformed_body_is_invalid_response() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.respond_with(ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"))
			.mount(&server)
			.await;

		let err = probe(&server).probe(now()).await.unwrap_err();
		assert!(matches!(err, ProbeError::InvalidResponse(_)));
	}

	#[tokio::test]
	async fn test_server_error_status() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
			.mount(&server)
			.await;

		let err = probe(&server).probe(now()).await.unwrap_err();
		match err {
			ProbeError::Status { status, body } => {
				assert_eq!(status, 503);
				assert_eq!(body, "maintenance");
			}
			e => panic!("Expected Status error, got: {e:?}"),
		}
	}
}

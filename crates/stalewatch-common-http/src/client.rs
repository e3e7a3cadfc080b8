// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Connect timeout applied to every client. Per-request deadlines are owned
/// by the callers (the blob probe wraps its whole request in one).
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Creates a new HTTP client with the standard Stalewatch User-Agent header.
pub fn new_client() -> Client {
	builder().build().expect("failed to build HTTP client")
}

/// Creates a client builder with the standard User-Agent and connect timeout.
///
/// # Example
/// ```ignore
/// let client = stalewatch_common_http::builder()
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// ```
pub fn builder() -> ClientBuilder {
	Client::builder()
		.user_agent(user_agent())
		.connect_timeout(CONNECT_TIMEOUT)
}

/// Creates a new HTTP client with a total request timeout.
pub fn new_client_with_timeout(timeout: Duration) -> Client {
	builder()
		.timeout(timeout)
		.build()
		.expect("failed to build HTTP client")
}

/// Returns the standard User-Agent string: `stalewatch/{version}`.
pub fn user_agent() -> String {
	format!("stalewatch/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
	use super::*;
	use wiremock::matchers::{header, method};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	#[test]
	fn user_agent_has_correct_format() {
		let ua = user_agent();
		let parts: Vec<&str> = ua.split('/').collect();
		assert_eq!(parts.len(), 2);
		assert_eq!(parts[0], "stalewatch");
		assert!(!parts[1].is_empty());
	}

	#[tokio::test]
	async fn client_sends_user_agent() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(header("user-agent", user_agent().as_str()))
			.respond_with(ResponseTemplate::new(200))
			.expect(1)
			.mount(&server)
			.await;

		let response = new_client().get(server.uri()).send().await.unwrap();
		assert!(response.status().is_success());
	}

	#[test]
	fn builder_accepts_timeout() {
		let client = builder().timeout(Duration::from_secs(5)).build();
		assert!(client.is_ok());
	}
}

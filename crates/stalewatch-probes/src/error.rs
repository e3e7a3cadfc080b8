// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::time::Duration;

use crate::import_page::ImportPageError;

/// Maximum number of characters of an error response body kept in errors.
const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
	#[error("request failed: {0}")]
	Network(#[from] reqwest::Error),

	#[error("request timed out after {0:?}")]
	Timeout(Duration),

	#[error("unexpected status {status}: {body}")]
	Status { status: u16, body: String },

	#[error("invalid response: {0}")]
	InvalidResponse(String),

	#[error("missing timestamp: {0}")]
	MissingTimestamp(String),

	#[error("unreadable import page: {0}")]
	ImportPage(#[from] ImportPageError),

	#[error("invalid credentials: {0}")]
	InvalidCredentials(String),
}

impl ProbeError {
	pub(crate) async fn from_response(response: reqwest::Response) -> Self {
		let status = response.status().as_u16();
		let body: String = response
			.text()
			.await
			.unwrap_or_default()
			.chars()
			.take(MAX_ERROR_BODY_CHARS)
			.collect();
		Self::Status {
			status,
			body: body.trim().to_string(),
		}
	}
}

pub type Result<T> = std::result::Result<T, ProbeError>;

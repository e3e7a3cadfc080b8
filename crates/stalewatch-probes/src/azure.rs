// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Azure Storage Shared Key request signing.
//!
//! `Authorization: SharedKey {account}:{signature}` where the signature is the
//! base64 HMAC-SHA256, keyed with the base64-decoded account key, of:
//!
//! ```text
//! VERB\n
//! Content-Encoding\n Content-Language\n Content-Length\n Content-MD5\n
//! Content-Type\n Date\n If-Modified-Since\n If-Match\n If-None-Match\n
//! If-Unmodified-Since\n Range\n
//! CanonicalizedHeaders (x-ms-* lowercased, sorted, "name:value\n")
//! CanonicalizedResource ("/{account}/{container}/{blob}")
//! ```
//!
//! Only bodiless requests without query parameters are signed here, so every
//! standard header line is empty.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use stalewatch_common_secret::{Secret, SecretString};

use crate::error::ProbeError;

type HmacSha256 = Hmac<Sha256>;

/// Storage service version sent as `x-ms-version`.
pub const API_VERSION: &str = "2021-08-06";

const STANDARD_HEADER_LINES: usize = 11;

#[derive(Clone)]
pub struct SharedKeyCredential {
	account: String,
	key: Secret<Vec<u8>>,
}

impl std::fmt::Debug for SharedKeyCredential {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SharedKeyCredential")
			.field("account", &self.account)
			.field("key", &self.key)
			.finish()
	}
}

impl SharedKeyCredential {
	/// `key` is the base64 account key as shown in the Azure portal.
	pub fn new(account: impl Into<String>, key: &SecretString) -> Result<Self, ProbeError> {
		let account = account.into();
		if account.is_empty() {
			return Err(ProbeError::InvalidCredentials(
				"storage account name is empty".to_string(),
			));
		}
		let decoded = STANDARD
			.decode(key.expose().trim())
			.map_err(|e| ProbeError::InvalidCredentials(format!("account key is not base64: {e}")))?;

		Ok(Self {
			account,
			key: Secret::new(decoded),
		})
	}

	pub fn account(&self) -> &str {
		&self.account
	}

	/// `path` is the URL path, starting with `/{container}`.
	pub fn authorization(&self, verb: &str, ms_headers: &[(&str, &str)], path: &str) -> String {
		let string_to_sign = string_to_sign(verb, ms_headers, &self.account, path);
		format!("SharedKey {}:{}", self.account, self.sign(&string_to_sign))
	}

	pub fn sign(&self, string_to_sign: &str) -> String {
		let mut mac =
			HmacSha256::new_from_slice(self.key.expose()).expect("HMAC can take key of any size");
		mac.update(string_to_sign.as_bytes());
		STANDARD.encode(mac.finalize().into_bytes())
	}
}

pub fn string_to_sign(verb: &str, ms_headers: &[(&str, &str)], account: &str, path: &str) -> String {
	let mut out = String::with_capacity(256);
	out.push_str(&verb.to_ascii_uppercase());
	out.push('\n');
	for _ in 0..STANDARD_HEADER_LINES {
		out.push('\n');
	}
	out.push_str(&canonicalized_headers(ms_headers));
	out.push_str(&canonicalized_resource(account, path));
	out
}

fn canonicalized_headers(headers: &[(&str, &str)]) -> String {
	let mut canonical: Vec<(String, &str)> = headers
		.iter()
		.map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim()))
		.filter(|(name, _)| name.starts_with("x-ms-"))
		.collect();
	canonical.sort_by(|a, b| a.0.cmp(&b.0));

	canonical
		.into_iter()
		.map(|(name, value)| format!("{name}:{value}\n"))
		.collect()
}

fn canonicalized_resource(account: &str, path: &str) -> String {
	format!("/{account}{path}")
}

/// `x-ms-date` / `Last-Modified` format: `Mon, 20 May 2019 05:00:02 GMT`.
pub fn rfc1123(timestamp: DateTime<Utc>) -> String {
	timestamp.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

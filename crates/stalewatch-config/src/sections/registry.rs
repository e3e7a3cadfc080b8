// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Container image registry configuration.

use serde::Deserialize;

pub const DEFAULT_REPOSITORY: &str = "hsldevcom/hsl-map-server";
pub const DEFAULT_BASE_URL: &str = "https://hub.docker.com";
pub const DEFAULT_PAGE_SIZE: u32 = 10_000;

fn default_tracked_tags() -> Vec<String> {
	vec!["dev".to_string(), "prod".to_string()]
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegistryConfig {
	/// `namespace/name` of the image repository.
	pub repository: String,
	/// Tags whose push time is checked; everything else is ignored.
	pub tracked_tags: Vec<String>,
	pub page_size: u32,
	pub base_url: String,
}

impl Default for RegistryConfig {
	fn default() -> Self {
		RegistryConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryConfigLayer {
	#[serde(default)]
	pub repository: Option<String>,
	#[serde(default)]
	pub tracked_tags: Option<Vec<String>>,
	#[serde(default)]
	pub page_size: Option<u32>,
	#[serde(default)]
	pub base_url: Option<String>,
}

impl RegistryConfigLayer {
	pub fn merge(&mut self, other: RegistryConfigLayer) {
		if other.repository.is_some() {
			self.repository = other.repository;
		}
		if other.tracked_tags.is_some() {
			self.tracked_tags = other.tracked_tags;
		}
		if other.page_size.is_some() {
			self.page_size = other.page_size;
		}
		if other.base_url.is_some() {
			self.base_url = other.base_url;
		}
	}

	pub fn finalize(self) -> RegistryConfig {
		RegistryConfig {
			repository: self
				.repository
				.unwrap_or_else(|| DEFAULT_REPOSITORY.to_string()),
			tracked_tags: self.tracked_tags.unwrap_or_else(default_tracked_tags),
			page_size: self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
			base_url: self
				.base_url
				.unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
				.trim_end_matches('/')
				.to_string(),
		}
	}
}

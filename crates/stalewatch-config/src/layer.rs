// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration layer for merging from multiple sources.

use serde::Deserialize;

use crate::sections::{
	HttpConfigLayer, ImportConfigLayer, LoggingConfigLayer, NotifyConfigLayer, RegistryConfigLayer,
	ScheduleConfigLayer, StorageConfigLayer,
};

/// Monitor configuration layer - all fields are Option for merging.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonitorConfigLayer {
	#[serde(default)]
	pub storage: Option<StorageConfigLayer>,
	#[serde(default)]
	pub registry: Option<RegistryConfigLayer>,
	#[serde(default)]
	pub import: Option<ImportConfigLayer>,
	#[serde(default)]
	pub notify: Option<NotifyConfigLayer>,
	#[serde(default)]
	pub schedule: Option<ScheduleConfigLayer>,
	#[serde(default)]
	pub http: Option<HttpConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
}

impl MonitorConfigLayer {
	/// Merge another layer into this one. Other layer takes precedence.
	pub fn merge(&mut self, other: MonitorConfigLayer) {
		merge_option(&mut self.storage, other.storage, StorageConfigLayer::merge);
		merge_option(&mut self.registry, other.registry, RegistryConfigLayer::merge);
		merge_option(&mut self.import, other.import, ImportConfigLayer::merge);
		merge_option(&mut self.notify, other.notify, NotifyConfigLayer::merge);
		merge_option(&mut self.schedule, other.schedule, ScheduleConfigLayer::merge);
		merge_option(&mut self.http, other.http, HttpConfigLayer::merge);
		merge_option(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}

fn merge_option<T, F>(target: &mut Option<T>, source: Option<T>, merge_fn: F)
where
	F: FnOnce(&mut T, T),
{
	match (target.as_mut(), source) {
		(Some(t), Some(s)) => merge_fn(t, s),
		(None, Some(s)) => *target = Some(s),
		_ => {}
	}
}

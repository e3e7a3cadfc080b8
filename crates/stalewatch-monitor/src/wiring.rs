// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;
use std::time::Duration;

use stalewatch_config::MonitorConfig;
use stalewatch_notify::notifier_from_config;
use stalewatch_probes::{BlobProbe, FreshnessProbe, ImportEndpointProbe, RegistryTagProbe};
use tracing::debug;

use crate::cycle::CheckCycle;

/// One blob probe, one registry probe and one import probe per endpoint,
/// all sharing the same threshold and HTTP client.
pub fn build_probes(config: &MonitorConfig, client: reqwest::Client) -> Vec<Arc<dyn FreshnessProbe>> {
	let max_delay_days = config.schedule.max_delay_days;

	let mut probes: Vec<Arc<dyn FreshnessProbe>> = vec![
		Arc::new(BlobProbe::new(client.clone(), &config.storage, max_delay_days)),
		Arc::new(RegistryTagProbe::new(client.clone(), &config.registry, max_delay_days)),
	];
	for endpoint in &config.import.endpoints {
		probes.push(Arc::new(ImportEndpointProbe::new(
			client.clone(),
			&config.import,
			endpoint,
			max_delay_days,
		)));
	}

	debug!(
		count = probes.len(),
		subjects = ?probes.iter().map(|p| p.subject().to_string()).collect::<Vec<_>>(),
		"Built probes"
	);
	probes
}

pub fn build_check_cycle(config: &MonitorConfig, client: reqwest::Client) -> CheckCycle {
	let notifier = notifier_from_config(client.clone(), &config.notify);
	CheckCycle::new(build_probes(config, client), notifier)
		.with_probe_timeout(Duration::from_secs(config.schedule.probe_timeout_secs))
}

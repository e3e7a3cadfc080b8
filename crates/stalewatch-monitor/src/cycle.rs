// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use stalewatch_jobs::{Job, JobContext, JobError, JobOutput};
use stalewatch_notify::{Notifier, Severity};
use stalewatch_probes::{FreshnessProbe, ProbeError, ProbeResult, Verdict};
use tracing::{error, info, instrument, warn};

pub const CHECK_JOB_ID: &str = "check-tiles-age";

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(300);

/// Results of one cycle, in probe registration order.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
	pub results: Vec<ProbeResult>,
	pub fresh: usize,
	pub stale: usize,
	pub unreachable: usize,
}

impl CycleReport {
	fn from_results(results: Vec<ProbeResult>) -> Self {
		let count = |verdict: Verdict| results.iter().filter(|r| r.verdict == verdict).count();
		Self {
			fresh: count(Verdict::Fresh),
			stale: count(Verdict::Stale),
			unreachable: count(Verdict::Unreachable),
			results,
		}
	}

	pub fn all_fresh(&self) -> bool {
		self.stale == 0 && self.unreachable == 0
	}

	pub fn summary(&self) -> String {
		format!(
			"{} probes: {} fresh, {} stale, {} unreachable",
			self.results.len(),
			self.fresh,
			self.stale,
			self.unreachable
		)
	}
}

pub struct CheckCycle {
	probes: Vec<Arc<dyn FreshnessProbe>>,
	notifier: Arc<dyn Notifier>,
	probe_timeout: Duration,
}

impl CheckCycle {
	pub fn new(probes: Vec<Arc<dyn FreshnessProbe>>, notifier: Arc<dyn Notifier>) -> Self {
		Self {
			probes,
			notifier,
			probe_timeout: DEFAULT_PROBE_TIMEOUT,
		}
	}

	/// Deadline for each probe; one that overruns is reported unreachable.
	pub fn with_probe_timeout(mut self, probe_timeout: Duration) -> Self {
		self.probe_timeout = probe_timeout;
		self
	}

	pub fn probe_timeout(&self) -> Duration {
		self.probe_timeout
	}

	pub fn probe_count(&self) -> usize {
		self.probes.len()
	}

	pub async fn run_check_cycle(&self) -> CycleReport {
		self.run_at(Utc::now()).await
	}

	/// Every probe runs on its own task and all of them settle before the
	/// first notification goes out. A probe that panics or overruns the
	/// probe timeout is reported as unreachable.
	#[instrument(skip(self), fields(probes = self.probes.len()))]
	pub async fn run_at(&self, now: DateTime<Utc>) -> CycleReport {
		let deadline = self.probe_timeout;
		let tasks = self.probes.iter().map(|probe| {
			let probe = Arc::clone(probe);
			tokio::spawn(async move { tokio::time::timeout(deadline, probe.run(now)).await })
		});
		let outcomes = join_all(tasks).await;

		let results: Vec<ProbeResult> = outcomes
			.into_iter()
			.zip(&self.probes)
			.map(|(outcome, probe)| match outcome {
				Ok(Ok(result)) => result,
				Ok(Err(_elapsed)) => {
					warn!(probe = %probe.subject(), timeout = ?deadline, "Probe timed out");
					probe.unreachable(&ProbeError::Timeout(deadline))
				}
				Err(join_error) => {
					error!(probe = %probe.subject(), error = %join_error, "Probe task failed");
					ProbeResult::unreachable(
						probe.subject(),
						format!("{} could not be checked: {join_error}", probe.subject()),
					)
				}
			})
			.collect();

		for result in &results {
			let severity = match result.verdict {
				Verdict::Fresh => Severity::Info,
				Verdict::Stale | Verdict::Unreachable => Severity::Error,
			};
			self.notifier.notify(severity, &result.detail_message).await;
		}

		let report = CycleReport::from_results(results);
		info!(
			fresh = report.fresh,
			stale = report.stale,
			unreachable = report.unreachable,
			"Check cycle finished"
		);
		report
	}
}

#[async_trait]
impl Job for CheckCycle {
	fn id(&self) -> &str {
		CHECK_JOB_ID
	}

	fn name(&self) -> &str {
		"Check tiles age"
	}

	fn description(&self) -> &str {
		"Checks how recently the tile blob, map server images and import runs were updated"
	}

	async fn run(&self, ctx: &JobContext) -> Result<JobOutput, JobError> {
		if ctx.cancellation_token.is_cancelled() {
			return Err(JobError::Cancelled);
		}

		let report = self.run_check_cycle().await;
		Ok(JobOutput {
			message: report.summary(),
			metadata: serde_json::to_value(&report).ok(),
		})
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use crate::types::{JobRunCompleted, JobState, JobStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct JobHealthStatus {
	pub job_id: String,
	pub name: String,
	pub schedule: String,
	pub state: JobState,
	pub status: HealthState,
	pub next_run: Option<DateTime<Utc>>,
	pub last_run: Option<LastRunInfo>,
	pub consecutive_failures: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct LastRunInfo {
	pub run_id: String,
	pub status: JobStatus,
	pub started_at: DateTime<Utc>,
	pub duration_ms: i64,
	pub error: Option<String>,
}

impl From<&JobRunCompleted> for LastRunInfo {
	fn from(run: &JobRunCompleted) -> Self {
		Self {
			run_id: run.run_id.clone(),
			status: run.status,
			started_at: run.started_at,
			duration_ms: run.duration_ms,
			error: run.error.clone(),
		}
	}
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
	Healthy,
	Degraded,
	Unhealthy,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobsHealthStatus {
	pub status: HealthState,
	pub jobs: Vec<JobHealthStatus>,
}

pub(crate) fn determine_health_state(
	last_run: Option<&LastRunInfo>,
	consecutive_failures: u32,
) -> HealthState {
	match last_run {
		None => HealthState::Healthy,
		Some(run) => match run.status {
			JobStatus::Succeeded | JobStatus::Cancelled => HealthState::Healthy,
			JobStatus::Failed => {
				if consecutive_failures >= 3 {
					HealthState::Unhealthy
				} else if consecutive_failures >= 1 {
					HealthState::Degraded
				} else {
					HealthState::Healthy
				}
			}
		},
	}
}

pub(crate) fn worst_state(states: impl IntoIterator<Item = HealthState>) -> HealthState {
	let mut worst = HealthState::Healthy;
	for state in states {
		if state == HealthState::Unhealthy {
			return HealthState::Unhealthy;
		}
		if state == HealthState::Degraded {
			worst = HealthState::Degraded;
		}
	}
	worst
}

#[cfg(test)]
mod tests {
	use super::*;

	fn last_run(status: JobStatus) -> LastRunInfo {
		LastRunInfo {
			run_id: "run-1".to_string(),
			status,
			started_at: Utc::now(),
			duration_ms: 100,
			error: (status == JobStatus::Failed).then(|| "Error".to_string()),
		}
	}

	#[test]
	fn test_no_last_run_is_healthy() {
		assert_eq!(determine_health_state(None, 0), HealthState::Healthy);
	}

	#[test]
	fn test_succeeded_and_cancelled_are_healthy() {
		assert_eq!(
			determine_health_state(Some(&last_run(JobStatus::Succeeded)), 0),
			HealthState::Healthy
		);
		assert_eq!(
			determine_health_state(Some(&last_run(JobStatus::Cancelled)), 0),
			HealthState::Healthy
		);
	}

	#[test]
	fn test_failures_degrade_then_turn_unhealthy() {
		let run = last_run(JobStatus::Failed);
		assert_eq!(determine_health_state(Some(&run), 1), HealthState::Degraded);
		assert_eq!(determine_health_state(Some(&run), 2), HealthState::Degraded);
		assert_eq!(determine_health_state(Some(&run), 3), HealthState::Unhealthy);
		assert_eq!(determine_health_state(Some(&run), 5), HealthState::Unhealthy);
	}

	#[test]
	fn test_worst_state() {
		assert_eq!(worst_state(std::iter::empty()), HealthState::Healthy);
		assert_eq!(
			worst_state([HealthState::Healthy, HealthState::Degraded]),
			HealthState::Degraded
		);
		assert_eq!(
			worst_state([HealthState::Unhealthy, HealthState::Degraded]),
			HealthState::Unhealthy
		);
	}

	#[test]
	fn test_serializes_snake_case() {
		let json = serde_json::to_value(HealthState::Degraded).unwrap();
		assert_eq!(json, "degraded");
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobOutput {
	pub message: String,
	pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TriggerSource {
	Schedule,
	Manual,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
	Succeeded,
	Failed,
	Cancelled,
}

/// Lifecycle of a registered job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
	/// Registered, not started.
	Created,
	/// Started, waiting for the next tick.
	Idle,
	/// Started, at least one run in flight.
	Ticking,
	Stopped,
}

/// Published once per run after the job future settles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRunCompleted {
	pub job_name: String,
	pub run_id: String,
	pub triggered_by: TriggerSource,
	pub status: JobStatus,
	pub started_at: DateTime<Utc>,
	pub completed_at: DateTime<Utc>,
	pub duration_ms: i64,
	pub output: Option<JobOutput>,
	pub error: Option<String>,
}

impl JobRunCompleted {
	pub fn succeeded(&self) -> bool {
		self.status == JobStatus::Succeeded
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

#[derive(Debug, thiserror::Error)]
pub enum JobError {
	#[error("Job failed: {message}")]
	Failed { message: String },

	#[error("Job cancelled")]
	Cancelled,

	#[error("Job not found: {0}")]
	UnknownJob(String),

	#[error("Invalid cron expression '{expression}': {message}")]
	InvalidCron { expression: String, message: String },

	#[error("Invalid timezone: {0}")]
	InvalidTimezone(String),
}

impl JobError {
	pub fn failed(message: impl Into<String>) -> Self {
		Self::Failed {
			message: message.into(),
		}
	}
}

pub type Result<T> = std::result::Result<T, JobError>;

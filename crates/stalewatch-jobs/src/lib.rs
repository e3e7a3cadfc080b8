// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Cron-scheduled job registry.
//!
//! A [`JobRegistry`] is owned by the process entry point and shared by
//! reference. Jobs are registered under a name with a cron expression,
//! started once, and report every run (scheduled or triggered) as a
//! [`JobRunCompleted`] on a broadcast channel.

pub mod context;
pub mod error;
pub mod health;
pub mod job;
pub mod registry;
pub mod schedule;
pub mod types;

pub use context::{CancellationToken, JobContext};
pub use error::{JobError, Result};
pub use health::{HealthState, JobHealthStatus, JobsHealthStatus, LastRunInfo};
pub use job::Job;
pub use registry::JobRegistry;
pub use schedule::{convert_to_cron_crate_format, parse_timezone, CronSchedule};
pub use types::{JobOutput, JobRunCompleted, JobState, JobStatus, TriggerSource};

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use crate::context::{CancellationToken, JobContext};
use crate::error::{JobError, Result};
use crate::health::{determine_health_state, worst_state, JobHealthStatus, JobsHealthStatus, LastRunInfo};
use crate::job::Job;
use crate::schedule::{parse_timezone, CronSchedule};
use crate::types::{JobRunCompleted, JobState, JobStatus, TriggerSource};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

const COMPLETION_CHANNEL_CAPACITY: usize = 64;

#[derive(Default)]
struct RunStats {
	in_flight: AtomicUsize,
	consecutive_failures: AtomicU32,
	last_run: Mutex<Option<LastRunInfo>>,
}

struct TickLoop {
	stop_tx: oneshot::Sender<()>,
	handle: JoinHandle<()>,
}

impl TickLoop {
	async fn stop(self) {
		let _ = self.stop_tx.send(());
		let _ = self.handle.await;
	}
}

struct ScheduledJob {
	job: Arc<dyn Job>,
	schedule: CronSchedule,
	lifecycle: JobState,
	tick_loop: Option<TickLoop>,
	stats: Arc<RunStats>,
	cancellation_token: CancellationToken,
}

impl ScheduledJob {
	fn new(job: Arc<dyn Job>, schedule: CronSchedule) -> Self {
		Self {
			job,
			schedule,
			lifecycle: JobState::Created,
			tick_loop: None,
			stats: Arc::new(RunStats::default()),
			cancellation_token: CancellationToken::new(),
		}
	}

	fn state(&self) -> JobState {
		match self.lifecycle {
			JobState::Idle if self.stats.in_flight.load(Ordering::SeqCst) > 0 => JobState::Ticking,
			other => other,
		}
	}
}

/// Everything a single run needs, detached from the registry lock.
#[derive(Clone)]
struct RunTarget {
	name: String,
	job: Arc<dyn Job>,
	stats: Arc<RunStats>,
	cancellation_token: CancellationToken,
	completions: broadcast::Sender<JobRunCompleted>,
}

impl RunTarget {
	async fn execute(self, triggered_by: TriggerSource) -> JobRunCompleted {
		let run_id = uuid::Uuid::new_v4().to_string();
		let started_at = Utc::now();
		self.stats.in_flight.fetch_add(1, Ordering::SeqCst);
		info!(job = %self.name, run_id = %run_id, ?triggered_by, "Job run started");

		let ctx = JobContext {
			run_id: run_id.clone(),
			job_name: self.name.clone(),
			triggered_by,
			cancellation_token: self.cancellation_token.clone(),
		};
		let job = Arc::clone(&self.job);
		let outcome = tokio::spawn(async move { job.run(&ctx).await }).await;

		let (status, output, error) = match outcome {
			Ok(Ok(output)) => (JobStatus::Succeeded, Some(output), None),
			Ok(Err(JobError::Cancelled)) => (JobStatus::Cancelled, None, None),
			Ok(Err(e)) => (JobStatus::Failed, None, Some(e.to_string())),
			Err(join_error) => (
				JobStatus::Failed,
				None,
				Some(format!("job task aborted: {join_error}")),
			),
		};

		let completed_at = Utc::now();
		let completed = JobRunCompleted {
			job_name: self.name.clone(),
			run_id,
			triggered_by,
			status,
			started_at,
			completed_at,
			duration_ms: (completed_at - started_at).num_milliseconds(),
			output,
			error,
		};

		match status {
			JobStatus::Succeeded => {
				self.stats.consecutive_failures.store(0, Ordering::SeqCst);
				info!(job = %self.name, run_id = %completed.run_id, duration_ms = completed.duration_ms, "Job completed successfully");
			}
			JobStatus::Cancelled => {
				info!(job = %self.name, run_id = %completed.run_id, "Job cancelled");
			}
			JobStatus::Failed => {
				self.stats.consecutive_failures.fetch_add(1, Ordering::SeqCst);
				warn!(
					job = %self.name,
					run_id = %completed.run_id,
					error = completed.error.as_deref().unwrap_or_default(),
					"Job failed"
				);
			}
		}

		*self.stats.last_run.lock().await = Some(LastRunInfo::from(&completed));
		self.stats.in_flight.fetch_sub(1, Ordering::SeqCst);

		// No receivers is fine.
		let _ = self.completions.send(completed.clone());
		completed
	}
}

/// Cursor for the next schedule lookup after firing at `fired`. Never earlier
/// than `fired`, so an early wake-up cannot repeat a tick, and never earlier
/// than `now`, so ticks missed during a suspend are skipped instead of replayed.
fn advance_cursor(fired: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
	fired.max(now)
}

async fn tick_loop(target: RunTarget, schedule: CronSchedule, mut stop_rx: oneshot::Receiver<()>) {
	let mut cursor = Utc::now();
	loop {
		let Some(next) = schedule.next_after(cursor) else {
			warn!(job = %target.name, schedule = %schedule.expression(), "Schedule has no further fire times");
			break;
		};
		let wait = (next - Utc::now()).to_std().unwrap_or(Duration::ZERO);
		debug!(job = %target.name, next_run = %next, "Waiting for next tick");

		tokio::select! {
			_ = tokio::time::sleep(wait) => {
				cursor = advance_cursor(next, Utc::now());
				let run = target.clone();
				tokio::spawn(async move {
					run.execute(TriggerSource::Schedule).await;
				});
			}
			_ = &mut stop_rx => {
				info!(job = %target.name, "Stopping tick loop");
				break;
			}
		}
	}
}

/// Named cron jobs with their tick loops.
///
/// A name maps to at most one definition. Overlapping ticks are allowed; each
/// tick runs on its own task.
pub struct JobRegistry {
	timezone: Tz,
	jobs: Mutex<HashMap<String, ScheduledJob>>,
	completions: broadcast::Sender<JobRunCompleted>,
}

impl JobRegistry {
	/// Registry evaluating schedules in UTC.
	pub fn new() -> Self {
		Self::with_tz(Tz::UTC)
	}

	/// Registry evaluating schedules in an IANA timezone such as `Europe/Helsinki`.
	pub fn with_timezone(timezone: &str) -> Result<Self> {
		Ok(Self::with_tz(parse_timezone(timezone)?))
	}

	fn with_tz(timezone: Tz) -> Self {
		let (completions, _) = broadcast::channel(COMPLETION_CHANNEL_CAPACITY);
		Self {
			timezone,
			jobs: Mutex::new(HashMap::new()),
			completions,
		}
	}

	pub fn timezone(&self) -> Tz {
		self.timezone
	}

	/// Register `job` under `name`. An existing definition with the same name
	/// is stopped and replaced; the new one starts out `Created`.
	#[instrument(skip(self, job))]
	pub async fn create_scheduled_job(
		&self,
		name: &str,
		cron_expression: &str,
		job: Arc<dyn Job>,
	) -> Result<()> {
		let schedule = CronSchedule::parse(cron_expression, self.timezone)?;

		let mut jobs = self.jobs.lock().await;
		if let Some(previous) = jobs.remove(name) {
			warn!(
				job = %name,
				previous_schedule = %previous.schedule.expression(),
				"Replacing existing scheduled job"
			);
			if let Some(tick_loop) = previous.tick_loop {
				tick_loop.stop().await;
			}
		}

		jobs.insert(name.to_string(), ScheduledJob::new(job, schedule));
		info!(job = %name, schedule = %cron_expression, timezone = %self.timezone, "Scheduled job created");
		Ok(())
	}

	/// Begin ticking. Starting a job that already ticks does nothing.
	#[instrument(skip(self))]
	pub async fn start_scheduled_job(&self, name: &str) -> Result<()> {
		let mut jobs = self.jobs.lock().await;
		let entry = jobs
			.get_mut(name)
			.ok_or_else(|| JobError::UnknownJob(name.to_string()))?;

		if entry.tick_loop.is_some() {
			debug!(job = %name, "Job already started");
			return Ok(());
		}

		let target = self.run_target(name, entry);
		let (stop_tx, stop_rx) = oneshot::channel();
		let handle = tokio::spawn(tick_loop(target, entry.schedule.clone(), stop_rx));
		entry.tick_loop = Some(TickLoop { stop_tx, handle });
		entry.lifecycle = JobState::Idle;

		info!(job = %name, next_run = ?entry.schedule.next_after(Utc::now()), "Scheduled job started");
		Ok(())
	}

	/// Stop ticking. Runs already in flight finish on their own.
	#[instrument(skip(self))]
	pub async fn stop_scheduled_job(&self, name: &str) -> Result<()> {
		let mut jobs = self.jobs.lock().await;
		let entry = jobs
			.get_mut(name)
			.ok_or_else(|| JobError::UnknownJob(name.to_string()))?;

		if let Some(tick_loop) = entry.tick_loop.take() {
			tick_loop.stop().await;
		}
		entry.lifecycle = JobState::Stopped;
		info!(job = %name, "Scheduled job stopped");
		Ok(())
	}

	/// Run the job once now and wait for it to settle.
	#[instrument(skip(self))]
	pub async fn trigger(&self, name: &str) -> Result<JobRunCompleted> {
		let target = {
			let jobs = self.jobs.lock().await;
			let entry = jobs
				.get(name)
				.ok_or_else(|| JobError::UnknownJob(name.to_string()))?;
			self.run_target(name, entry)
		};

		Ok(target.execute(TriggerSource::Manual).await)
	}

	/// Completion events for every run of every job.
	pub fn subscribe(&self) -> broadcast::Receiver<JobRunCompleted> {
		self.completions.subscribe()
	}

	pub async fn state(&self, name: &str) -> Option<JobState> {
		self.jobs.lock().await.get(name).map(ScheduledJob::state)
	}

	pub async fn job_names(&self) -> Vec<String> {
		let mut names: Vec<String> = self.jobs.lock().await.keys().cloned().collect();
		names.sort();
		names
	}

	#[instrument(skip(self))]
	pub async fn health_status(&self) -> JobsHealthStatus {
		let jobs = self.jobs.lock().await;
		let mut statuses = Vec::with_capacity(jobs.len());

		for (name, entry) in jobs.iter() {
			let last_run = entry.stats.last_run.lock().await.clone();
			let consecutive_failures = entry.stats.consecutive_failures.load(Ordering::SeqCst);
			let state = entry.state();
			let next_run = match state {
				JobState::Idle | JobState::Ticking => entry.schedule.next_after(Utc::now()),
				JobState::Created | JobState::Stopped => None,
			};

			statuses.push(JobHealthStatus {
				job_id: entry.job.id().to_string(),
				name: name.clone(),
				schedule: entry.schedule.expression().to_string(),
				state,
				status: determine_health_state(last_run.as_ref(), consecutive_failures),
				next_run,
				last_run,
				consecutive_failures,
			});
		}

		statuses.sort_by(|a, b| a.name.cmp(&b.name));
		JobsHealthStatus {
			status: worst_state(statuses.iter().map(|s| s.status)),
			jobs: statuses,
		}
	}

	/// Stop every tick loop and cancel runs that have not started yet.
	#[instrument(skip(self))]
	pub async fn shutdown(&self) {
		let mut jobs = self.jobs.lock().await;
		for (name, entry) in jobs.iter_mut() {
			entry.cancellation_token.cancel();
			if let Some(tick_loop) = entry.tick_loop.take() {
				tick_loop.stop().await;
			}
			entry.lifecycle = JobState::Stopped;
			debug!(job = %name, "Job stopped for shutdown");
		}

		info!(job_count = jobs.len(), "Job registry shut down");
	}

	fn run_target(&self, name: &str, entry: &ScheduledJob) -> RunTarget {
		RunTarget {
			name: name.to_string(),
			job: Arc::clone(&entry.job),
			stats: Arc::clone(&entry.stats),
			cancellation_token: entry.cancellation_token.clone(),
			completions: self.completions.clone(),
		}
	}
}

impl Default for JobRegistry {
	fn default() -> Self {
		Self::new()
	}
}

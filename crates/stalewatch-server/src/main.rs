// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stalewatch server binary: schedules the freshness check and serves `/health`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use stalewatch_jobs::JobRegistry;
use stalewatch_monitor::{build_check_cycle, CHECK_JOB_ID};
use stalewatch_server::{create_router, version, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Stalewatch - reports the age of published map artifacts on a schedule.
#[derive(Parser, Debug)]
#[command(name = "stalewatch-server", about = "Scheduled artifact freshness monitor", version)]
struct Args {
	/// TOML config file (overrides STALEWATCH_CONFIG_FILE)
	#[arg(long, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Run one check cycle, wait for it to finish and exit
	#[arg(long)]
	run_once: bool,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version and build information
	Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("{}", version::format_version_info());
		return Ok(());
	}

	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => stalewatch_config::load_config_with_file(path)?,
		None => stalewatch_config::load_config()?,
	};

	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.logging.level.clone().into()),
		)
		.with(tracing_subscriber::fmt::layer())
		.init();

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		schedule = %config.schedule.cron,
		timezone = %config.schedule.timezone,
		"starting stalewatch-server"
	);

	let client = stalewatch_common_http::new_client();
	let cycle = Arc::new(build_check_cycle(&config, client));

	let registry = Arc::new(JobRegistry::with_timezone(&config.schedule.timezone)?);
	registry
		.create_scheduled_job(CHECK_JOB_ID, &config.schedule.cron, cycle)
		.await?;

	if args.run_once {
		let completed = registry.trigger(CHECK_JOB_ID).await?;
		tracing::info!(
			run_id = %completed.run_id,
			status = ?completed.status,
			duration_ms = completed.duration_ms,
			"Check cycle finished"
		);
		return match completed.error {
			Some(error) => Err(error.into()),
			None => Ok(()),
		};
	}

	registry.start_scheduled_job(CHECK_JOB_ID).await?;

	let app = create_router(AppState::new(registry.clone()));
	let addr = config.socket_addr();
	tracing::info!("listening on {}", addr);

	let listener = tokio::net::TcpListener::bind(&addr).await?;

	tokio::select! {
		result = axum::serve(listener, app) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "Server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
			tracing::info!("Shutting down job registry...");
		}
	}

	registry.shutdown().await;
	tracing::info!("Server shutdown complete");
	Ok(())
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The monitoring job: one check cycle runs every configured probe
//! concurrently, then sends one notification per result.

mod cycle;
mod wiring;

pub use cycle::{CheckCycle, CycleReport, CHECK_JOB_ID, DEFAULT_PROBE_TIMEOUT};
pub use wiring::{build_check_cycle, build_probes};

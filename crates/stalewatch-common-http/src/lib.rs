// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP client with a consistent User-Agent header.
//!
//! Probes and the Slack notifier all go through the same client so that
//! remote services see one recognisable agent.

mod client;

pub use client::{builder, new_client, new_client_with_timeout, user_agent};

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Age evaluation against a staleness threshold.

use chrono::{DateTime, Utc};

const MS_PER_DAY: f64 = 86_400_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AgeVerdict {
	Fresh { age_in_days: f64 },
	Stale { age_in_days: f64 },
	/// No timestamp to judge by.
	Unknown,
}

impl AgeVerdict {
	pub fn age_in_days(&self) -> Option<f64> {
		match self {
			AgeVerdict::Fresh { age_in_days } | AgeVerdict::Stale { age_in_days } => Some(*age_in_days),
			AgeVerdict::Unknown => None,
		}
	}

	pub fn is_stale(&self) -> bool {
		matches!(self, AgeVerdict::Stale { .. })
	}
}

/// Days between `timestamp` and `now`, rounded half away from zero to one
/// decimal. Timestamps in the future give a negative age.
pub fn age_in_days(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
	let elapsed_ms = (now - timestamp).num_milliseconds() as f64;
	round_tenths(elapsed_ms / MS_PER_DAY)
}

/// Stale iff the rounded age is strictly greater than `max_delay_days`.
pub fn evaluate_age(
	timestamp: Option<DateTime<Utc>>,
	now: DateTime<Utc>,
	max_delay_days: f64,
) -> AgeVerdict {
	let Some(timestamp) = timestamp else {
		return AgeVerdict::Unknown;
	};

	let age_in_days = age_in_days(timestamp, now);
	if age_in_days > max_delay_days {
		AgeVerdict::Stale { age_in_days }
	} else {
		AgeVerdict::Fresh { age_in_days }
	}
}

/// One decimal, always: `3.0`, `12.4`.
pub fn format_days(days: f64) -> String {
	format!("{days:.1}")
}

fn round_tenths(value: f64) -> f64 {
	let rounded = (value * 10.0).round() / 10.0;
	// Normalise -0.0 so it never prints as "-0.0".
	if rounded == 0.0 {
		0.0
	} else {
		rounded
	}
}

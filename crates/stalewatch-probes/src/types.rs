// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::Serialize;

use crate::age::AgeVerdict;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
	Fresh,
	Stale,
	Unreachable,
}

/// Outcome of one probe invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeResult {
	pub subject_name: String,
	/// Rounded to one decimal; `None` when the age could not be determined.
	pub age_in_days: Option<f64>,
	pub verdict: Verdict,
	pub detail_message: String,
}

impl ProbeResult {
	/// Result for a determined age. `Unknown` ages map to `Unreachable`.
	pub fn from_age(subject: impl Into<String>, age: AgeVerdict, detail: impl Into<String>) -> Self {
		let verdict = match age {
			AgeVerdict::Fresh { .. } => Verdict::Fresh,
			AgeVerdict::Stale { .. } => Verdict::Stale,
			AgeVerdict::Unknown => Verdict::Unreachable,
		};
		Self {
			subject_name: subject.into(),
			age_in_days: age.age_in_days(),
			verdict,
			detail_message: detail.into(),
		}
	}

	pub fn unreachable(subject: impl Into<String>, detail: impl Into<String>) -> Self {
		Self {
			subject_name: subject.into(),
			age_in_days: None,
			verdict: Verdict::Unreachable,
			detail_message: detail.into(),
		}
	}

	pub fn is_fresh(&self) -> bool {
		self.verdict == Verdict::Fresh
	}
}

/// `tiles.mbtiles` -> `Tiles.mbtiles`
pub(crate) fn capitalize(value: &str) -> String {
	let mut chars = value.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Extraction of the import start time from the import service status page.
//!
//! The page embeds a line such as
//! `The import started at <strong>2024-05-20 05:00:02 UTC</strong>`.
//! The timestamp is the text between the start marker and the first
//! terminator that follows it.

use chrono::{DateTime, NaiveDateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImportPageError {
	#[error("start marker '{0}' not found")]
	MarkerNotFound(String),

	#[error("no '{0}' terminator after the start marker")]
	UnterminatedTimestamp(String),

	#[error("unrecognised timestamp '{0}'")]
	InvalidTimestamp(String),
}

const NAIVE_FORMATS: &[&str] = &[
	"%Y-%m-%d %H:%M:%S%.f",
	"%Y-%m-%dT%H:%M:%S%.f",
	"%a %b %d %Y %H:%M:%S",
];

pub fn parse_import_started_at(
	body: &str,
	marker: &str,
	terminator: &str,
) -> Result<DateTime<Utc>, ImportPageError> {
	let start = body
		.find(marker)
		.ok_or_else(|| ImportPageError::MarkerNotFound(marker.to_string()))?
		+ marker.len();
	let rest = &body[start..];
	let end = rest
		.find(terminator)
		.ok_or_else(|| ImportPageError::UnterminatedTimestamp(terminator.to_string()))?;

	let raw = rest[..end].trim();
	parse_timestamp(raw).ok_or_else(|| ImportPageError::InvalidTimestamp(raw.to_string()))
}

/// All accepted shapes are read as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
	if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
		return Some(dt.with_timezone(&Utc));
	}

	NAIVE_FORMATS
		.iter()
		.find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
		.map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;

	const MARKER: &str = "The import started at <strong>";
	const TERMINATOR: &str = "UTC";

	fn page(timestamp: &str) -> String {
		format!(
			"<html><body><h1>Jore import</h1><p>{MARKER}{timestamp} UTC</strong></p>\
			 <p>Status: running</p></body></html>"
		)
	}

	fn expected() -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2019, 5, 20, 5, 0, 2).unwrap()
	}

	#[test]
	fn test_space_separated() {
		let parsed = parse_import_started_at(&page("2019-05-20 05:00:02"), MARKER, TERMINATOR);
		assert_eq!(parsed, Ok(expected()));
	}

	#[test]
	fn test_fractional_seconds() {
		let parsed =
			parse_import_started_at(&page("2019-05-20 05:00:02.250"), MARKER, TERMINATOR).unwrap();
		assert_eq!(parsed.timestamp(), expected().timestamp());
		assert_eq!(parsed.timestamp_subsec_millis(), 250);
	}

	#[test]
	fn test_t_separated() {
		let parsed = parse_import_started_at(&page("2019-05-20T05:00:02"), MARKER, TERMINATOR);
		assert_eq!(parsed, Ok(expected()));
	}

	#[test]
	fn test_rfc3339_with_offset() {
		let parsed =
			parse_import_started_at(&page("2019-05-20T08:00:02+03:00"), MARKER, TERMINATOR);
		assert_eq!(parsed, Ok(expected()));
	}

	#[test]
	fn test_javascript_date_string() {
		let parsed = parse_import_started_at(&page("Mon May 20 2019 05:00:02"), MARKER, TERMINATOR);
		assert_eq!(parsed, Ok(expected()));
	}

	#[test]
	fn test_terminator_before_marker_is_ignored() {
		let body = format!("<p>All times UTC</p>{}", page("2019-05-20 05:00:02"));
		assert_eq!(parse_import_started_at(&body, MARKER, TERMINATOR), Ok(expected()));
	}

	#[test]
	fn test_marker_missing() {
		let err = parse_import_started_at("<html>maintenance</html>", MARKER, TERMINATOR).unwrap_err();
		assert_eq!(err, ImportPageError::MarkerNotFound(MARKER.to_string()));
	}

	#[test]
	fn test_unterminated() {
		let body = format!("{MARKER}2019-05-20 05:00:02</strong>");
		let err = parse_import_started_at(&body, MARKER, TERMINATOR).unwrap_err();
		assert_eq!(err, ImportPageError::UnterminatedTimestamp("UTC".to_string()));
	}

	#[test]
	fn test_unparseable_date() {
		let err = parse_import_started_at(&page("yesterday-ish"), MARKER, TERMINATOR).unwrap_err();
		assert_eq!(err, ImportPageError::InvalidTimestamp("yesterday-ish".to_string()));
	}

	#[test]
	fn test_empty_timestamp() {
		let err = parse_import_started_at(&page(""), MARKER, TERMINATOR).unwrap_err();
		assert_eq!(err, ImportPageError::InvalidTimestamp(String::new()));
	}
}

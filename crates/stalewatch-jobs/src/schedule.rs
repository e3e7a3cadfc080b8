// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Cron expression parsing and next fire time calculation.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use std::str::FromStr;

use crate::error::{JobError, Result};

/// Convert a standard 5-field Unix cron expression to the 7-field format
/// expected by the `cron` crate.
///
/// 5-field format: minute hour day-of-month month day-of-week
/// 7-field format: second minute hour day-of-month month day-of-week year
///
/// 6 and 7 field expressions already carry seconds and are returned as-is.
pub fn convert_to_cron_crate_format(expression: &str) -> String {
	let expression = expression.trim();
	if expression.split_whitespace().count() == 5 {
		format!("0 {expression} *")
	} else {
		expression.to_string()
	}
}

pub fn parse_timezone(timezone: &str) -> Result<Tz> {
	timezone
		.parse()
		.map_err(|_| JobError::InvalidTimezone(timezone.to_string()))
}

/// A parsed cron expression bound to an IANA timezone.
#[derive(Debug, Clone)]
pub struct CronSchedule {
	expression: String,
	schedule: Schedule,
	timezone: Tz,
}

impl CronSchedule {
	pub fn parse(expression: &str, timezone: Tz) -> Result<Self> {
		let schedule = Schedule::from_str(&convert_to_cron_crate_format(expression)).map_err(|e| {
			JobError::InvalidCron {
				expression: expression.to_string(),
				message: e.to_string(),
			}
		})?;

		Ok(Self {
			expression: expression.to_string(),
			schedule,
			timezone,
		})
	}

	pub fn expression(&self) -> &str {
		&self.expression
	}

	pub fn timezone(&self) -> Tz {
		self.timezone
	}

	/// First fire time strictly after `after`, in UTC.
	pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
		let local_after = after.with_timezone(&self.timezone);
		self.schedule
			.after(&local_after)
			.next()
			.map(|next| next.with_timezone(&Utc))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;

	#[test]
	fn test_convert_five_field() {
		assert_eq!(convert_to_cron_crate_format("0 5 * * *"), "0 0 5 * * * *");
		assert_eq!(convert_to_cron_crate_format("  */15 * * * * "), "0 */15 * * * * *");
	}

	#[test]
	fn test_convert_leaves_six_and_seven_field() {
		assert_eq!(convert_to_cron_crate_format("0 0 5 * * *"), "0 0 5 * * *");
		assert_eq!(convert_to_cron_crate_format("0 0 5 * * * 2030"), "0 0 5 * * * 2030");
	}

	#[test]
	fn test_daily_at_five_utc() {
		let schedule = CronSchedule::parse("0 0 5 * * *", Tz::UTC).unwrap();
		let after = Utc.with_ymd_and_hms(2026, 1, 19, 10, 30, 0).unwrap();
		let next = schedule.next_after(after).unwrap();
		assert_eq!(next, Utc.with_ymd_and_hms(2026, 1, 20, 5, 0, 0).unwrap());
	}

	#[test]
	fn test_five_field_every_fifteen_minutes() {
		let schedule = CronSchedule::parse("*/15 * * * *", Tz::UTC).unwrap();
		let after = Utc.with_ymd_and_hms(2026, 1, 19, 10, 32, 0).unwrap();
		let next = schedule.next_after(after).unwrap();
		assert_eq!(next, Utc.with_ymd_and_hms(2026, 1, 19, 10, 45, 0).unwrap());
	}

	#[test]
	fn test_next_after_is_strict() {
		let schedule = CronSchedule::parse("0 0 5 * * *", Tz::UTC).unwrap();
		let fire = Utc.with_ymd_and_hms(2026, 1, 20, 5, 0, 0).unwrap();
		let next = schedule.next_after(fire).unwrap();
		assert_eq!(next, Utc.with_ymd_and_hms(2026, 1, 21, 5, 0, 0).unwrap());
	}

	#[test]
	fn test_timezone_is_applied() {
		let tz = parse_timezone("Europe/Helsinki").unwrap();
		let schedule = CronSchedule::parse("0 0 5 * * *", tz).unwrap();
		// Helsinki is UTC+2 in January.
		let after = Utc.with_ymd_and_hms(2026, 1, 19, 12, 0, 0).unwrap();
		let next = schedule.next_after(after).unwrap();
		assert_eq!(next, Utc.with_ymd_and_hms(2026, 1, 20, 3, 0, 0).unwrap());
	}

	#[test]
	fn test_invalid_expression() {
		let err = CronSchedule::parse("not a cron", Tz::UTC).unwrap_err();
		match err {
			JobError::InvalidCron { expression, .. } => assert_eq!(expression, "not a cron"),
			e => panic!("Expected InvalidCron, got: {e:?}"),
		}
		assert!(CronSchedule::parse("", Tz::UTC).is_err());
		assert!(CronSchedule::parse("0 61 * * * *", Tz::UTC).is_err());
	}

	#[test]
	fn test_invalid_timezone() {
		assert!(matches!(
			parse_timezone("Mars/Olympus_Mons"),
			Err(JobError::InvalidTimezone(_))
		));
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Build information for `stalewatch-server version`.

pub fn format_version_info() -> String {
	format!(
		"stalewatch-server version: {}\n\
		 User agent:                {}\n\
		 Platform:                  {}-{}",
		env!("CARGO_PKG_VERSION"),
		stalewatch_common_http::user_agent(),
		std::env::consts::OS,
		std::env::consts::ARCH,
	)
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Freshness probes.
//!
//! Each probe fetches the last-updated timestamp of one remote resource and
//! turns it into a [`ProbeResult`] via [`evaluate_age`]:
//!
//! - [`BlobProbe`]: `Last-Modified` of an Azure blob (Shared Key signed HEAD)
//! - [`RegistryTagProbe`]: `tag_last_pushed` of allow-listed Docker Hub tags
//! - [`ImportEndpointProbe`]: the start time on an import service status page
//!
//! [`FreshnessProbe::run`] never fails; errors become `Unreachable` results.

pub mod age;
pub mod azure;
pub mod blob;
pub mod error;
pub mod import;
pub mod import_page;
pub mod probe;
pub mod registry;
pub mod types;

pub use age::{age_in_days, evaluate_age, format_days, AgeVerdict};
pub use azure::SharedKeyCredential;
pub use blob::BlobProbe;
pub use error::{ProbeError, Result};
pub use import::ImportEndpointProbe;
pub use import_page::{parse_import_started_at, ImportPageError};
pub use probe::FreshnessProbe;
pub use registry::RegistryTagProbe;
pub use types::{ProbeResult, Verdict};

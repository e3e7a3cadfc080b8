// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections for the monitor.

pub mod http;
pub mod import;
pub mod logging;
pub mod notify;
pub mod registry;
pub mod schedule;
pub mod storage;

pub use http::{HttpConfig, HttpConfigLayer};
pub use import::{ImportConfig, ImportConfigLayer, ImportEndpointConfig};
pub use logging::{LoggingConfig, LoggingConfigLayer};
pub use notify::{NotifyConfig, NotifyConfigLayer};
pub use registry::{RegistryConfig, RegistryConfigLayer};
pub use schedule::{ScheduleConfig, ScheduleConfigLayer};
pub use storage::{StorageConfig, StorageConfigLayer};

pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, OutputFormat};

pub use adapters::{memory::MemoryStore, snapshot::SnapshotFile};
pub use core::report::{PrinterRegistry, ReportFormatter};
pub use core::usage::UsageEngine;
pub use domain::model::UsageReport;
pub use utils::error::{Result, UsageError};

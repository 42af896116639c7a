pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{cli::LocalStorage, Settings};
pub use core::runner::{ProbeRunner, RunSummary};
pub use domain::model::Brewery;
pub use utils::error::{ProbeError, Result};

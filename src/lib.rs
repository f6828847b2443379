pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::http::HttpBookingClient;
pub use config::DemoConfig;
pub use crate::core::{DemoContext, DemoRunner, DemoStep, Pacing, RunnerSettings, Transcript};
pub use utils::error::{ApiError, ApiErrorKind, DemoError, Result};

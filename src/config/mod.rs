pub mod toml_config;

pub use toml_config::DemoConfig;

#[cfg(feature = "cli")]
use crate::core::settings::{DemoStep, Pacing};
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::logger::LogFormat;
#[cfg(feature = "cli")]
use crate::utils::validation::Validate;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "room-booking-demo")]
#[command(about = "Runs the room-booking API client demo against a live service")]
pub struct CliConfig {
    #[arg(long, help = "Service base URL [default: http://localhost:8888]")]
    pub base_url: Option<String>,

    #[arg(long, help = "TOML file with api, demo and fixtures sections")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Pause after every step, in milliseconds [default: 1000]")]
    pub delay_ms: Option<u64>,

    #[arg(long, help = "fire-and-forget (default) or sequential")]
    pub pacing: Option<Pacing>,

    #[arg(long, value_delimiter = ',', help = "Subset of steps to run, e.g. list-rooms,get-room")]
    pub steps: Vec<DemoStep>,

    #[arg(long, help = "HTTP request timeout in seconds [default: 30]")]
    pub timeout_seconds: Option<u64>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, default_value = "compact", help = "Log line format on stderr: compact or json")]
    pub log_format: LogFormat,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Loads the config file if one was given, applies flag overrides and validates.
    pub fn resolve(&self) -> Result<DemoConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::debug!("Loading config from {}", path.display());
                DemoConfig::from_file(path)?
            }
            None => DemoConfig::default(),
        };

        if let Some(base_url) = &self.base_url {
            config.api.base_url = base_url.clone();
        }
        if let Some(delay_ms) = self.delay_ms {
            config.demo.delay_ms = delay_ms;
        }
        if let Some(pacing) = self.pacing {
            config.demo.pacing = pacing;
        }
        if !self.steps.is_empty() {
            config.demo.steps = self.steps.clone();
        }
        if let Some(timeout_seconds) = self.timeout_seconds {
            config.api.timeout_seconds = timeout_seconds;
        }

        config.validate()?;
        Ok(config)
    }
}

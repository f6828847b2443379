use crate::core::settings::{DemoStep, Fixtures, Pacing, RunnerSettings, DEFAULT_STEP_DELAY};
use crate::utils::error::{DemoError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8888";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Demo configuration as read from a TOML file. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub api: ApiConfig,
    pub demo: RunConfig,
    pub fixtures: Fixtures,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub delay_ms: u64,
    pub pacing: Pacing,
    pub steps: Vec<DemoStep>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_STEP_DELAY.as_millis() as u64,
            pacing: Pacing::default(),
            steps: DemoStep::ALL.to_vec(),
        }
    }
}

impl DemoConfig {
    /// Loads and parses a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DemoError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DemoError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| {
            DemoError::ConfigValidationError {
                field: "env_substitution".to_string(),
                message: e.to_string(),
            }
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_seconds)
    }

    pub fn runner_settings(&self) -> RunnerSettings {
        RunnerSettings {
            step_delay: Duration::from_millis(self.demo.delay_ms),
            pacing: self.demo.pacing,
            fixtures: self.fixtures.clone(),
        }
    }
}

impl Validate for DemoConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api.base_url", &self.api.base_url)?;
        validation::validate_range("api.timeout_seconds", self.api.timeout_seconds, 1, 600)?;

        if self.demo.steps.is_empty() {
            return Err(DemoError::InvalidConfigValueError {
                field: "demo.steps".to_string(),
                value: "[]".to_string(),
                reason: "At least one step is required".to_string(),
            });
        }

        let fixtures = &self.fixtures;
        validation::validate_non_empty_string("fixtures.room_name_prefix", &fixtures.room_name_prefix)?;
        validation::validate_range("fixtures.room_capacity", fixtures.room_capacity, 1, 1000)?;
        validation::validate_non_empty_string("fixtures.booking_title", &fixtures.booking_title)?;
        validation::validate_email("fixtures.organizer_email", &fixtures.organizer_email)?;
        // The service rejects bookings that do not start in the future.
        validation::validate_range(
            "fixtures.booking_lead_minutes",
            fixtures.booking_lead_minutes,
            1,
            60 * 24 * 365,
        )?;
        validation::validate_range(
            "fixtures.booking_duration_minutes",
            fixtures.booking_duration_minutes,
            1,
            60 * 24,
        )?;

        Ok(())
    }
}

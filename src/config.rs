//! Engine configuration.
//!
//! Layered as `config/default.toml`, then `config/{NOAH_ENV}.toml`, then
//! `NOAH__SECTION__KEY` environment variables. Every key has a default, so
//! all layers are optional.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub trend: TrendConfig,
    pub handoff: HandoffConfig,
    pub capacity: HospitalCapacity,
    pub logging: LoggingConfig,
}

/// Retention bounds for each patient's vitals trend.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TrendConfig {
    pub max_samples: usize,
    pub window_minutes: u32,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            max_samples: 300,
            window_minutes: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HandoffConfig {
    /// How many predicted needs the summary lists.
    pub top_needs: usize,
    /// Values that count as "not obtained" for allergies and medications.
    pub unknown_sentinels: Vec<String>,
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self {
            top_needs: 5,
            unknown_sentinels: vec!["unknown".into(), "unk".into(), "n/a".into()],
        }
    }
}

/// Currently available hospital resources, used to report shortfalls.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HospitalCapacity {
    pub icu_beds: u32,
    pub trauma_bays: u32,
    pub ct_scanner: u32,
    pub cath_lab: u32,
    pub ventilators: u32,
    pub operating_rooms: u32,
    pub blood_units_o_neg: u32,
}

impl Default for HospitalCapacity {
    fn default() -> Self {
        Self {
            icu_beds: 8,
            trauma_bays: 2,
            ct_scanner: 1,
            cath_lab: 1,
            ventilators: 10,
            operating_rooms: 4,
            blood_units_o_neg: 25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
        }
    }
}

/// Load configuration from file and environment.
pub fn load_config() -> Result<Config, ::config::ConfigError> {
    let env = std::env::var("NOAH_ENV").unwrap_or_else(|_| "development".into());

    ::config::Config::builder()
        // Start with default settings
        .add_source(::config::File::with_name("config/default").required(false))
        // Override with environment-specific settings
        .add_source(::config::File::with_name(&format!("config/{}", env)).required(false))
        // Override with environment variables
        .add_source(
            ::config::Environment::with_prefix("NOAH")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

/// Parse a TOML document on top of the defaults.
pub fn from_toml_str(document: &str) -> Result<Config, ::config::ConfigError> {
    ::config::Config::builder()
        .add_source(::config::File::from_str(document, ::config::FileFormat::Toml))
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config = from_toml_str(
            r#"
            [trend]
            window_minutes = 5

            [capacity]
            icu_beds = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.trend.window_minutes, 5);
        assert_eq!(config.trend.max_samples, 300);
        assert_eq!(config.capacity.icu_beds, 2);
        assert_eq!(config.capacity.ventilators, 10);
        assert_eq!(config.handoff, HandoffConfig::default());
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(from_toml_str("").unwrap(), Config::default());
    }
}

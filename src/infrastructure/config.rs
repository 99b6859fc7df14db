use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::document::{Levy, ValueObjectError};
use crate::domain::formatting::DEFAULT_CURRENCY_SYMBOL;
use crate::domain::recents::DEFAULT_MAX_ENTRIES;

// Default value functions
fn default_base_url() -> String {
  "http://127.0.0.1:8765".to_string()
}

fn default_timeout_seconds() -> u64 {
  15
}

fn default_debounce_ms() -> u64 {
  300
}

fn default_currency_symbol() -> String {
  DEFAULT_CURRENCY_SYMBOL.to_string()
}

fn default_levies() -> Vec<LevyConfig> {
  vec![
    LevyConfig::new("NHIL", dec!(0.025), false),
    LevyConfig::new("GETFUND", dec!(0.025), false),
    LevyConfig::new("COVID", dec!(0.01), false),
    LevyConfig::new("VAT", dec!(0.15), true),
  ]
}

fn default_data_dir() -> PathBuf {
  PathBuf::from("./data")
}

fn default_storage_key() -> String {
  "billdesk.recents".to_string()
}

fn default_max_entries() -> usize {
  DEFAULT_MAX_ENTRIES
}

fn default_output_dir() -> PathBuf {
  PathBuf::from("./data/exports")
}

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  #[serde(default)]
  pub totals: TotalsConfig,
  #[serde(default)]
  pub taxes: TaxConfig,
  #[serde(default)]
  pub recents: RecentsConfig,
  #[serde(default)]
  pub export: ExportConfig,
}

/// Billing backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  #[serde(default = "default_base_url")]
  pub base_url: String,
  #[serde(default = "default_timeout_seconds")]
  pub timeout_seconds: u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: default_base_url(),
      timeout_seconds: default_timeout_seconds(),
    }
  }
}

impl ApiConfig {
  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_seconds)
  }
}

/// Totals reconciliation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TotalsConfig {
  /// Quiet period before the server is asked for authoritative totals
  #[serde(default = "default_debounce_ms")]
  pub debounce_ms: u64,
  /// Ask the server; when off, totals reconcile in process with the stacked rule
  #[serde(default = "default_remote")]
  pub remote: bool,
  #[serde(default = "default_currency_symbol")]
  pub currency_symbol: String,
}

fn default_remote() -> bool {
  true
}

impl Default for TotalsConfig {
  fn default() -> Self {
    Self {
      debounce_ms: default_debounce_ms(),
      remote: default_remote(),
      currency_symbol: default_currency_symbol(),
    }
  }
}

impl TotalsConfig {
  pub fn debounce(&self) -> Duration {
    Duration::from_millis(self.debounce_ms)
  }
}

/// One configured levy, validated when converted into a `Levy`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LevyConfig {
  pub name: String,
  pub rate: Decimal,
  #[serde(default)]
  pub stacked: bool,
}

impl LevyConfig {
  fn new(name: &str, rate: Decimal, stacked: bool) -> Self {
    Self {
      name: name.to_string(),
      rate,
      stacked,
    }
  }
}

/// Tax configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TaxConfig {
  #[serde(default = "default_levies")]
  pub levies: Vec<LevyConfig>,
}

impl Default for TaxConfig {
  fn default() -> Self {
    Self {
      levies: default_levies(),
    }
  }
}

impl TaxConfig {
  /// Validated levies in configuration order
  pub fn levies(&self) -> Result<Arc<[Levy]>, ValueObjectError> {
    self
      .levies
      .iter()
      .map(|levy| {
        let built = Levy::new(levy.name.clone(), levy.rate)?;
        Ok(if levy.stacked { built.stacked() } else { built })
      })
      .collect::<Result<Vec<_>, _>>()
      .map(Arc::from)
  }
}

/// Recent documents configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RecentsConfig {
  #[serde(default = "default_data_dir")]
  pub data_dir: PathBuf,
  #[serde(default = "default_storage_key")]
  pub storage_key: String,
  #[serde(default = "default_max_entries")]
  pub max_entries: usize,
  /// Keep the list on disk; when off it lives only for this process
  #[serde(default = "default_persist")]
  pub persist: bool,
}

fn default_persist() -> bool {
  true
}

impl Default for RecentsConfig {
  fn default() -> Self {
    Self {
      data_dir: default_data_dir(),
      storage_key: default_storage_key(),
      max_entries: default_max_entries(),
      persist: default_persist(),
    }
  }
}

/// Export configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
  #[serde(default = "default_output_dir")]
  pub output_dir: PathBuf,
  /// Image embedded in the document header, if any
  #[serde(default)]
  pub logo_path: Option<PathBuf>,
}

impl Default for ExportConfig {
  fn default() -> Self {
    Self {
      output_dir: default_output_dir(),
      logo_path: None,
    }
  }
}

impl Config {
  /// Load configuration from files and environment variables
  ///
  /// Configuration is loaded in the following order (later sources override earlier ones):
  /// 1. config/default.toml (if exists)
  /// 2. config/local.toml (if exists)
  /// 3. config/{RUN_MODE}.toml (if exists)
  /// 4. Environment variables with BILLDESK_ prefix
  ///
  /// # Example
  ///
  /// ```no_run
  /// use billdesk::infrastructure::config::Config;
  ///
  /// let config = Config::load().expect("Failed to load configuration");
  /// println!("Backend at {}", config.api.base_url);
  /// ```
  ///
  /// # Environment Variables
  ///
  /// Environment variables use the BILLDESK_ prefix and are separated by double underscores:
  /// - `BILLDESK_API__BASE_URL=http://127.0.0.1:8765`
  /// - `BILLDESK_API__TIMEOUT_SECONDS=15`
  /// - `BILLDESK_TOTALS__DEBOUNCE_MS=300`
  /// - `BILLDESK_RECENTS__DATA_DIR=./data`
  /// - `BILLDESK_RECENTS__PERSIST=false`
  /// - `BILLDESK_EXPORT__OUTPUT_DIR=./data/exports`
  /// - `BILLDESK_EXPORT__LOGO_PATH=./assets/logo.png`
  ///
  /// # Errors
  ///
  /// Returns a `ConfigError` if a configuration file contains invalid TOML or a value has
  /// the wrong type.
  pub fn load() -> Result<Self, ConfigError> {
    let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    let config = ConfigBuilder::builder()
      .add_source(File::with_name("config/default").required(false))
      // Add optional local configuration (for local development overrides)
      .add_source(File::with_name("config/local").required(false))
      .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
      // Use double underscore as separator: BILLDESK_API__BASE_URL=...
      .add_source(
        Environment::with_prefix("BILLDESK")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()?;

    config.try_deserialize()
  }

  /// File holding the recent documents list
  pub fn recents_path(&self) -> PathBuf {
    self
      .recents
      .data_dir
      .join(format!("{}.json", self.recents.storage_key))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_config_structure() {
    let toml = r#"
            [api]
            base_url = "http://localhost:9000"

            [totals]
            debounce_ms = 150

            [[taxes.levies]]
            name = "NHIL"
            rate = 0.025

            [[taxes.levies]]
            name = "VAT"
            rate = 0.15
            stacked = true

            [export]
            output_dir = "/tmp/exports"
            logo_path = "assets/logo.png"
        "#;

    let config: Config = toml::from_str(toml).expect("Failed to parse config");

    assert_eq!(config.api.base_url, "http://localhost:9000");
    assert_eq!(config.api.timeout_seconds, 15); // default
    assert_eq!(config.totals.debounce(), Duration::from_millis(150));
    assert!(config.totals.remote); // default
    assert_eq!(config.taxes.levies.len(), 2);
    assert!(config.taxes.levies[1].stacked);
    assert_eq!(config.recents.storage_key, "billdesk.recents"); // default
    assert_eq!(config.recents.max_entries, 20); // default
    assert!(config.recents.persist); // default
    assert_eq!(config.export.output_dir, PathBuf::from("/tmp/exports"));
    assert_eq!(
      config.export.logo_path,
      Some(PathBuf::from("assets/logo.png"))
    );
  }

  #[test]
  fn test_empty_config_uses_defaults() {
    let config: Config = toml::from_str("").expect("Failed to parse config");
    let levies = config.taxes.levies().unwrap();
    let names: Vec<_> = levies.iter().map(Levy::name).collect();
    assert_eq!(names, vec!["NHIL", "GETFUND", "COVID", "VAT"]);
    assert!(levies[3].is_stacked());
    assert_eq!(config.totals.currency_symbol, "GH₵");
    assert_eq!(
      config.recents_path(),
      PathBuf::from("./data/billdesk.recents.json")
    );
  }

  #[test]
  fn test_out_of_range_levy_is_rejected() {
    let config = TaxConfig {
      levies: vec![LevyConfig::new("BAD", dec!(1.5), false)],
    };
    assert!(config.levies().is_err());
  }
}

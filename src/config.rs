//! Configuration for the pricehound host.
//!
//! Loaded from `~/.config/pricehound/config.toml` (or `$XDG_CONFIG_HOME`).
//! Every section is optional:
//!
//! ```toml
//! sources = ["KSP", "Zap", "eBay"]   # empty or absent: every built-in source
//!
//! [search]
//! max_attempts = 3
//! overall_timeout_ms = 20000
//!
//! [[shipping]]
//! source = "KSP"
//! cost = 0
//! min_days = 1
//! max_days = 3
//! details = "Free local delivery"
//! ```

use std::path::{Path, PathBuf};

use price_search::adapters::adapters_for;
use price_search::{Aggregator, DeliveryWindow, SearchOptions, ShippingQuote};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{HoundError, Result};

/// Top-level host configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoundConfig {
    /// Built-in sources to query. Empty means all of them.
    pub sources: Vec<String>,
    /// Retry, timeout and result-count settings.
    pub search: SearchOptions,
    /// Shipping rules that replace the built-in table for their source.
    pub shipping: Vec<ShippingRule>,
}

/// One `[[shipping]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingRule {
    pub source: String,
    #[serde(default = "default_ships")]
    pub ships: bool,
    #[serde(default)]
    pub cost: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_days: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_days: Option<u16>,
    #[serde(default)]
    pub details: String,
}

fn default_ships() -> bool {
    true
}

impl ShippingRule {
    /// The quote this rule stands for.
    pub fn to_quote(&self) -> ShippingQuote {
        if !self.ships {
            return ShippingQuote::no_shipping(self.source.clone(), self.details.clone());
        }
        let window = match (self.min_days, self.max_days) {
            (Some(min), Some(max)) => Some(DeliveryWindow::new(min, max)),
            (Some(days), None) | (None, Some(days)) => Some(DeliveryWindow::new(days, days)),
            (None, None) => None,
        };
        ShippingQuote::ships(self.source.clone(), self.cost, window, self.details.clone())
    }
}

impl HoundConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| HoundError::Config(format!("{}: {e}", path.display())))
    }

    /// Load `path` if given, else the default path if it exists, else defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit `path` is missing or any file found
    /// cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Self::default_config_path();
                if default.is_file() {
                    Self::from_file(&default)
                } else {
                    tracing::debug!(path = %default.display(), "no config file; using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| HoundError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/pricehound/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("pricehound").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("pricehound")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/pricehound-config/config.toml")
        }
    }

    /// Check search options, source names and shipping rules.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.search.validate()?;
        adapters_for(&self.sources)?;
        for rule in &self.shipping {
            if rule.source.trim().is_empty() {
                return Err(HoundError::Config("shipping rule without a source".into()));
            }
            if rule.cost < Decimal::ZERO {
                return Err(HoundError::Config(format!(
                    "shipping cost for {} must not be negative",
                    rule.source
                )));
            }
            if let (Some(min), Some(max)) = (rule.min_days, rule.max_days) {
                if min > max {
                    return Err(HoundError::Config(format!(
                        "shipping window for {} has min_days > max_days",
                        rule.source
                    )));
                }
            }
        }
        Ok(())
    }

    /// Build the aggregator described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build_aggregator(&self) -> Result<Aggregator> {
        self.validate()?;
        let aggregator = self
            .shipping
            .iter()
            .fold(Aggregator::new(adapters_for(&self.sources)?), |agg, rule| {
                agg.with_shipping_override(rule.to_quote())
            });
        Ok(aggregator)
    }
}

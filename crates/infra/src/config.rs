//! Configuration loading and representation.

use anyhow::Context;

use dailyround_catalog::{DEFAULT_MAX_TAX_CODES, ValidationRules};

use crate::query::UNCATEGORIZED;

/// Log output settings; binaries pass the fields to `dailyround_observability::init_with`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// JSON lines instead of human-readable output.
    pub json: bool,
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub default_filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            json: true,
            default_filter: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub max_tax_codes: usize,
    /// Header text for offerings without a category.
    pub uncategorized_label: String,
    pub log: LogConfig,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            max_tax_codes: DEFAULT_MAX_TAX_CODES,
            uncategorized_label: UNCATEGORIZED.to_string(),
            log: LogConfig::default(),
        }
    }
}

impl CatalogConfig {
    /// Read overrides from the process environment:
    ///
    /// - `DAILYROUND_MAX_TAX_CODES` (integer)
    /// - `DAILYROUND_UNCATEGORIZED_LABEL`
    /// - `DAILYROUND_LOG_JSON` (`true`/`false`/`1`/`0`)
    /// - `DAILYROUND_LOG_FILTER`
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`CatalogConfig::from_env`] with an injectable lookup (tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup("DAILYROUND_MAX_TAX_CODES") {
            config.max_tax_codes = raw
                .trim()
                .parse()
                .with_context(|| format!("DAILYROUND_MAX_TAX_CODES must be an integer, got {raw:?}"))?;
        }
        if let Some(label) = lookup("DAILYROUND_UNCATEGORIZED_LABEL") {
            if !label.trim().is_empty() {
                config.uncategorized_label = label;
            }
        }
        if let Some(raw) = lookup("DAILYROUND_LOG_JSON") {
            config.log.json = parse_flag(&raw)
                .with_context(|| format!("DAILYROUND_LOG_JSON must be a boolean, got {raw:?}"))?;
        }
        if let Some(filter) = lookup("DAILYROUND_LOG_FILTER") {
            if !filter.trim().is_empty() {
                config.log.default_filter = filter;
            }
        }

        Ok(config)
    }

    pub fn validation_rules(&self) -> ValidationRules {
        ValidationRules {
            max_tax_codes: self.max_tax_codes,
        }
    }
}

fn parse_flag(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("unrecognised flag value {other:?}"),
    }
}

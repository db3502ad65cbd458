use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::constants;
use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub extraction: ExtractionLabels,
    pub pipeline: PipelineConfig,
}

/// Attribute labels the extractor maps onto typed record fields.
///
/// Each list is tried in order; the first label present in a listing wins.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractionLabels {
    pub purchase_price: Vec<String>,
    pub plot_area: Vec<String>,
    pub price_per_area: Vec<String>,
    pub commercialisation_type: Vec<String>,
    pub short_term_constructible: Vec<String>,
    pub development: Vec<String>,
    pub constructible_type: Vec<String>,
    pub recommended_use: Vec<String>,
    pub demolition: Vec<String>,
    pub free_from: Vec<String>,
    pub commission: Vec<String>,
}

impl Default for ExtractionLabels {
    fn default() -> Self {
        fn labels(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }

        Self {
            purchase_price: labels(&["Purchase:", "Purchase price"]),
            plot_area: labels(&["Plot area approx.:", "Plot area"]),
            price_per_area: labels(&["Price/m²:"]),
            commercialisation_type: labels(&["Commercialisation type:"]),
            short_term_constructible: labels(&["Short-term constructible:"]),
            development: labels(&["Development:"]),
            constructible_type: labels(&["Constructible type:"]),
            recommended_use: labels(&["Recommended use:"]),
            demolition: labels(&["Demolition:"]),
            free_from: labels(&["Free from:"]),
            commission: labels(&["Commission for the purchaser:"]),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of extraction workers; 1 runs sequentially
    pub workers: usize,
    pub output_dir: String,
    pub top_deals: usize,
    /// Prometheus listen address, exporter disabled when unset
    pub metrics_addr: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: constants::DEFAULT_WORKERS,
            output_dir: "output".to_string(),
            top_deals: constants::DEFAULT_TOP_DEALS,
            metrics_addr: None,
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file when it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        if self.pipeline.workers == 0 {
            return Err(PipelineError::Config(
                "pipeline.workers must be at least 1".to_string(),
            ));
        }
        if self.extraction.purchase_price.is_empty() || self.extraction.plot_area.is_empty() {
            return Err(PipelineError::Config(
                "extraction labels for purchase price and plot area must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [pipeline]
            workers = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.pipeline.workers, 2);
        assert_eq!(config.pipeline.top_deals, constants::DEFAULT_TOP_DEALS);
        assert_eq!(config.extraction.purchase_price[0], "Purchase:");
    }

    #[test]
    fn test_custom_labels() {
        let config = Config::from_toml(
            r#"
            [extraction]
            purchase_price = ["Kaufpreis:"]
            "#,
        )
        .unwrap();

        assert_eq!(config.extraction.purchase_price, vec!["Kaufpreis:".to_string()]);
        assert_eq!(config.extraction.demolition, vec!["Demolition:".to_string()]);
    }

    #[test]
    fn test_zero_workers_rejected() {
        let result = Config::from_toml("[pipeline]\nworkers = 0\n");
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let config = Config::load_or_default("does/not/exist.toml").unwrap();
        assert_eq!(config.pipeline.workers, constants::DEFAULT_WORKERS);
    }
}

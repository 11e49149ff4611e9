pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::core::rules::DEFAULT_REVENUE_YEAR;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DATASET: &str = "data/jmu.json";
pub const DEFAULT_ZIP_FILENAME: &str = "sankey_output.zip";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Parser))]
#[cfg_attr(feature = "cli", command(name = "budget-sankey"))]
#[cfg_attr(
    feature = "cli",
    command(about = "Build Sankey flow graphs from an institution's budget dataset")
)]
pub struct CliConfig {
    /// Local path or http(s) URL of the budget dataset
    #[cfg_attr(feature = "cli", arg(long, default_value = DEFAULT_DATASET))]
    pub dataset: String,

    #[cfg_attr(feature = "cli", arg(long, default_value = "./output"))]
    pub output_path: String,

    /// Year column read from each revenue record
    #[cfg_attr(feature = "cli", arg(long, default_value = DEFAULT_REVENUE_YEAR))]
    pub revenue_year: String,

    #[cfg_attr(feature = "cli", arg(long, value_delimiter = ',', default_value = "json"))]
    pub output_formats: Vec<String>,

    /// Bundle every output file into sankey_output.zip
    #[cfg_attr(feature = "cli", arg(long))]
    pub zip: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Enable verbose output"))]
    pub verbose: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Emit logs as JSON lines"))]
    pub log_json: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            dataset: DEFAULT_DATASET.to_string(),
            output_path: "./output".to_string(),
            revenue_year: DEFAULT_REVENUE_YEAR.to_string(),
            output_formats: vec!["json".to_string()],
            zip: false,
            verbose: false,
            log_json: false,
        }
    }
}

impl ConfigProvider for CliConfig {
    fn dataset_source(&self) -> &str {
        &self.dataset
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn revenue_year(&self) -> &str {
        &self.revenue_year
    }

    fn output_formats(&self) -> &[String] {
        &self.output_formats
    }

    fn zip_filename(&self) -> Option<&str> {
        self.zip.then_some(DEFAULT_ZIP_FILENAME)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_dataset_source("dataset", &self.dataset)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_non_empty_string("revenue_year", &self.revenue_year)?;
        validation::validate_output_formats("output_formats", &self.output_formats)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CliConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.zip_filename(), None);
    }

    #[test]
    fn test_zip_flag_sets_bundle_name() {
        let config = CliConfig {
            zip: true,
            ..CliConfig::default()
        };
        assert_eq!(config.zip_filename(), Some("sankey_output.zip"));
    }

    #[test]
    fn test_rejects_unknown_format() {
        let config = CliConfig {
            output_formats: vec!["png".to_string()],
            ..CliConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_parse_arguments() {
        let config = CliConfig::parse_from([
            "budget-sankey",
            "--dataset",
            "https://example.edu/data/jmu.json",
            "--output-formats",
            "json,csv",
            "--revenue-year",
            "2022",
            "--zip",
        ]);
        assert_eq!(config.dataset, "https://example.edu/data/jmu.json");
        assert_eq!(config.output_formats, vec!["json", "csv"]);
        assert_eq!(config.revenue_year, "2022");
        assert!(config.zip);
        assert!(config.validate().is_ok());
    }
}

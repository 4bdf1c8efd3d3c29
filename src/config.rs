//! Application configuration
//! Merges an optional JSON config file with command-line flags.

use crate::charts::ChartKind;
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_SEED: u64 = 42;
const DEFAULT_WINDOW_WIDTH: f32 = 1400.0;
const DEFAULT_WINDOW_HEIGHT: f32 = 900.0;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unknown chart type: {0}")]
    UnknownChart(String),
    #[error("Window size must be positive, got {0}x{1}")]
    InvalidWindowSize(f32, f32),
}

/// Command-line flags.
#[derive(Parser, Debug, Default)]
#[command(name = "chart_gallery", version, about = "Gallery of common chart types")]
pub struct CliArgs {
    /// JSON config file
    #[arg(long, env = "CHART_GALLERY_CONFIG")]
    pub config: Option<PathBuf>,
    /// Seed for the sample data generator
    #[arg(long)]
    pub seed: Option<u64>,
    /// Chart type selected at startup (e.g. 柱状图)
    #[arg(long)]
    pub chart: Option<String>,
}

/// Config file contents; every field is optional.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct PartialConfig {
    pub seed: Option<u64>,
    pub initial_chart: Option<String>,
    pub window_width: Option<f32>,
    pub window_height: Option<f32>,
    pub cjk_font: Option<PathBuf>,
    pub show_data: Option<bool>,
}

/// Resolved configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub seed: u64,
    pub initial_chart: ChartKind,
    pub window_size: [f32; 2],
    pub cjk_font: Option<PathBuf>,
    /// Whether the data preview section starts expanded
    pub show_data: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            initial_chart: ChartKind::Bar,
            window_size: [DEFAULT_WINDOW_WIDTH, DEFAULT_WINDOW_HEIGHT],
            cjk_font: None,
            show_data: false,
        }
    }
}

impl AppConfig {
    /// Build the configuration: CLI flags win over file values, file values
    /// win over defaults.
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        let CliArgs {
            config,
            seed: cli_seed,
            chart: cli_chart,
        } = args;

        let file_config = match config.as_deref() {
            Some(path) => load_config_file(path)?,
            None => PartialConfig::default(),
        };

        Self::merge(file_config, cli_seed, cli_chart)
    }

    fn merge(
        file: PartialConfig,
        cli_seed: Option<u64>,
        cli_chart: Option<String>,
    ) -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();

        let initial_chart = match cli_chart.or(file.initial_chart) {
            Some(label) => {
                ChartKind::from_label(&label).ok_or(ConfigError::UnknownChart(label))?
            }
            None => defaults.initial_chart,
        };

        let width = file.window_width.unwrap_or(defaults.window_size[0]);
        let height = file.window_height.unwrap_or(defaults.window_size[1]);
        if width <= 0.0 || height <= 0.0 {
            return Err(ConfigError::InvalidWindowSize(width, height));
        }

        Ok(Self {
            seed: cli_seed.or(file.seed).unwrap_or(defaults.seed),
            initial_chart,
            window_size: [width, height],
            cjk_font: file.cjk_font,
            show_data: file.show_data.unwrap_or(defaults.show_data),
        })
    }
}

fn load_config_file(path: &Path) -> Result<PartialConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file_or_flags() {
        let config = AppConfig::from_args(CliArgs::default()).unwrap();
        assert_eq!(config.seed, DEFAULT_SEED);
        assert_eq!(config.initial_chart, ChartKind::Bar);
        assert!(config.cjk_font.is_none());
        assert!(!config.show_data);
    }

    #[test]
    fn file_values_are_used() {
        let file: PartialConfig = serde_json::from_str(
            r#"{"seed": 7, "initial_chart": "地图", "window_width": 800, "show_data": true}"#,
        )
        .unwrap();
        let config = AppConfig::merge(file, None, None).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.initial_chart, ChartKind::Map);
        assert_eq!(config.window_size, [800.0, DEFAULT_WINDOW_HEIGHT]);
        assert!(config.show_data);
    }

    #[test]
    fn flags_override_file() {
        let file = PartialConfig {
            seed: Some(7),
            initial_chart: Some("饼图".to_string()),
            ..Default::default()
        };
        let config = AppConfig::merge(file, Some(99), Some("直方图".to_string())).unwrap();
        assert_eq!(config.seed, 99);
        assert_eq!(config.initial_chart, ChartKind::Histogram);
    }

    #[test]
    fn unknown_chart_is_rejected() {
        let err = AppConfig::merge(PartialConfig::default(), None, Some("雷达".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownChart(label) if label == "雷达"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let parsed: Result<PartialConfig, _> = serde_json::from_str(r#"{"colour": "red"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let args = CliArgs {
            config: Some(PathBuf::from("/nonexistent/chart_gallery.json")),
            ..Default::default()
        };
        let err = AppConfig::from_args(args).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/chart_gallery.json"));
    }
}

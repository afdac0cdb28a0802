use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ExplorerError, ExplorerResult};

/// Environment variable naming a JSON config file that replaces the defaults.
pub const CONFIG_ENV: &str = "DISCIPLINE_EXPLORER_CONFIG";

/// A registered dataset: what the user picks, and where it is read from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetEntry {
    pub label: String,
    pub source: String,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub title: String,
    /// Name of the numeric column every dataset carries.
    pub measure_column: String,
    /// Columns with at most this many distinct values get a multi-select.
    pub enumerable_limit: usize,
    pub datasets: Vec<DatasetEntry>,
    /// Free-form interpretation text shown below the view.
    pub notes: Option<String>,
    pub chart_height: f32,
    /// Font file with CJK glyphs; system fonts are tried when unset.
    pub font_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let dataset = |label: &str, source: &str| DatasetEntry {
            label: label.to_string(),
            source: source.to_string(),
        };
        AppConfig {
            title: "2023年度 懲戒処分件数データ可視化アプリ".to_string(),
            measure_column: "人数".to_string(),
            enumerable_limit: 20,
            datasets: vec![
                dataset("官職、処分内容、人数", "data/data1_utf8.csv"),
                dataset("処分事由,処分理由,処分内容,人数", "data/data2_utf8.csv"),
                dataset("処分事由,処分理由,官職等,人数", "data/data3_utf8.csv"),
            ],
            notes: Some(
                "これらのデータを見ると、懲戒を受けている人の多くが自衛官であること、\
                 内容として多いのが停職であること、ハラスメントが問題として挙げられていること等がわかる。"
                    .to_string(),
            ),
            chart_height: 500.0,
            font_path: None,
        }
    }
}

impl AppConfig {
    /// Load from the file named by [`CONFIG_ENV`], or fall back to defaults.
    pub fn from_env() -> ExplorerResult<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => {
                log::info!("Reading configuration from {}", Path::new(&path).display());
                Self::from_file(Path::new(&path))
            }
            None => {
                log::debug!("{CONFIG_ENV} not set, using built-in configuration");
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    pub fn from_file(path: &Path) -> ExplorerResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ExplorerError::Config(format!("reading {}: {e}", path.display()))
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> ExplorerResult<Self> {
        let config: AppConfig = serde_json::from_str(text)
            .map_err(|e| ExplorerError::Config(format!("parsing config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ExplorerResult<()> {
        if self.datasets.is_empty() {
            return Err(ExplorerError::Config("no datasets registered".into()));
        }
        if self.enumerable_limit == 0 {
            return Err(ExplorerError::Config(
                "enumerable_limit must be at least 1".into(),
            ));
        }
        if self.measure_column.is_empty() {
            return Err(ExplorerError::Config("measure_column is empty".into()));
        }
        let mut labels = HashSet::new();
        for entry in &self.datasets {
            if !labels.insert(entry.label.as_str()) {
                return Err(ExplorerError::Config(format!(
                    "duplicate dataset label '{}'",
                    entry.label
                )));
            }
        }
        Ok(())
    }
}

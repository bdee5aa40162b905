use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Deployment configuration: where the backing file lives and the closed
/// KPI/PIC lists the form layer offers. Creation-time validation uses these
/// lists; loading stays permissive so legacy rows with other values survive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackerConfig {
    pub data_file: PathBuf,
    pub kpi_list: Vec<String>,
    pub pic_list: Vec<String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("data/data.csv"),
            kpi_list: vec!["Campaign".to_string(), "Culture".to_string()],
            pic_list: vec![
                "Andi".to_string(),
                "Windy".to_string(),
                "Eta".to_string(),
                "Intern".to_string(),
            ],
        }
    }
}

impl TrackerConfig {
    /// Reads a JSON config file; a missing file yields the defaults.
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path).map_err(|error| AppError::Io(error.to_string()))?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn is_known_kpi(&self, kpi: &str) -> bool {
        self.kpi_list.iter().any(|known| known == kpi)
    }

    pub fn is_known_pic(&self, pic: &str) -> bool {
        self.pic_list.iter().any(|known| known == pic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = TrackerConfig::load(&dir.path().join("absent.json")).expect("load defaults");
        assert_eq!(config.data_file, PathBuf::from("data/data.csv"));
        assert!(config.is_known_kpi("Campaign"));
        assert!(config.is_known_pic("Intern"));
        assert!(!config.is_known_kpi("Revenue"));
    }

    #[test]
    fn partial_config_file_keeps_defaults_for_missing_fields() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"kpiList": ["Growth"]}"#).expect("write config");

        let config = TrackerConfig::load(&path).expect("load config");
        assert_eq!(config.kpi_list, vec!["Growth".to_string()]);
        assert_eq!(config.data_file, PathBuf::from("data/data.csv"));
        assert_eq!(config.pic_list.len(), 4);
    }
}

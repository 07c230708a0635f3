use std::path::Path;

use serde::{Deserialize, Serialize};

use cashball_db::ColumnNames;

use crate::error::PredictError;

/// How a fitted model is scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationMode {
    /// Fit on every draw, score on the same draws.
    #[default]
    Full,
    /// Fit on a shuffled train part, score on the held-out part.
    Holdout,
}

impl std::fmt::Display for EvaluationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvaluationMode::Full => write!(f, "full"),
            EvaluationMode::Holdout => write!(f, "holdout"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    pub max_depth: usize,
    pub evaluation: EvaluationMode,
    pub holdout_fraction: f64,
    pub holdout_seed: u64,
    pub ticket_seed: Option<u64>,
    pub columns: ColumnNames,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            max_depth: 5,
            evaluation: EvaluationMode::Full,
            holdout_fraction: 0.2,
            holdout_seed: 42,
            ticket_seed: None,
            columns: ColumnNames::default(),
        }
    }
}

impl PredictorConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, PredictError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| PredictError::Config(format!("cannot read {}: {e}", path.display())))?;
        let config: PredictorConfig = serde_json::from_str(&json)
            .map_err(|e| PredictError::Config(format!("invalid JSON in {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PredictError> {
        if self.max_depth == 0 {
            return Err(PredictError::Config("max_depth must be at least 1".to_string()));
        }
        if !(self.holdout_fraction > 0.0 && self.holdout_fraction < 1.0) {
            return Err(PredictError::Config(format!(
                "holdout_fraction must be in (0, 1), got {}",
                self.holdout_fraction
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PredictorConfig::default();
        assert_eq!(config.max_depth, 5);
        assert_eq!(config.evaluation, EvaluationMode::Full);
        assert!((config.holdout_fraction - 0.2).abs() < 1e-12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: PredictorConfig =
            serde_json::from_str(r#"{"evaluation": "holdout", "ticket_seed": 7}"#).unwrap();
        assert_eq!(config.evaluation, EvaluationMode::Holdout);
        assert_eq!(config.ticket_seed, Some(7));
        assert_eq!(config.max_depth, 5);
        assert_eq!(config.columns.date, "Draw Date");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = PredictorConfig { max_depth: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(PredictError::Config(_))));

        let config = PredictorConfig { holdout_fraction: 1.0, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_file() {
        let path = std::env::temp_dir()
            .join(format!("cashball-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"max_depth": 3, "columns": {"date": "fecha"}}"#).unwrap();
        let config = PredictorConfig::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.columns.date, "fecha");
        assert_eq!(config.columns.numbers, "Winning Numbers");
    }

    #[test]
    fn test_from_json_file_missing() {
        let path = std::env::temp_dir().join("cashball-config-absent-91c2.json");
        assert!(matches!(
            PredictorConfig::from_json_file(&path),
            Err(PredictError::Config(_))
        ));
    }
}

//! Configuration for the extraction pipeline.
//!
//! All tunable behavior lives in one explicit, read-only object handed to
//! the pipeline at construction time. There is no module-level mutable
//! state; test suites substitute rule sets and correction tables without
//! touching anything process-wide.

use serde::{Deserialize, Serialize};

/// Main configuration for the recibo pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReciboConfig {
    /// OCR error correction configuration.
    pub correction: CorrectionConfig,

    /// Batch output configuration.
    pub batch: BatchConfig,
}

/// One literal OCR substitution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Substitution {
    pub from: String,
    pub to: String,
}

/// OCR error correction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionConfig {
    /// Apply the built-in substitution table.
    pub enabled: bool,

    /// Extra substitutions applied after the built-in table.
    pub extra_substitutions: Vec<Substitution>,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            extra_substitutions: Vec::new(),
        }
    }
}

/// Batch processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of documents processed concurrently.
    pub jobs: usize,

    /// File name of the flat extraction report.
    pub structured_file: String,

    /// File name of the chatbot export.
    pub chatbot_file: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            jobs: 4,
            structured_file: "comprovantes_estruturados.json".to_string(),
            chatbot_file: "dados_chatbot.json".to_string(),
        }
    }
}

impl ReciboConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_round_trips_through_json() {
        let config = ReciboConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ReciboConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.batch.jobs, 4);
        assert!(parsed.correction.enabled);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: ReciboConfig =
            serde_json::from_str(r#"{"batch": {"jobs": 8}}"#).unwrap();
        assert_eq!(parsed.batch.jobs, 8);
        assert_eq!(parsed.batch.structured_file, "comprovantes_estruturados.json");
        assert!(parsed.correction.enabled);
    }
}

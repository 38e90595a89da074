use serde::{Deserialize, Serialize};

use super::runner::BatchError;

pub const DEFAULT_BATCH_SIZE: usize = 1000;

// Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Records fetched, classified and committed as one page.
    pub batch_size: usize,
    /// Trim, drop blank and dedupe tags before scoring.
    pub normalize_tags: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            normalize_tags: false,
        }
    }
}

impl BatchConfig {
    pub fn with_batch_size(batch_size: usize) -> Self {
        Self {
            batch_size,
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, BatchError> {
        let config: BatchConfig = serde_json::from_str(json)
            .map_err(|e| BatchError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), BatchError> {
        if self.batch_size == 0 {
            return Err(BatchError::InvalidConfig(
                "batch_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

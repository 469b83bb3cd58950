use super::ModelError;
use crate::forecast::domain::StratumKey;
use serde::Deserialize;

/// Fitted categorical encoder; a value's code is its index in `classes`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LabelEncoder {
    pub classes: Vec<String>,
}

impl LabelEncoder {
    pub fn encode_stratum(&self, stratum: &StratumKey) -> Result<usize, ModelError> {
        self.classes
            .iter()
            .position(|class| StratumKey::new(class) == *stratum)
            .ok_or_else(|| ModelError::UnseenCategory(stratum.to_string()))
    }

    pub fn decode(&self, code: usize) -> Result<&str, ModelError> {
        self.classes
            .get(code)
            .map(String::as_str)
            .ok_or(ModelError::UnknownClassIndex(code))
    }
}

/// Per-column standardization fitted at training time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        if self.mean.len() != row.len() || self.scale.len() != row.len() {
            return Err(ModelError::ShapeMismatch {
                component: "scaler",
                expected: self.mean.len().min(self.scale.len()),
                actual: row.len(),
            });
        }

        Ok(row
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(value, (mean, scale))| {
                // constant columns were fitted with a zero scale
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                (value - mean) / scale
            })
            .collect())
    }
}

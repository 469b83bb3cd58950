//! Trained-model artifact as the engine sees it.
//!
//! The bundle is produced by an external training pipeline and exported as JSON. Only the
//! named sub-keys are resolved here; everything else in the artifact is ignored.

mod linear;
mod preprocessing;

pub use linear::{LinearClassifier, LinearRegressor};
pub use preprocessing::{LabelEncoder, StandardScaler};

use super::domain::{ScenarioProjection, StratumKey};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct ModelBundle {
    #[serde(default, alias = "consumo_predictor")]
    pub consumption_predictor: Option<ConsumptionPredictor>,
    #[serde(default, alias = "riesgo_clasificador")]
    pub risk_classifier: Option<RiskClassifierModel>,
    #[serde(default, rename = "proyecciones_12_meses")]
    pub projections: Vec<ScenarioProjection>,
    #[serde(default)]
    pub metadata: TrainingMetadata,
}

impl ModelBundle {
    pub fn consumption_predictor(&self) -> Result<&ConsumptionPredictor, ModelError> {
        self.consumption_predictor
            .as_ref()
            .ok_or(ModelError::MissingSubModel("consumption_predictor"))
    }

    pub fn risk_classifier(&self) -> Result<&RiskClassifierModel, ModelError> {
        self.risk_classifier
            .as_ref()
            .ok_or(ModelError::MissingSubModel("risk_classifier"))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConsumptionPredictor {
    pub model: LinearRegressor,
    pub scaler: StandardScaler,
    #[serde(rename = "label_encoder_estrato")]
    pub stratum_encoder: LabelEncoder,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RiskClassifierModel {
    pub model: LinearClassifier,
    #[serde(rename = "label_encoder_estrato")]
    pub stratum_encoder: LabelEncoder,
    #[serde(rename = "label_encoder_riesgo")]
    pub risk_encoder: LabelEncoder,
}

/// Training provenance; every field is optional because older exports omit them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetadata {
    #[serde(default, alias = "fecha_entrenamiento")]
    pub trained_on: Option<String>,
    #[serde(default, alias = "num_registros_consumo")]
    pub consumption_records: Option<u64>,
    #[serde(default, alias = "estratos")]
    pub strata: Vec<StratumKey>,
    #[serde(default)]
    pub r2: Option<f64>,
}

/// Failure inside the model-backed branch. Always recovered per call by the rule-based
/// branch.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("stratum '{0}' was not seen by the fitted encoder")]
    UnseenCategory(String),
    #[error("{component} expects {expected} features, got {actual}")]
    ShapeMismatch {
        component: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("model bundle has no {0} sub-model")]
    MissingSubModel(&'static str),
    #[error("class index {0} is outside the fitted encoder")]
    UnknownClassIndex(usize),
    #[error("risk label '{0}' is not a known risk level")]
    UnknownRiskLabel(String),
    #[error("model produced a non-finite value")]
    NonFiniteOutput,
}

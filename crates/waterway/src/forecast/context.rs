use super::artifacts::{load_model_bundle, load_projections};
use super::domain::{InferencePath, ScenarioProjection};
use super::model::ModelBundle;
use crate::config::ArtifactConfig;
use tracing::{info, warn};

/// Immutable artifacts shared by every engine call. Built once at startup.
#[derive(Debug, Clone, Default)]
pub struct ForecastContext {
    bundle: Option<ModelBundle>,
    precomputed: Vec<ScenarioProjection>,
}

/// Inference branch chosen for a single call.
#[derive(Debug, Clone, Copy)]
pub enum Inference<'a> {
    ModelBacked(&'a ModelBundle),
    RuleBased,
}

impl Inference<'_> {
    pub const fn path(&self) -> InferencePath {
        match self {
            Inference::ModelBacked(_) => InferencePath::ModelBacked,
            Inference::RuleBased => InferencePath::RuleBased,
        }
    }
}

impl ForecastContext {
    pub fn new(bundle: Option<ModelBundle>, precomputed: Vec<ScenarioProjection>) -> Self {
        Self {
            bundle,
            precomputed,
        }
    }

    /// Context with no artifacts: every call takes the rule-based branch.
    pub fn rule_based() -> Self {
        Self::default()
    }

    /// Loads configured artifacts. A missing or unreadable artifact disables its tier for
    /// the life of the context instead of failing startup.
    pub fn load(config: &ArtifactConfig) -> Self {
        let bundle = match &config.model_bundle {
            None => {
                info!("no model bundle configured; using rule-based inference");
                None
            }
            Some(path) => match load_model_bundle(path) {
                Ok(bundle) => {
                    let metadata = &bundle.metadata;
                    info!(
                        path = %path.display(),
                        trained_on = metadata.trained_on.as_deref().unwrap_or("n/a"),
                        consumption_records = ?metadata.consumption_records,
                        strata = metadata.strata.len(),
                        embedded_projections = bundle.projections.len(),
                        "model bundle loaded"
                    );
                    Some(bundle)
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "model bundle unavailable; using rule-based inference"
                    );
                    None
                }
            },
        };

        let precomputed = match &config.projections {
            None => Vec::new(),
            Some(path) => match load_projections(path) {
                Ok(projections) => {
                    info!(
                        path = %path.display(),
                        records = projections.len(),
                        "precomputed projections loaded"
                    );
                    projections
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "precomputed projections unavailable"
                    );
                    Vec::new()
                }
            },
        };

        Self::new(bundle, precomputed)
    }

    pub fn model_enabled(&self) -> bool {
        self.bundle.is_some()
    }

    pub fn precomputed_enabled(&self) -> bool {
        !self.precomputed.is_empty()
    }

    pub fn bundle(&self) -> Option<&ModelBundle> {
        self.bundle.as_ref()
    }

    pub fn precomputed(&self) -> &[ScenarioProjection] {
        &self.precomputed
    }

    pub fn inference(&self) -> Inference<'_> {
        match &self.bundle {
            Some(bundle) => Inference::ModelBacked(bundle),
            None => Inference::RuleBased,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_artifacts_disable_model_and_precomputed_tiers() {
        let config = ArtifactConfig {
            model_bundle: Some(PathBuf::from("./missing-bundle.json")),
            projections: Some(PathBuf::from("./missing-projections.csv")),
        };

        let context = ForecastContext::load(&config);

        assert!(!context.model_enabled());
        assert!(!context.precomputed_enabled());
        assert_eq!(context.inference().path(), InferencePath::RuleBased);
    }

    #[test]
    fn unconfigured_artifacts_yield_rule_based_context() {
        let context = ForecastContext::load(&ArtifactConfig::default());
        assert!(context.bundle().is_none());
        assert!(context.precomputed().is_empty());
    }
}

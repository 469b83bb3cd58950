//! Water consumption estimation, hydric risk classification and 12-month scenario
//! projections.
//!
//! Every engine operation reads from an immutable [`ForecastContext`] built once at startup.
//! When the trained model bundle is missing, or fails for a particular call, the engines
//! answer from the rule-based formulas instead.

pub mod aggregation;
pub mod analysis;
pub mod artifacts;
pub mod classifier;
pub mod context;
pub mod domain;
pub mod estimator;
pub mod features;
pub mod model;
pub mod projection;
pub mod router;
pub mod summary;

#[cfg(test)]
mod tests;

pub use aggregation::aggregate_by_month;
pub use analysis::{analyze, outlook, ForecastAnalysis, ProjectionOutlook};
pub use artifacts::{load_model_bundle, load_projections, ArtifactError};
pub use classifier::{rule_based_score, RiskAssessment, RiskClassifier, RiskFactor, RiskScore};
pub use context::{ForecastContext, Inference};
pub use domain::{
    ClimateObservation, ConsumptionEstimate, ForecastError, InferencePath, Month,
    MonthlyAggregate, RiskLevel, Scenario, ScenarioProjection, StratumKey,
};
pub use estimator::{rule_based_consumption, ConsumptionEstimator};
pub use features::{FeatureBuilder, FeatureVector};
pub use model::{ModelBundle, ModelError, TrainingMetadata};
pub use projection::{ProjectionEngine, ProjectionSet, ProjectionSource, HORIZON_MONTHS};
pub use router::{forecast_router, parse_date, reference_date, ForecastState};
pub use summary::{predominant_level, recommendation, RiskSummarizer, RiskSummary};

use super::context::{ForecastContext, Inference};
use super::domain::{ClimateObservation, InferencePath, Month, RiskLevel, StratumKey};
use super::features::FeatureBuilder;
use super::model::{ModelBundle, ModelError};
use serde::Serialize;
use tracing::warn;

const HIGH_RISK_SCORE: u8 = 60;
const MEDIUM_RISK_SCORE: u8 = 30;

/// Condition contributing to the rule-based hydric risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    HighConsumption,
    LowPrecipitation,
    HighTemperature,
    DrySeason,
}

impl RiskFactor {
    pub const fn points(self) -> u8 {
        match self {
            Self::HighConsumption => 30,
            Self::LowPrecipitation => 25,
            Self::HighTemperature => 15,
            Self::DrySeason => 20,
        }
    }
}

/// Additive rule score with the factors that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskScore {
    pub score: u8,
    pub factors: Vec<RiskFactor>,
}

impl RiskScore {
    pub fn level(&self) -> RiskLevel {
        if self.score >= HIGH_RISK_SCORE {
            RiskLevel::High
        } else if self.score >= MEDIUM_RISK_SCORE {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

pub fn rule_based_score(consumption: f64, month: Month, climate: ClimateObservation) -> RiskScore {
    let mut factors = Vec::new();
    if consumption > 25.0 {
        factors.push(RiskFactor::HighConsumption);
    }
    if climate.precipitation_mm < 100.0 {
        factors.push(RiskFactor::LowPrecipitation);
    }
    if climate.temperature_c > 24.0 {
        factors.push(RiskFactor::HighTemperature);
    }
    if month.is_dry_season() {
        factors.push(RiskFactor::DrySeason);
    }

    let score = factors.iter().map(|factor| factor.points()).sum();
    RiskScore { score, factors }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub path: InferencePath,
}

#[derive(Debug, Clone, Copy)]
pub struct RiskClassifier<'a> {
    context: &'a ForecastContext,
}

impl<'a> RiskClassifier<'a> {
    pub fn new(context: &'a ForecastContext) -> Self {
        Self { context }
    }

    pub fn classify(
        &self,
        city: &str,
        stratum: &StratumKey,
        consumption: f64,
        month: Month,
        climate: ClimateObservation,
    ) -> RiskAssessment {
        let rule_based = || RiskAssessment {
            level: rule_based_score(consumption, month, climate).level(),
            path: InferencePath::RuleBased,
        };

        match self.context.inference() {
            Inference::RuleBased => rule_based(),
            Inference::ModelBacked(bundle) => {
                match model_backed_level(bundle, stratum, consumption, month, climate) {
                    Ok(level) => RiskAssessment {
                        level,
                        path: InferencePath::ModelBacked,
                    },
                    Err(err) => {
                        warn!(
                            city,
                            stratum = %stratum,
                            month = month.value(),
                            error = %err,
                            "risk model failed; using rule-based classification"
                        );
                        rule_based()
                    }
                }
            }
        }
    }
}

fn model_backed_level(
    bundle: &ModelBundle,
    stratum: &StratumKey,
    consumption: f64,
    month: Month,
    climate: ClimateObservation,
) -> Result<RiskLevel, ModelError> {
    let classifier = bundle.risk_classifier()?;
    let features = FeatureBuilder::with_encoder(&classifier.stratum_encoder).build(
        stratum,
        month,
        climate,
    )?;
    let code = classifier
        .model
        .predict(&features.classification_row(consumption)?)?;
    let label = classifier.risk_encoder.decode(code)?;

    RiskLevel::from_label(label).ok_or_else(|| ModelError::UnknownRiskLabel(label.to_string()))
}

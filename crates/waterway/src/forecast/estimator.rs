use super::context::{ForecastContext, Inference};
use super::domain::{
    round2, ClimateObservation, ConsumptionEstimate, InferencePath, Month, StratumKey,
};
use super::features::FeatureBuilder;
use super::model::{ModelBundle, ModelError};
use tracing::warn;

/// Consumption change per °C above the reference temperature.
const TEMPERATURE_SENSITIVITY: f64 = 0.02;
/// Consumption change per mm of rain above the reference precipitation.
const PRECIPITATION_SENSITIVITY: f64 = 0.001;

/// Monthly consumption estimator; the trained regressor when one is loaded, the climate
/// rule otherwise or whenever the regressor fails for a call.
#[derive(Debug, Clone, Copy)]
pub struct ConsumptionEstimator<'a> {
    context: &'a ForecastContext,
}

impl<'a> ConsumptionEstimator<'a> {
    pub fn new(context: &'a ForecastContext) -> Self {
        Self { context }
    }

    pub fn estimate(
        &self,
        stratum: &StratumKey,
        month: Month,
        climate: ClimateObservation,
    ) -> ConsumptionEstimate {
        let (value, path) = match self.context.inference() {
            Inference::RuleBased => (
                rule_based_consumption(stratum, climate),
                InferencePath::RuleBased,
            ),
            Inference::ModelBacked(bundle) => {
                match model_backed_consumption(bundle, stratum, month, climate) {
                    Ok(value) => (value, InferencePath::ModelBacked),
                    Err(err) => {
                        warn!(
                            stratum = %stratum,
                            month = month.value(),
                            error = %err,
                            "consumption model failed; using rule-based estimate"
                        );
                        (
                            rule_based_consumption(stratum, climate),
                            InferencePath::RuleBased,
                        )
                    }
                }
            }
        };

        ConsumptionEstimate {
            stratum: stratum.clone(),
            month,
            value_m3: value,
            path,
        }
    }
}

/// Reference consumption scaled linearly by the deviation from the normal climate.
pub fn rule_based_consumption(stratum: &StratumKey, climate: ClimateObservation) -> f64 {
    let base = stratum.reference_consumption();
    let reference = ClimateObservation::REFERENCE;
    let factor = 1.0
        + TEMPERATURE_SENSITIVITY * (climate.temperature_c - reference.temperature_c)
        - PRECIPITATION_SENSITIVITY * (climate.precipitation_mm - reference.precipitation_mm);

    round2(base * factor).max(0.0)
}

fn model_backed_consumption(
    bundle: &ModelBundle,
    stratum: &StratumKey,
    month: Month,
    climate: ClimateObservation,
) -> Result<f64, ModelError> {
    let predictor = bundle.consumption_predictor()?;
    let features = FeatureBuilder::with_encoder(&predictor.stratum_encoder).build(
        stratum,
        month,
        climate,
    )?;
    let scaled = predictor.scaler.transform(&features.regression_row()?)?;
    let prediction = predictor.model.predict(&scaled)?;

    Ok(round2(prediction).max(0.0))
}

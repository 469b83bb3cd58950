use super::domain::{ClimateObservation, Month, StratumKey};
use super::model::{LabelEncoder, ModelError};

/// Moving-average and percentile stand-in fed to the risk classifier.
const CONSUMPTION_PERCENTILE_PLACEHOLDER: f64 = 0.5;

/// Named inputs shared by both inference paths.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub stratum: StratumKey,
    pub month: Month,
    pub quarter: u32,
    pub day_of_year_proxy: u32,
    pub climate: ClimateObservation,
    pub baseline_consumption: f64,
    /// Present only when built against a fitted encoder.
    pub encoded_stratum: Option<usize>,
}

impl FeatureVector {
    /// Regressor column order: month, quarter, day proxy, precipitation, temperature,
    /// baseline, encoded stratum.
    pub(crate) fn regression_row(&self) -> Result<[f64; 7], ModelError> {
        let encoded = self.encoded()?;
        Ok([
            f64::from(self.month.value()),
            f64::from(self.quarter),
            f64::from(self.day_of_year_proxy),
            self.climate.precipitation_mm,
            self.climate.temperature_c,
            self.baseline_consumption,
            encoded,
        ])
    }

    /// Classifier column order: month, encoded stratum, consumption, precipitation,
    /// temperature, moving average, percentile.
    pub(crate) fn classification_row(&self, consumption: f64) -> Result<[f64; 7], ModelError> {
        let encoded = self.encoded()?;
        Ok([
            f64::from(self.month.value()),
            encoded,
            consumption,
            self.climate.precipitation_mm,
            self.climate.temperature_c,
            consumption,
            CONSUMPTION_PERCENTILE_PLACEHOLDER,
        ])
    }

    fn encoded(&self) -> Result<f64, ModelError> {
        self.encoded_stratum
            .map(|code| code as f64)
            .ok_or_else(|| ModelError::UnseenCategory(self.stratum.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureBuilder<'a> {
    encoder: Option<&'a LabelEncoder>,
}

impl<'a> FeatureBuilder<'a> {
    pub fn rule_based() -> Self {
        Self { encoder: None }
    }

    pub fn with_encoder(encoder: &'a LabelEncoder) -> Self {
        Self {
            encoder: Some(encoder),
        }
    }

    pub fn build(
        &self,
        stratum: &StratumKey,
        month: Month,
        climate: ClimateObservation,
    ) -> Result<FeatureVector, ModelError> {
        let encoded_stratum = self
            .encoder
            .map(|encoder| encoder.encode_stratum(stratum))
            .transpose()?;

        Ok(FeatureVector {
            stratum: stratum.clone(),
            month,
            quarter: month.quarter(),
            day_of_year_proxy: month.day_of_year_proxy(),
            climate,
            baseline_consumption: stratum.reference_consumption(),
            encoded_stratum,
        })
    }
}

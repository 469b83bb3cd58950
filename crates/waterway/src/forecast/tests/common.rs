use std::sync::Arc;

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::forecast::model::{
    LabelEncoder, LinearClassifier, ModelBundle, RiskClassifierModel, TrainingMetadata,
};
use crate::forecast::router::{forecast_router, ForecastState};
use crate::forecast::{ForecastContext, ScenarioProjection};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn projection(
    date: &str,
    stratum: &str,
    actual: f64,
    pessimistic: f64,
    optimistic: f64,
) -> ScenarioProjection {
    ScenarioProjection::from_scenarios(
        date.to_string(),
        stratum.into(),
        actual,
        pessimistic,
        optimistic,
    )
}

/// A year of records for one stratum, the shape an exported projection file has.
pub(super) fn stratum_year(stratum: &str, year: i32, actual: f64) -> Vec<ScenarioProjection> {
    (1..=12)
        .map(|month| {
            projection(
                &format!("{year}-{month:02}-01"),
                stratum,
                actual,
                actual * 1.1,
                actual * 1.05,
            )
        })
        .collect()
}

/// Classifier that answers "Alto" from July through December and "Bajo" otherwise.
pub(super) fn second_half_risk_bundle() -> ModelBundle {
    let mut low = vec![0.0; 7];
    low[0] = -1.0;
    let mut high = vec![0.0; 7];
    high[0] = 1.0;

    ModelBundle {
        consumption_predictor: None,
        risk_classifier: Some(RiskClassifierModel {
            model: LinearClassifier {
                coefficients: vec![low, high],
                intercepts: vec![6.5, -6.5],
            },
            stratum_encoder: LabelEncoder {
                classes: vec!["1".into(), "2".into(), "3".into()],
            },
            risk_encoder: LabelEncoder {
                classes: vec!["Bajo".into(), "Alto".into()],
            },
        }),
        projections: Vec::new(),
        metadata: TrainingMetadata {
            trained_on: Some("2025-09-30".into()),
            consumption_records: Some(1_440),
            strata: vec!["1".into(), "2".into(), "3".into()],
            r2: Some(0.91),
        },
    }
}

pub(super) fn router_with_context(context: ForecastContext) -> axum::Router {
    forecast_router(Arc::new(ForecastState::new(context, "Medellín")))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

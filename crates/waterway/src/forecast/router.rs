use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::analysis::{analyze, ForecastAnalysis};
use super::classifier::RiskClassifier;
use super::context::ForecastContext;
use super::domain::{
    ClimateObservation, ForecastError, InferencePath, Month, RiskLevel, ScenarioProjection,
    StratumKey,
};
use super::estimator::ConsumptionEstimator;
use super::model::TrainingMetadata;
use super::projection::{ProjectionEngine, ProjectionSource};
use crate::error::AppError;

const DEFAULT_STRATUM: &str = "3";
const DEFAULT_CONSUMPTION_M3: f64 = 20.0;

/// Shared, read-only state behind every forecast route.
#[derive(Debug)]
pub struct ForecastState {
    pub context: ForecastContext,
    pub default_city: String,
}

impl ForecastState {
    pub fn new(context: ForecastContext, default_city: impl Into<String>) -> Self {
        Self {
            context,
            default_city: default_city.into(),
        }
    }

    fn city(&self, requested: Option<String>) -> String {
        requested
            .map(|city| city.trim().to_string())
            .filter(|city| !city.is_empty())
            .unwrap_or_else(|| self.default_city.clone())
    }
}

/// Router builder exposing the forecast engine over HTTP.
pub fn forecast_router(state: Arc<ForecastState>) -> Router {
    Router::new()
        .route("/api/v1/forecast/status", get(status_handler))
        .route("/api/v1/forecast/projections", get(projections_handler))
        .route("/api/v1/forecast/consumption", post(consumption_handler))
        .route("/api/v1/forecast/risk", post(risk_handler))
        .route("/api/v1/forecast/analysis", get(analysis_handler))
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct StatusResponse<'a> {
    pub model_enabled: bool,
    pub precomputed_enabled: bool,
    pub precomputed_records: usize,
    pub metadata: Option<&'a TrainingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectionQuery {
    pub city: Option<String>,
    pub stratum: Option<String>,
    pub now: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProjectionResponse {
    pub city: String,
    pub stratum: Option<StratumKey>,
    pub model_enabled: bool,
    pub source: ProjectionSource,
    pub projections: Vec<ScenarioProjection>,
    pub total_months: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConsumptionRequest {
    pub stratum: Option<StratumKey>,
    pub month: Option<i64>,
    pub precipitation: Option<f64>,
    pub temperature: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ConsumptionResponse {
    pub stratum: StratumKey,
    pub month: Month,
    pub consumption_m3: f64,
    pub path: InferencePath,
    pub model_enabled: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct RiskRequest {
    pub city: Option<String>,
    pub stratum: Option<StratumKey>,
    pub consumption: Option<f64>,
    pub month: Option<i64>,
    pub precipitation: Option<f64>,
    pub temperature: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct RiskResponse {
    pub city: String,
    pub stratum: StratumKey,
    pub risk_level: RiskLevel,
    pub path: InferencePath,
    pub model_enabled: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalysisQuery {
    pub city: Option<String>,
    pub now: Option<String>,
}

pub(crate) async fn status_handler(State(state): State<Arc<ForecastState>>) -> Response {
    let context = &state.context;
    let body = StatusResponse {
        model_enabled: context.model_enabled(),
        precomputed_enabled: context.precomputed_enabled(),
        precomputed_records: context.precomputed().len(),
        metadata: context.bundle().map(|bundle| &bundle.metadata),
    };
    (StatusCode::OK, Json(body)).into_response()
}

pub(crate) async fn projections_handler(
    State(state): State<Arc<ForecastState>>,
    Query(query): Query<ProjectionQuery>,
) -> Result<Json<ProjectionResponse>, AppError> {
    let now = reference_date(query.now.as_deref())?;
    let city = state.city(query.city);
    let stratum = query
        .stratum
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(StratumKey::new);

    let set = ProjectionEngine::new(&state.context).obtain(&city, stratum.as_ref(), now);
    let total_months = set.total_months();

    Ok(Json(ProjectionResponse {
        city,
        stratum,
        model_enabled: state.context.model_enabled(),
        source: set.source,
        projections: set.projections,
        total_months,
    }))
}

pub(crate) async fn consumption_handler(
    State(state): State<Arc<ForecastState>>,
    Json(request): Json<ConsumptionRequest>,
) -> Result<Json<ConsumptionResponse>, AppError> {
    let stratum = request
        .stratum
        .unwrap_or_else(|| StratumKey::new(DEFAULT_STRATUM));
    let month = request_month(request.month)?;
    let climate = ClimateObservation::from_optional(request.precipitation, request.temperature)?;

    let estimate = ConsumptionEstimator::new(&state.context).estimate(&stratum, month, climate);

    Ok(Json(ConsumptionResponse {
        stratum: estimate.stratum,
        month: estimate.month,
        consumption_m3: estimate.value_m3,
        path: estimate.path,
        model_enabled: state.context.model_enabled(),
    }))
}

pub(crate) async fn risk_handler(
    State(state): State<Arc<ForecastState>>,
    Json(request): Json<RiskRequest>,
) -> Result<Json<RiskResponse>, AppError> {
    let city = state.city(request.city);
    let stratum = request
        .stratum
        .unwrap_or_else(|| StratumKey::new(DEFAULT_STRATUM));
    let consumption = request.consumption.unwrap_or(DEFAULT_CONSUMPTION_M3);
    if !consumption.is_finite() {
        return Err(ForecastError::NonFinite {
            field: "consumption",
            value: consumption,
        }
        .into());
    }
    let month = request_month(request.month)?;
    let climate = ClimateObservation::from_optional(request.precipitation, request.temperature)?;

    let assessment =
        RiskClassifier::new(&state.context).classify(&city, &stratum, consumption, month, climate);

    Ok(Json(RiskResponse {
        city,
        stratum,
        risk_level: assessment.level,
        path: assessment.path,
        model_enabled: state.context.model_enabled(),
    }))
}

pub(crate) async fn analysis_handler(
    State(state): State<Arc<ForecastState>>,
    Query(query): Query<AnalysisQuery>,
) -> Result<Json<ForecastAnalysis>, AppError> {
    let now = reference_date(query.now.as_deref())?;
    let city = state.city(query.city);
    Ok(Json(analyze(&state.context, &city, now)))
}

/// Parses an explicit `YYYY-MM-DD` reference date, falling back to today's local date.
pub fn reference_date(raw: Option<&str>) -> Result<NaiveDate, ForecastError> {
    match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => parse_date(raw),
        None => Ok(Local::now().date_naive()),
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, ForecastError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ForecastError::InvalidDate(raw.to_string()))
}

fn request_month(month: Option<i64>) -> Result<Month, ForecastError> {
    match month {
        Some(value) => Month::new(value),
        None => Ok(Month::from(Local::now().date_naive())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_reference_dates_default_to_today() {
        let today = Local::now().date_naive();
        assert_eq!(reference_date(None), Ok(today));
        assert_eq!(reference_date(Some("  ")), Ok(today));
        assert_eq!(
            reference_date(Some("2025-10-01")),
            Ok(NaiveDate::from_ymd_opt(2025, 10, 1).expect("valid date"))
        );
    }

    #[test]
    fn malformed_dates_are_input_errors() {
        assert_eq!(
            parse_date("01/10/2025"),
            Err(ForecastError::InvalidDate("01/10/2025".to_string()))
        );
    }
}

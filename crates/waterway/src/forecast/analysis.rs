use super::aggregation::aggregate_by_month;
use super::context::ForecastContext;
use super::domain::{round2, MonthlyAggregate, RiskLevel, ScenarioProjection};
use super::projection::{ProjectionEngine, ProjectionSource, HORIZON_MONTHS};
use super::summary::RiskSummarizer;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

/// City-wide view: aggregated projections for every stratum plus the risk verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastAnalysis {
    pub city: String,
    pub model_enabled: bool,
    pub precomputed_enabled: bool,
    pub projection_source: ProjectionSource,
    pub analyzed_on: NaiveDate,
    pub monthly_projections: Vec<MonthlyAggregate>,
    pub predominant_risk: RiskLevel,
    pub monthly_risks: Vec<RiskLevel>,
    pub recommendation: String,
}

pub fn analyze(context: &ForecastContext, city: &str, now: NaiveDate) -> ForecastAnalysis {
    let projections = ProjectionEngine::new(context).obtain(city, None, now);
    let monthly_projections = aggregate_by_month(&projections.projections);
    let summary = RiskSummarizer::new(context).summarize(city, now, &monthly_projections);

    info!(
        city,
        source = ?projections.source,
        months = monthly_projections.len(),
        predominant_risk = summary.predominant_level.label(),
        "forecast analysis completed"
    );

    ForecastAnalysis {
        city: city.to_string(),
        model_enabled: context.model_enabled(),
        precomputed_enabled: context.precomputed_enabled(),
        projection_source: projections.source,
        analyzed_on: now,
        monthly_projections,
        predominant_risk: summary.predominant_level,
        monthly_risks: summary.monthly_sequence,
        recommendation: summary.recommendation,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectionOutlook {
    pub horizon_records: usize,
    pub mean_pessimistic_increase_pct: f64,
}

/// Mean pessimistic delta over the first twelve records; missing deltas count as zero.
pub fn outlook(projections: &[ScenarioProjection]) -> ProjectionOutlook {
    let horizon = &projections[..projections.len().min(HORIZON_MONTHS as usize)];
    let mean = if horizon.is_empty() {
        0.0
    } else {
        let total: f64 = horizon
            .iter()
            .map(|projection| projection.delta_pessimistic_pct.unwrap_or(0.0))
            .sum();
        round2(total / horizon.len() as f64)
    };

    ProjectionOutlook {
        horizon_records: horizon.len(),
        mean_pessimistic_increase_pct: mean,
    }
}

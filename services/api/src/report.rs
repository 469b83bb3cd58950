use crate::infra::override_artifacts;
use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};
use std::path::PathBuf;
use waterway::config::AppConfig;
use waterway::error::AppError;
use waterway::forecast::{
    aggregate_by_month, analyze, outlook, rule_based_score, ClimateObservation,
    ConsumptionEstimator, ForecastAnalysis, ForecastContext, ForecastError, InferencePath, Month,
    ProjectionEngine, ProjectionSet, RiskClassifier, StratumKey,
};
use waterway::telemetry;

#[derive(Subcommand, Debug)]
pub(crate) enum ForecastCommand {
    /// Print the 12-month scenario projections for one stratum or the whole city
    Project(ProjectArgs),
    /// Estimate monthly consumption for a stratum
    Estimate(EstimateArgs),
    /// Classify hydric risk for a month and climate
    Classify(ClassifyArgs),
    /// Run the full analysis: aggregated projections, risk sequence and recommendation
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ArtifactArgs {
    /// Trained model bundle (JSON). Overrides WATERWAY_MODEL_PATH.
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
    /// Precomputed projections (.json or .csv). Overrides WATERWAY_PROJECTIONS_PATH.
    #[arg(long)]
    pub(crate) projections: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ClimateArgs {
    /// Monthly precipitation in mm (defaults to 150)
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) precipitation: Option<f64>,
    /// Mean temperature in °C (defaults to 22)
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) temperature: Option<f64>,
}

#[derive(Args, Debug)]
pub(crate) struct ProjectArgs {
    #[command(flatten)]
    pub(crate) artifacts: ArtifactArgs,
    /// City the projections are reported for
    #[arg(long)]
    pub(crate) city: Option<String>,
    /// Restrict projections to one stratum ("1".."6", Comercial, Industrial)
    #[arg(long)]
    pub(crate) stratum: Option<String>,
    /// Reference date for synthesized projections (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) now: Option<NaiveDate>,
    /// Also print the per-month totals across strata
    #[arg(long)]
    pub(crate) aggregate: bool,
}

#[derive(Args, Debug)]
pub(crate) struct EstimateArgs {
    #[command(flatten)]
    pub(crate) artifacts: ArtifactArgs,
    #[command(flatten)]
    pub(crate) climate: ClimateArgs,
    /// Stratum to estimate
    #[arg(long, default_value = "3")]
    pub(crate) stratum: String,
    /// Calendar month, 1 through 12
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) month: i64,
}

#[derive(Args, Debug)]
pub(crate) struct ClassifyArgs {
    #[command(flatten)]
    pub(crate) artifacts: ArtifactArgs,
    #[command(flatten)]
    pub(crate) climate: ClimateArgs,
    /// City echoed in the report
    #[arg(long)]
    pub(crate) city: Option<String>,
    /// Stratum to classify
    #[arg(long, default_value = "3")]
    pub(crate) stratum: String,
    /// Monthly consumption in m³
    #[arg(long, default_value_t = 20.0)]
    pub(crate) consumption: f64,
    /// Calendar month, 1 through 12
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) month: i64,
}

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    #[command(flatten)]
    pub(crate) artifacts: ArtifactArgs,
    /// City to analyze
    #[arg(long)]
    pub(crate) city: Option<String>,
    /// Reference date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) now: Option<NaiveDate>,
}

/// Configuration and artifacts resolved for one CLI invocation.
struct Session {
    context: ForecastContext,
    default_city: String,
}

impl Session {
    fn open(artifacts: ArtifactArgs) -> Result<Self, AppError> {
        let config = AppConfig::load()?;
        telemetry::init(&config.telemetry)?;
        let paths = override_artifacts(config.artifacts, artifacts.model, artifacts.projections);
        Ok(Self {
            context: ForecastContext::load(&paths),
            default_city: config.forecast.default_city,
        })
    }

    fn city(&self, requested: Option<String>) -> String {
        requested
            .map(|city| city.trim().to_string())
            .filter(|city| !city.is_empty())
            .unwrap_or_else(|| self.default_city.clone())
    }
}

pub(crate) fn run_project(args: ProjectArgs) -> Result<(), AppError> {
    let session = Session::open(args.artifacts)?;
    let city = session.city(args.city);
    let stratum = args.stratum.as_deref().map(StratumKey::new);
    let now = args.now.unwrap_or_else(|| Local::now().date_naive());

    let set = ProjectionEngine::new(&session.context).obtain(&city, stratum.as_ref(), now);
    render_projections(&city, &set, session.context.model_enabled());
    if args.aggregate {
        render_monthly_totals(&set);
    }
    Ok(())
}

pub(crate) fn run_estimate(args: EstimateArgs) -> Result<(), AppError> {
    let session = Session::open(args.artifacts)?;
    let stratum = StratumKey::new(&args.stratum);
    let month = Month::new(args.month)?;
    let climate = climate(&args.climate)?;

    let estimate = ConsumptionEstimator::new(&session.context).estimate(&stratum, month, climate);

    println!("Consumption estimate");
    println!(
        "- Stratum {} | month {} | {:.0} mm | {:.1} °C",
        estimate.stratum,
        estimate.month.value(),
        climate.precipitation_mm,
        climate.temperature_c
    );
    println!("- {:.2} m³ ({})", estimate.value_m3, path_label(estimate.path));
    Ok(())
}

pub(crate) fn run_classify(args: ClassifyArgs) -> Result<(), AppError> {
    let session = Session::open(args.artifacts)?;
    let city = session.city(args.city);
    let stratum = StratumKey::new(&args.stratum);
    let month = Month::new(args.month)?;
    let climate = climate(&args.climate)?;
    if !args.consumption.is_finite() {
        return Err(ForecastError::NonFinite {
            field: "consumption",
            value: args.consumption,
        }
        .into());
    }

    let assessment = RiskClassifier::new(&session.context).classify(
        &city,
        &stratum,
        args.consumption,
        month,
        climate,
    );

    println!("Hydric risk for {city}");
    println!(
        "- Stratum {} | month {} | {:.1} m³ | {:.0} mm | {:.1} °C",
        stratum,
        month.value(),
        args.consumption,
        climate.precipitation_mm,
        climate.temperature_c
    );
    println!(
        "- Risk level: {} ({})",
        assessment.level.label(),
        path_label(assessment.path)
    );

    let score = rule_based_score(args.consumption, month, climate);
    if score.factors.is_empty() {
        println!("- Rule score: {} (no factors triggered)", score.score);
    } else {
        let factors: Vec<String> = score
            .factors
            .iter()
            .map(|factor| format!("{factor:?} +{}", factor.points()))
            .collect();
        println!("- Rule score: {} ({})", score.score, factors.join(", "));
    }
    Ok(())
}

pub(crate) fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let session = Session::open(args.artifacts)?;
    let city = session.city(args.city);
    let now = args.now.unwrap_or_else(|| Local::now().date_naive());

    let analysis = analyze(&session.context, &city, now);
    render_analysis(&analysis);
    Ok(())
}

fn climate(args: &ClimateArgs) -> Result<ClimateObservation, ForecastError> {
    ClimateObservation::from_optional(args.precipitation, args.temperature)
}

fn path_label(path: InferencePath) -> &'static str {
    match path {
        InferencePath::ModelBacked => "trained model",
        InferencePath::RuleBased => "rule-based",
    }
}

fn render_projections(city: &str, set: &ProjectionSet, model_enabled: bool) {
    println!("Scenario projections for {city}");
    println!(
        "Source: {:?} | model {} | {} records over {} months",
        set.source,
        if model_enabled { "enabled" } else { "disabled" },
        set.projections.len(),
        set.total_months()
    );

    let outlook = outlook(&set.projections);
    println!(
        "Mean pessimistic increase (first {} records): {:+.2}%",
        outlook.horizon_records, outlook.mean_pessimistic_increase_pct
    );

    println!("\nDate        Stratum     Actual  Pessimistic  Optimistic");
    for projection in &set.projections {
        println!(
            "{:<11} {:<10} {:>8.2} {:>12.2} {:>11.2}",
            projection.date,
            projection.stratum,
            projection.consumption_actual,
            projection.consumption_pessimistic,
            projection.consumption_optimistic
        );
    }
}

fn render_monthly_totals(set: &ProjectionSet) {
    let aggregates = aggregate_by_month(&set.projections);
    if aggregates.is_empty() {
        println!("\nMonthly totals: none");
        return;
    }

    println!("\nMonthly totals");
    for aggregate in &aggregates {
        println!(
            "- {}: {:.2} m³ actual | {:.2} pessimistic | {:.2} optimistic | {}",
            aggregate.month_key,
            aggregate.total_actual,
            aggregate.total_pessimistic,
            aggregate.total_optimistic,
            increase_label(aggregate.increase_pct)
        );
    }
}

fn render_analysis(analysis: &ForecastAnalysis) {
    println!("Hydric risk analysis for {}", analysis.city);
    println!(
        "Analyzed on {} | projections: {:?} | model {} | precomputed {}",
        analysis.analyzed_on,
        analysis.projection_source,
        if analysis.model_enabled { "on" } else { "off" },
        if analysis.precomputed_enabled { "on" } else { "off" }
    );

    println!("\nMonthly projections");
    for aggregate in &analysis.monthly_projections {
        println!(
            "- {}: {:.2} m³ actual | {:.2} pessimistic | {}",
            aggregate.month_key,
            aggregate.total_actual,
            aggregate.total_pessimistic,
            increase_label(aggregate.increase_pct)
        );
    }

    let sequence: Vec<&str> = analysis
        .monthly_risks
        .iter()
        .map(|level| level.label())
        .collect();
    println!("\nRisk sequence: {}", sequence.join(", "));
    println!("Predominant risk: {}", analysis.predominant_risk.label());
    println!("Recommendation: {}", analysis.recommendation);
}

fn increase_label(increase_pct: Option<f64>) -> String {
    match increase_pct {
        Some(pct) => format!("{pct:+.2}%"),
        None => "n/a".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increases_render_signed_or_unavailable() {
        assert_eq!(increase_label(Some(7.0)), "+7.00%");
        assert_eq!(increase_label(Some(-1.5)), "-1.50%");
        assert_eq!(increase_label(None), "n/a");
    }

    #[test]
    fn climate_flags_default_to_reference() {
        let observed = climate(&ClimateArgs::default()).expect("defaults are finite");
        assert_eq!(observed, ClimateObservation::REFERENCE);

        let partial = ClimateArgs {
            precipitation: Some(80.0),
            temperature: None,
        };
        let observed = climate(&partial).expect("finite");
        assert_eq!(observed.precipitation_mm, 80.0);
        assert_eq!(observed.temperature_c, 22.0);
    }

    #[test]
    fn blank_cities_fall_back_to_the_configured_default() {
        let session = Session {
            context: ForecastContext::rule_based(),
            default_city: "Medellín".to_string(),
        };
        assert_eq!(session.city(None), "Medellín");
        assert_eq!(session.city(Some(String::new())), "Medellín");
        assert_eq!(session.city(Some("   ".to_string())), "Medellín");
        assert_eq!(session.city(Some(" Cali ".to_string())), "Cali");
    }

    #[test]
    fn opening_a_session_installs_logging_before_loading_artifacts() {
        let missing = std::env::temp_dir().join("waterway-report-missing-bundle.json");
        let session = Session::open(ArtifactArgs {
            model: Some(missing),
            projections: None,
        })
        .expect("session opens without artifacts");

        assert!(tracing::dispatcher::has_been_set());
        assert!(!session.context.model_enabled());
    }

    #[test]
    fn non_finite_climate_flags_are_rejected() {
        let args = ClimateArgs {
            precipitation: Some(f64::NAN),
            temperature: None,
        };
        assert!(climate(&args).is_err());
    }
}

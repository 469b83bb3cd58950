use super::common::*;

use crate::forecast::{
    aggregate_by_month, analyze, ClimateObservation, ForecastContext, InferencePath, Month,
    ProjectionSource, RiskClassifier, RiskLevel, RiskSummarizer,
};

#[test]
fn model_backed_sequence_wraps_and_breaks_ties_by_first_occurrence() {
    let context = ForecastContext::new(Some(second_half_risk_bundle()), Vec::new());
    let summarizer = RiskSummarizer::new(&context);
    let aggregates = aggregate_by_month(&stratum_year("3", 2026, 19.0));

    // Nov, Dec, Jan..Jun, Jul..Oct: six high months and six low months.
    let november = summarizer.summarize("Medellín", date(2025, 11, 3), &aggregates);
    assert_eq!(november.monthly_sequence[..2], [RiskLevel::High, RiskLevel::High]);
    assert_eq!(november.monthly_sequence[2], RiskLevel::Low);
    assert_eq!(november.predominant_level, RiskLevel::High);

    let january = summarizer.summarize("Medellín", date(2026, 1, 3), &aggregates);
    assert_eq!(january.monthly_sequence[0], RiskLevel::Low);
    assert_eq!(january.predominant_level, RiskLevel::Low);
}

#[test]
fn demand_growth_at_the_threshold_adds_no_clause() {
    let context = ForecastContext::new(Some(second_half_risk_bundle()), Vec::new());
    // every month rises exactly 10% under the pessimistic scenario
    let aggregates = aggregate_by_month(&stratum_year("3", 2026, 19.0));
    let summarizer = RiskSummarizer::new(&context);

    let summary = summarizer.summarize("Medellín", date(2025, 7, 1), &aggregates);

    assert_eq!(summary.predominant_level, RiskLevel::High);
    assert_eq!(
        summary.recommendation,
        "Implement immediate contingency plan | Restrict consumption in non-essential sectors"
    );
}

#[test]
fn classifier_reports_model_path_for_known_strata() {
    let context = ForecastContext::new(Some(second_half_risk_bundle()), Vec::new());
    let classifier = RiskClassifier::new(&context);
    let month = Month::new(9).expect("valid month");

    let reference = ClimateObservation::REFERENCE;

    let assessment = classifier.classify("Medellín", &"3".into(), 20.0, month, reference);

    assert_eq!(assessment.path, InferencePath::ModelBacked);
    assert_eq!(assessment.level, RiskLevel::High);
}

#[test]
fn analysis_uses_precomputed_records_when_present() {
    let mut precomputed = stratum_year("1", 2026, 15.0);
    precomputed.extend(stratum_year("2", 2026, 17.0));
    let context = ForecastContext::new(None, precomputed);

    let analysis = analyze(&context, "Medellín", date(2025, 12, 1));

    assert_eq!(analysis.projection_source, ProjectionSource::Precomputed);
    assert!(analysis.precomputed_enabled);
    assert_eq!(analysis.monthly_projections.len(), 12);
    assert_eq!(analysis.monthly_projections[0].total_actual, 32.0);
    assert_eq!(analysis.analyzed_on, date(2025, 12, 1));
}

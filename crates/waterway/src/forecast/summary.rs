use super::classifier::RiskClassifier;
use super::context::ForecastContext;
use super::domain::{ClimateObservation, Month, MonthlyAggregate, RiskLevel, StratumKey};
use super::projection::HORIZON_MONTHS;
use chrono::NaiveDate;
use serde::Serialize;

/// Stratum and consumption the monthly risk sequence is evaluated for.
const REFERENCE_STRATUM: &str = "3";
const REFERENCE_CONSUMPTION_M3: f64 = 20.0;
/// Mean pessimistic increase above which an infrastructure clause is added.
const DEMAND_ALERT_PCT: f64 = 10.0;

const INSUFFICIENT_DATA: &str = "Not enough data to generate recommendations";
const REGULAR_MONITORING: &str = "Maintain regular monitoring";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskSummary {
    pub predominant_level: RiskLevel,
    pub monthly_sequence: Vec<RiskLevel>,
    pub recommendation: String,
}

#[derive(Debug, Clone, Copy)]
pub struct RiskSummarizer<'a> {
    classifier: RiskClassifier<'a>,
}

impl<'a> RiskSummarizer<'a> {
    pub fn new(context: &'a ForecastContext) -> Self {
        Self {
            classifier: RiskClassifier::new(context),
        }
    }

    /// Classifies the reference stratum for twelve months starting at the month of `now`
    /// and condenses the sequence into a verdict.
    pub fn summarize(
        &self,
        city: &str,
        now: NaiveDate,
        aggregates: &[MonthlyAggregate],
    ) -> RiskSummary {
        let stratum = StratumKey::new(REFERENCE_STRATUM);
        let start = Month::from(now);
        let monthly_sequence: Vec<RiskLevel> = (0..HORIZON_MONTHS)
            .map(|offset| {
                self.classifier
                    .classify(
                        city,
                        &stratum,
                        REFERENCE_CONSUMPTION_M3,
                        start.advance(offset),
                        ClimateObservation::REFERENCE,
                    )
                    .level
            })
            .collect();

        // The sequence always has twelve entries.
        let predominant_level = predominant_level(&monthly_sequence).unwrap_or(RiskLevel::Low);

        RiskSummary {
            predominant_level,
            recommendation: recommendation(predominant_level, aggregates),
            monthly_sequence,
        }
    }
}

/// Most frequent level; ties go to the level that appears first.
pub fn predominant_level(levels: &[RiskLevel]) -> Option<RiskLevel> {
    let mut counts: Vec<(RiskLevel, usize)> = Vec::with_capacity(3);
    for level in levels {
        match counts.iter_mut().find(|(seen, _)| seen == level) {
            Some((_, count)) => *count += 1,
            None => counts.push((*level, 1)),
        }
    }

    let mut best: Option<(RiskLevel, usize)> = None;
    for (level, count) in counts {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((level, count));
        }
    }
    best.map(|(level, _)| level)
}

pub fn recommendation(level: RiskLevel, aggregates: &[MonthlyAggregate]) -> String {
    if aggregates.is_empty() {
        return INSUFFICIENT_DATA.to_string();
    }

    let mut clauses: Vec<String> = match level {
        RiskLevel::High => vec![
            "Implement immediate contingency plan".into(),
            "Restrict consumption in non-essential sectors".into(),
        ],
        RiskLevel::Medium => vec![
            "Monitor consumption weekly".into(),
            "Run water-saving campaigns".into(),
        ],
        RiskLevel::Low => Vec::new(),
    };

    if let Some(mean) = mean_increase(aggregates) {
        if mean > DEMAND_ALERT_PCT {
            clauses.push(format!("Projected demand: +{mean:.1}%. Reinforce infrastructure"));
        }
    }

    if clauses.is_empty() {
        REGULAR_MONITORING.to_string()
    } else {
        clauses.join(" | ")
    }
}

/// Mean of the defined monthly increases; months with a zero baseline are left out.
fn mean_increase(aggregates: &[MonthlyAggregate]) -> Option<f64> {
    let increases: Vec<f64> = aggregates.iter().filter_map(|a| a.increase_pct).collect();
    if increases.is_empty() {
        None
    } else {
        Some(increases.iter().sum::<f64>() / increases.len() as f64)
    }
}

use super::context::ForecastContext;
use super::domain::{Month, Scenario, ScenarioProjection, StratumKey};
use super::estimator::ConsumptionEstimator;
use chrono::{Months, NaiveDate};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

pub const HORIZON_MONTHS: u32 = 12;

/// Tier that supplied a projection set, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionSource {
    Precomputed,
    ModelEmbedded,
    Synthesized,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionSet {
    pub source: ProjectionSource,
    pub projections: Vec<ScenarioProjection>,
}

impl ProjectionSet {
    /// Number of distinct `YYYY-MM` keys covered.
    pub fn total_months(&self) -> usize {
        self.projections
            .iter()
            .filter_map(ScenarioProjection::month_key)
            .collect::<BTreeSet<_>>()
            .len()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ProjectionEngine<'a> {
    context: &'a ForecastContext,
    estimator: ConsumptionEstimator<'a>,
}

impl<'a> ProjectionEngine<'a> {
    pub fn new(context: &'a ForecastContext) -> Self {
        Self {
            context,
            estimator: ConsumptionEstimator::new(context),
        }
    }

    /// Resolves projections from the first non-empty tier: precomputed file, projections
    /// embedded in the model bundle, then synthesis from `now`.
    pub fn obtain(
        &self,
        city: &str,
        stratum: Option<&StratumKey>,
        now: NaiveDate,
    ) -> ProjectionSet {
        let precomputed = filter_stratum(self.context.precomputed(), stratum);
        if !precomputed.is_empty() {
            debug!(city, records = precomputed.len(), "serving precomputed projections");
            return ProjectionSet {
                source: ProjectionSource::Precomputed,
                projections: precomputed,
            };
        }

        if let Some(bundle) = self.context.bundle() {
            let embedded = filter_stratum(&bundle.projections, stratum);
            if !embedded.is_empty() {
                debug!(city, records = embedded.len(), "serving model-embedded projections");
                return ProjectionSet {
                    source: ProjectionSource::ModelEmbedded,
                    projections: embedded,
                };
            }
        }

        debug!(city, %now, "synthesizing projections");
        ProjectionSet {
            source: ProjectionSource::Synthesized,
            projections: self.synthesize(stratum, now),
        }
    }

    /// Twelve monthly projections per stratum in scope, one calendar month apart starting
    /// the month after `now`.
    pub fn synthesize(
        &self,
        stratum: Option<&StratumKey>,
        now: NaiveDate,
    ) -> Vec<ScenarioProjection> {
        let strata = match stratum {
            Some(stratum) => vec![stratum.clone()],
            None => StratumKey::canonical(),
        };
        let mut projections = Vec::with_capacity(strata.len() * HORIZON_MONTHS as usize);

        for stratum in &strata {
            for offset in 1..=HORIZON_MONTHS {
                let Some(date) = now.checked_add_months(Months::new(offset)) else {
                    break;
                };
                let month = Month::from(date);
                let [actual, pessimistic, optimistic] = Scenario::ordered().map(|scenario| {
                    self.estimator
                        .estimate(stratum, month, scenario.climate())
                        .value_m3
                });

                projections.push(ScenarioProjection::from_scenarios(
                    date.format("%Y-%m-%d").to_string(),
                    stratum.clone(),
                    actual,
                    pessimistic,
                    optimistic,
                ));
            }
        }

        projections
    }
}

fn filter_stratum(
    projections: &[ScenarioProjection],
    stratum: Option<&StratumKey>,
) -> Vec<ScenarioProjection> {
    match stratum {
        Some(stratum) => projections
            .iter()
            .filter(|projection| projection.stratum == *stratum)
            .cloned()
            .collect(),
        None => projections.to_vec(),
    }
}

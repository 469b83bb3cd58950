use super::domain::{percent_change, MonthlyAggregate, ScenarioProjection};
use super::projection::HORIZON_MONTHS;
use std::collections::BTreeMap;
use tracing::warn;

#[derive(Debug, Default)]
struct Totals {
    actual: f64,
    pessimistic: f64,
    optimistic: f64,
}

/// Sums every stratum sharing a `YYYY-MM` key and keeps the first twelve months in
/// ascending order. The increase is recomputed from the summed totals.
pub fn aggregate_by_month(projections: &[ScenarioProjection]) -> Vec<MonthlyAggregate> {
    let mut months: BTreeMap<&str, Totals> = BTreeMap::new();

    for projection in projections {
        let Some(key) = projection.month_key() else {
            warn!(
                date = %projection.date,
                stratum = %projection.stratum,
                "skipping projection without a YYYY-MM date"
            );
            continue;
        };
        let totals = months.entry(key).or_default();
        totals.actual += projection.consumption_actual;
        totals.pessimistic += projection.consumption_pessimistic;
        totals.optimistic += projection.consumption_optimistic;
    }

    months
        .into_iter()
        .take(HORIZON_MONTHS as usize)
        .map(|(key, totals)| MonthlyAggregate {
            month_key: key.to_string(),
            total_actual: totals.actual,
            total_pessimistic: totals.pessimistic,
            total_optimistic: totals.optimistic,
            increase_pct: percent_change(totals.actual, totals.pessimistic),
        })
        .collect()
}

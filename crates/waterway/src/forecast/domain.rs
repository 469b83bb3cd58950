use chrono::{Datelike, NaiveDate};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Reference monthly consumption (m³) per stratum, used as the rule-based baseline and as
/// the moving-average feature for the trained regressor.
const REFERENCE_CONSUMPTION: [(&str, f64); 8] = [
    ("1", 15.0),
    ("2", 17.0),
    ("3", 19.0),
    ("4", 21.0),
    ("5", 25.0),
    ("6", 30.0),
    ("Comercial", 150.0),
    ("Industrial", 500.0),
];

pub const DEFAULT_REFERENCE_CONSUMPTION: f64 = 20.0;

/// Normalized identifier of a consumption tier ("1".."6", "Comercial", "Industrial").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StratumKey(String);

impl StratumKey {
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        Self(plain_digits(trimmed).unwrap_or_else(|| trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The eight strata covered by synthesized projections, in reporting order.
    pub fn canonical() -> Vec<Self> {
        REFERENCE_CONSUMPTION
            .iter()
            .map(|(key, _)| Self((*key).to_string()))
            .collect()
    }

    pub fn reference_consumption(&self) -> f64 {
        REFERENCE_CONSUMPTION
            .iter()
            .find(|(key, _)| *key == self.0)
            .map(|(_, value)| *value)
            .unwrap_or(DEFAULT_REFERENCE_CONSUMPTION)
    }
}

/// Canonical form of a plain digit string with an optional all-zero fraction ("03", "3.0").
fn plain_digits(raw: &str) -> Option<String> {
    let (whole, fraction) = raw.split_once('.').unwrap_or((raw, ""));
    if whole.is_empty()
        || !whole.bytes().all(|b| b.is_ascii_digit())
        || !fraction.bytes().all(|b| b == b'0')
    {
        return None;
    }
    match whole.trim_start_matches('0') {
        "" => Some("0".to_string()),
        digits => Some(digits.to_string()),
    }
}

impl fmt::Display for StratumKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StratumKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl Serialize for StratumKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

// Exported artifacts store strata both as strings and as bare numbers.
impl<'de> Deserialize<'de> for StratumKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StratumVisitor;

        impl<'de> Visitor<'de> for StratumVisitor {
            type Value = StratumKey;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a stratum name or number")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                Ok(StratumKey::new(value))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
                Ok(StratumKey(value.to_string()))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
                Ok(StratumKey::new(&value.to_string()))
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
                Ok(StratumKey::new(&value.to_string()))
            }
        }

        deserializer.deserialize_any(StratumVisitor)
    }
}

/// Calendar month, 1 through 12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "u32")]
pub struct Month(u32);

impl Month {
    pub fn new(value: i64) -> Result<Self, ForecastError> {
        if (1..=12).contains(&value) {
            Ok(Self(value as u32))
        } else {
            Err(ForecastError::InvalidMonth(value))
        }
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    pub const fn quarter(self) -> u32 {
        (self.0 - 1) / 3 + 1
    }

    /// Coarse day-of-year stand-in the trained regressor was fitted against.
    pub const fn day_of_year_proxy(self) -> u32 {
        self.0 * 30
    }

    /// December through March, the low-rainfall season.
    pub const fn is_dry_season(self) -> bool {
        matches!(self.0, 12 | 1 | 2 | 3)
    }

    /// Month reached after advancing `months` calendar months, wrapping past December.
    pub const fn advance(self, months: u32) -> Self {
        Self((self.0 - 1 + months) % 12 + 1)
    }
}

impl From<Month> for u32 {
    fn from(value: Month) -> Self {
        value.0
    }
}

impl From<NaiveDate> for Month {
    fn from(date: NaiveDate) -> Self {
        Self(date.month())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClimateObservation {
    pub precipitation_mm: f64,
    pub temperature_c: f64,
}

impl ClimateObservation {
    /// Normal climate: 150 mm of rain and 22 °C.
    pub const REFERENCE: Self = Self {
        precipitation_mm: 150.0,
        temperature_c: 22.0,
    };

    pub fn new(precipitation_mm: f64, temperature_c: f64) -> Result<Self, ForecastError> {
        if !precipitation_mm.is_finite() {
            return Err(ForecastError::NonFinite {
                field: "precipitation_mm",
                value: precipitation_mm,
            });
        }
        if !temperature_c.is_finite() {
            return Err(ForecastError::NonFinite {
                field: "temperature_c",
                value: temperature_c,
            });
        }

        Ok(Self {
            precipitation_mm,
            temperature_c,
        })
    }

    /// Fills whichever side the caller omitted from the reference climate.
    pub fn from_optional(
        precipitation_mm: Option<f64>,
        temperature_c: Option<f64>,
    ) -> Result<Self, ForecastError> {
        Self::new(
            precipitation_mm.unwrap_or(Self::REFERENCE.precipitation_mm),
            temperature_c.unwrap_or(Self::REFERENCE.temperature_c),
        )
    }
}

impl Default for ClimateObservation {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// Climate assumption used when synthesizing a projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    Actual,
    Pessimistic,
    Optimistic,
}

impl Scenario {
    pub const fn ordered() -> [Self; 3] {
        [Self::Actual, Self::Pessimistic, Self::Optimistic]
    }

    pub const fn climate(self) -> ClimateObservation {
        match self {
            Self::Actual => ClimateObservation::REFERENCE,
            Self::Pessimistic => ClimateObservation {
                precipitation_mm: 120.0,
                temperature_c: 24.0,
            },
            Self::Optimistic => ClimateObservation {
                precipitation_mm: 135.0,
                temperature_c: 23.0,
            },
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Actual => "Actual",
            Self::Pessimistic => "Pessimistic",
            Self::Optimistic => "Optimistic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Decodes a label produced by a fitted risk encoder, Spanish or English.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "bajo" | "low" => Some(Self::Low),
            "medio" | "medium" => Some(Self::Medium),
            "alto" | "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Which inference branch produced a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferencePath {
    ModelBacked,
    RuleBased,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsumptionEstimate {
    pub stratum: StratumKey,
    pub month: Month,
    pub value_m3: f64,
    pub path: InferencePath,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioProjection {
    #[serde(alias = "fecha")]
    pub date: String,
    #[serde(alias = "estrato")]
    pub stratum: StratumKey,
    #[serde(alias = "consumo_actual")]
    pub consumption_actual: f64,
    #[serde(alias = "consumo_pesimista")]
    pub consumption_pessimistic: f64,
    #[serde(alias = "consumo_optimista")]
    pub consumption_optimistic: f64,
    #[serde(default, alias = "incremento_pesimista_pct")]
    pub delta_pessimistic_pct: Option<f64>,
    #[serde(default, alias = "incremento_optimista_pct")]
    pub delta_optimistic_pct: Option<f64>,
}

impl ScenarioProjection {
    pub fn from_scenarios(
        date: String,
        stratum: StratumKey,
        actual: f64,
        pessimistic: f64,
        optimistic: f64,
    ) -> Self {
        Self {
            date,
            stratum,
            consumption_actual: actual,
            consumption_pessimistic: pessimistic,
            consumption_optimistic: optimistic,
            delta_pessimistic_pct: percent_change(actual, pessimistic),
            delta_optimistic_pct: percent_change(actual, optimistic),
        }
    }

    /// `YYYY-MM` prefix of the projection date, if the date carries one.
    pub fn month_key(&self) -> Option<&str> {
        let key = self.date.get(..7)?;
        let bytes = key.as_bytes();
        let well_formed = bytes[..4].iter().all(u8::is_ascii_digit)
            && bytes[4] == b'-'
            && bytes[5..].iter().all(u8::is_ascii_digit);
        well_formed.then_some(key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyAggregate {
    pub month_key: String,
    pub total_actual: f64,
    pub total_pessimistic: f64,
    pub total_optimistic: f64,
    pub increase_pct: Option<f64>,
}

/// Percentage change from `baseline` to `value`, rounded to two decimals. `None` on a zero
/// baseline.
pub fn percent_change(baseline: f64, value: f64) -> Option<f64> {
    if baseline == 0.0 {
        None
    } else {
        Some(round2((value - baseline) / baseline * 100.0))
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Caller input the engine refuses to default.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ForecastError {
    #[error("month must be between 1 and 12, got {0}")]
    InvalidMonth(i64),
    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f64 },
    #[error("failed to parse '{0}' as YYYY-MM-DD")]
    InvalidDate(String),
}

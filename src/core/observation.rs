//! Single-day currency observations

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::num::ParseFloatError;
use thiserror::Error;

/// One currency's published rate for one requested day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub code: String,
    pub num_code: String,
    pub name: String,
    pub nominal: u32,
    pub rate: f64,
    pub unit_rate: f64,
    pub day: NaiveDate,
}

/// Which figure of an observation the summaries are computed over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RateMetric {
    /// Published rate for `nominal` units
    #[default]
    Value,
    /// Rate for a single unit
    UnitRate,
}

impl Display for RateMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                RateMetric::Value => "value",
                RateMetric::UnitRate => "unit rate",
            }
        )
    }
}

impl Observation {
    pub fn metric(&self, metric: RateMetric) -> f64 {
        match metric {
            RateMetric::Value => self.rate,
            RateMetric::UnitRate => self.unit_rate,
        }
    }
}

#[derive(Debug, Error)]
pub enum InvalidRate {
    #[error(transparent)]
    Malformed(#[from] ParseFloatError),
    #[error("rate is not a finite number")]
    NonFinite,
}

/// Parses a decimal that may use either `,` or `.` as the fractional separator.
/// `NaN` and infinities are rejected.
pub fn parse_rate(text: &str) -> Result<f64, InvalidRate> {
    let value = text.trim().replace(',', ".").parse::<f64>()?;
    if !value.is_finite() {
        return Err(InvalidRate::NonFinite);
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rate_accepts_both_separators() {
        assert_eq!(parse_rate("93,5").unwrap(), 93.5);
        assert_eq!(parse_rate("93.5").unwrap(), 93.5);
        assert_eq!(parse_rate(" 16,0102 ").unwrap(), 16.0102);
        assert_eq!(parse_rate("100").unwrap(), 100.0);
    }

    #[test]
    fn test_parse_rate_rejects_garbage() {
        assert!(parse_rate("").is_err());
        assert!(parse_rate("12,34,56").is_err());
        assert!(parse_rate("n/a").is_err());
    }

    #[test]
    fn test_parse_rate_rejects_non_finite() {
        for text in ["NaN", "nan", "inf", "-inf", "Infinity"] {
            assert!(
                matches!(parse_rate(text), Err(InvalidRate::NonFinite)),
                "{text} should be rejected"
            );
        }
        assert!(matches!(
            parse_rate("12,34,56"),
            Err(InvalidRate::Malformed(_))
        ));
    }

    #[test]
    fn test_metric_selects_figure() {
        let observation = Observation {
            code: "JPY".to_string(),
            num_code: "392".to_string(),
            name: "Japanese Yen".to_string(),
            nominal: 100,
            rate: 61.2,
            unit_rate: 0.612,
            day: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        };
        assert_eq!(observation.metric(RateMetric::Value), 61.2);
        assert_eq!(observation.metric(RateMetric::UnitRate), 0.612);
    }
}

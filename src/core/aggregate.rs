//! Shared per-currency accumulation and the final min/max/average reduction

use super::observation::{Observation, RateMetric};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Observations grouped by currency code.
pub type Observations = HashMap<String, Vec<Observation>>;

/// Concurrency-safe accumulator shared by all day tasks.
///
/// Cloning yields another handle onto the same set. There is no read access;
/// the contents are taken out once with [`ObservationSet::take`] after every
/// writer has finished.
#[derive(Clone, Default)]
pub struct ObservationSet {
    inner: Arc<Mutex<Observations>>,
}

impl ObservationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a single observation, creating its currency entry on first use.
    pub async fn insert(&self, observation: Observation) {
        let mut set = self.inner.lock().await;
        set.entry(observation.code.clone())
            .or_default()
            .push(observation);
    }

    /// Inserts one day's observations under a single lock scope.
    pub async fn insert_all(&self, observations: Vec<Observation>) {
        let mut set = self.inner.lock().await;
        debug!(count = observations.len(), "Observation set INSERT");
        for observation in observations {
            set.entry(observation.code.clone())
                .or_default()
                .push(observation);
        }
    }

    /// Moves the accumulated observations out, leaving the set empty.
    pub async fn take(&self) -> Observations {
        let mut set = self.inner.lock().await;
        std::mem::take(&mut *set)
    }
}

/// A value and the day it was observed on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extreme {
    pub value: f64,
    pub day: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrencySummary {
    pub name: String,
    pub code: String,
    pub min: Extreme,
    pub max: Extreme,
    pub average: f64,
    pub samples: usize,
}

/// Reduces every currency's observations to a [`CurrencySummary`].
///
/// Observations are ordered by day before reduction, so ties on an extreme
/// resolve to the earliest calendar day and the reported name is the one
/// published on that earliest day. Currencies without observations are left
/// out. The result is keyed, and therefore iterated, by currency code.
pub fn summarize(
    observations: Observations,
    metric: RateMetric,
) -> BTreeMap<String, CurrencySummary> {
    observations
        .into_iter()
        .filter_map(|(code, mut entries)| {
            entries.sort_by_key(|o| o.day);
            summarize_currency(code, &entries, metric).map(|s| (s.code.clone(), s))
        })
        .collect()
}

fn summarize_currency(
    code: String,
    entries: &[Observation],
    metric: RateMetric,
) -> Option<CurrencySummary> {
    let first = entries.first()?;
    let initial = Extreme {
        value: first.metric(metric),
        day: first.day,
    };

    let (min, max, sum) = entries[1..].iter().fold(
        (initial, initial, initial.value),
        |(min, max, sum), observation| {
            let value = observation.metric(metric);
            let current = Extreme {
                value,
                day: observation.day,
            };
            (
                if value < min.value { current } else { min },
                if value > max.value { current } else { max },
                sum + value,
            )
        },
    );

    Some(CurrencySummary {
        name: first.name.clone(),
        code,
        min,
        max,
        average: sum / entries.len() as f64,
        samples: entries.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, n).unwrap()
    }

    fn observation(code: &str, rate: f64, on: NaiveDate) -> Observation {
        Observation {
            code: code.to_string(),
            num_code: "000".to_string(),
            name: format!("{code} name"),
            nominal: 1,
            rate,
            unit_rate: rate,
            day: on,
        }
    }

    #[tokio::test]
    async fn test_insert_groups_by_code() {
        let set = ObservationSet::new();
        set.insert(observation("USD", 90.1, day(1))).await;
        set.insert(observation("EUR", 98.0, day(1))).await;
        set.insert_all(vec![
            observation("USD", 95.3, day(2)),
            observation("EUR", 99.0, day(2)),
        ])
        .await;

        let observations = set.take().await;
        assert_eq!(observations.len(), 2);
        assert_eq!(observations["USD"].len(), 2);
        assert_eq!(observations["EUR"].len(), 2);

        // Taking leaves the set empty
        assert!(set.take().await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_are_not_lost() {
        let set = ObservationSet::new();
        let handles: Vec<_> = (0..200u32)
            .map(|i| {
                let set = set.clone();
                tokio::spawn(async move {
                    set.insert(observation("USD", f64::from(i), day(1))).await;
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let observations = set.take().await;
        assert_eq!(observations["USD"].len(), 200);
    }

    #[test]
    fn test_summarize_min_max_average() {
        let mut observations = Observations::new();
        observations.insert(
            "USD".to_string(),
            vec![
                observation("USD", 92.0, day(3)),
                observation("USD", 90.1, day(1)),
                observation("USD", 95.3, day(2)),
            ],
        );

        let summaries = summarize(observations, RateMetric::Value);
        let usd = &summaries["USD"];
        assert_eq!(usd.min, Extreme { value: 90.1, day: day(1) });
        assert_eq!(usd.max, Extreme { value: 95.3, day: day(2) });
        assert!((usd.average - 92.466_666_666).abs() < 1e-6);
        assert_eq!(usd.samples, 3);
        assert_eq!(usd.name, "USD name");
    }

    #[test]
    fn test_ties_resolve_to_earliest_day() {
        let mut observations = Observations::new();
        observations.insert(
            "EUR".to_string(),
            vec![
                observation("EUR", 1.0, day(5)),
                observation("EUR", 2.0, day(4)),
                observation("EUR", 1.0, day(2)),
                observation("EUR", 2.0, day(3)),
            ],
        );

        let summaries = summarize(observations, RateMetric::Value);
        assert_eq!(summaries["EUR"].min.day, day(2));
        assert_eq!(summaries["EUR"].max.day, day(3));
    }

    #[test]
    fn test_empty_currencies_are_omitted() {
        let mut observations = Observations::new();
        observations.insert("GBP".to_string(), Vec::new());
        observations.insert("USD".to_string(), vec![observation("USD", 90.0, day(1))]);

        let summaries = summarize(observations, RateMetric::Value);
        assert!(!summaries.contains_key("GBP"));
        assert_eq!(summaries.len(), 1);
    }

    #[test]
    fn test_summaries_ordered_by_code() {
        let mut observations = Observations::new();
        for code in ["USD", "AUD", "EUR", "CNY"] {
            observations.insert(code.to_string(), vec![observation(code, 1.0, day(1))]);
        }

        let codes: Vec<_> = summarize(observations, RateMetric::Value)
            .into_keys()
            .collect();
        assert_eq!(codes, vec!["AUD", "CNY", "EUR", "USD"]);
    }

    #[test]
    fn test_unit_rate_metric() {
        let mut jpy = observation("JPY", 60.0, day(1));
        jpy.nominal = 100;
        jpy.unit_rate = 0.6;
        let mut observations = Observations::new();
        observations.insert("JPY".to_string(), vec![jpy]);

        let summaries = summarize(observations, RateMetric::UnitRate);
        assert_eq!(summaries["JPY"].max.value, 0.6);
        assert_eq!(summaries["JPY"].average, 0.6);
    }
}

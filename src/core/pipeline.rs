//! Fan-out of one task per day, fan-in, then summarization

use super::aggregate::{CurrencySummary, ObservationSet, summarize};
use super::document::parse_document;
use super::error::RatesError;
use super::observation::RateMetric;
use super::provider::RatesProvider;
use super::window::Window;
use chrono::NaiveDate;
use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// A day that contributed nothing to the run.
#[derive(Debug, Clone, PartialEq)]
pub struct DayFailure {
    pub day: NaiveDate,
    pub reason: String,
}

/// Outcome of a full run over a window.
#[derive(Debug)]
pub struct WindowReport {
    pub summaries: BTreeMap<String, CurrencySummary>,
    pub days_requested: usize,
    pub failures: Vec<DayFailure>,
}

/// Fetches, parses and accumulates every day of `window` concurrently.
///
/// Each day runs as its own task and a failing day never affects its
/// siblings. Returns only once every task has finished. `on_day_done` is
/// invoked as each task finishes, whatever its outcome.
pub async fn collect_window<F>(
    provider: Arc<dyn RatesProvider>,
    window: &Window,
    on_day_done: F,
) -> (ObservationSet, Vec<DayFailure>)
where
    F: Fn() + Send + Sync + 'static,
{
    let observations = ObservationSet::new();
    let on_day_done = Arc::new(on_day_done);

    let tasks: Vec<_> = window
        .days()
        .map(|day| {
            let provider = Arc::clone(&provider);
            let observations = observations.clone();
            let on_day_done = Arc::clone(&on_day_done);
            let handle = tokio::spawn(async move {
                let result = process_day(provider.as_ref(), &observations, day).await;
                on_day_done();
                result
            });
            async move { (day, handle.await) }
        })
        .collect();

    let mut failures = Vec::new();
    for (day, outcome) in join_all(tasks).await {
        match outcome {
            Ok(Ok(count)) => debug!(%day, count, "Day processed"),
            Ok(Err(e)) => {
                warn!(%day, error = %e, "Skipping day");
                failures.push(DayFailure {
                    day,
                    reason: e.to_string(),
                });
            }
            Err(e) => {
                error!(%day, error = %e, "Day task aborted");
                failures.push(DayFailure {
                    day,
                    reason: format!("task aborted: {e}"),
                });
            }
        }
    }

    (observations, failures)
}

async fn process_day(
    provider: &dyn RatesProvider,
    observations: &ObservationSet,
    day: NaiveDate,
) -> Result<usize, RatesError> {
    let document = provider.fetch_document(day).await?;
    let parsed = parse_document(document)?;
    let count = parsed.len();
    observations.insert_all(parsed).await;
    Ok(count)
}

/// Runs the whole pipeline over `window` and reduces the result.
pub async fn summarize_window<F>(
    provider: Arc<dyn RatesProvider>,
    window: &Window,
    metric: RateMetric,
    on_day_done: F,
) -> WindowReport
where
    F: Fn() + Send + Sync + 'static,
{
    info!(
        start = %window.start(),
        end = %window.end(),
        days = window.len(),
        "Collecting rates"
    );
    let (observations, failures) = collect_window(provider, window, on_day_done).await;
    let summaries = summarize(observations.take().await, metric);
    info!(
        currencies = summaries.len(),
        failed_days = failures.len(),
        "Collection finished"
    );

    WindowReport {
        summaries,
        days_requested: window.len(),
        failures,
    }
}

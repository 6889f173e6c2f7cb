//! Core rate collection and aggregation

pub mod aggregate;
pub mod config;
pub mod document;
pub mod error;
pub mod log;
pub mod observation;
pub mod pipeline;
pub mod provider;
pub mod window;

// Re-export main types for cleaner imports
pub use aggregate::{CurrencySummary, Extreme, ObservationSet, summarize};
pub use error::RatesError;
pub use observation::{Observation, RateMetric};
pub use pipeline::{DayFailure, WindowReport, collect_window, summarize_window};
pub use provider::{RatesProvider, RawDocument};
pub use window::Window;

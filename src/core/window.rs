//! Lookback window and the calendar days it covers

use anyhow::{Result, bail};
use chrono::{Duration, NaiveDate};

/// Half-open range of calendar days, `start` inclusive and `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    start: NaiveDate,
    end: NaiveDate,
}

impl Window {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start >= end {
            bail!("Invalid window: start {start} must be before end {end}");
        }
        Ok(Window { start, end })
    }

    /// The `days` calendar days immediately before `end`.
    pub fn lookback(end: NaiveDate, days: u32) -> Result<Self> {
        if days == 0 {
            bail!("Invalid window: lookback must cover at least one day");
        }
        let start = end
            .checked_sub_signed(Duration::days(i64::from(days)))
            .ok_or_else(|| anyhow::anyhow!("Invalid window: {days} days before {end}"))?;
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days in the window.
    pub fn len(&self) -> usize {
        (self.end - self.start).num_days() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ascending days from `start` up to, not including, `end`. Each call
    /// starts a fresh sequence.
    pub fn days(&self) -> DayIter {
        DayIter {
            next: Some(self.start),
            end: self.end,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DayIter {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl Iterator for DayIter {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let day = self.next.filter(|day| *day < self.end)?;
        self.next = day.succ_opt();
        Some(day)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .next
            .filter(|day| *day < self.end)
            .map_or(0, |day| (self.end - day).num_days() as usize);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DayIter {}

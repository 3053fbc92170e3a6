//! Known future events (holidays, promotions) keyed by date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Event flags for a single day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFlags {
    #[serde(default)]
    pub holiday: bool,
    #[serde(default)]
    pub promotion: bool,
}

/// Per-date overrides for the projected holiday and promotion flags.
///
/// Dates absent from the calendar have no scheduled events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventCalendar {
    events: BTreeMap<NaiveDate, EventFlags>,
}

impl EventCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_holiday(mut self, date: NaiveDate) -> Self {
        self.events.entry(date).or_default().holiday = true;
        self
    }

    pub fn with_promotion(mut self, date: NaiveDate) -> Self {
        self.events.entry(date).or_default().promotion = true;
        self
    }

    pub fn insert(&mut self, date: NaiveDate, flags: EventFlags) {
        self.events.insert(date, flags);
    }

    pub fn flags_for(&self, date: NaiveDate) -> EventFlags {
        self.events.get(&date).copied().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

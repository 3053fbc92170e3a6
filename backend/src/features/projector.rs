//! Projection of future feature rows from observed history.

use chrono::{Days, Local, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::ProjectionSettings;
use crate::error::{CoreError, CoreResult, ErrorContext};
use crate::models::{EventCalendar, FutureFeatureRow, HistoricalSeries, TimePoint};

/// Product and location for a projection that has no history to copy them
/// from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesIdentity {
    pub product: String,
    pub location: String,
}

impl SeriesIdentity {
    pub fn new(product: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            product: product.into(),
            location: location.into(),
        }
    }
}

/// Build `horizon_days` rows for the days immediately after the last
/// observation.
///
/// Context fields (temperature, rainfall, congestion) take the mean of the
/// values present in the trailing `context_window_days` observations, falling
/// back to the configured defaults. The units-sold seed is the mean over the
/// trailing `seed_window_days` observations, or 0.
///
/// # Errors
///
/// * `InvalidInput` when `horizon_days` is 0
/// * `InsufficientHistory` when the history is empty, since product and
///   location identity cannot be derived; see [`project_future_for`]
pub fn project_future(
    history: &HistoricalSeries,
    horizon_days: usize,
    settings: &ProjectionSettings,
    calendar: Option<&EventCalendar>,
) -> CoreResult<Vec<FutureFeatureRow>> {
    project_future_for(
        history,
        horizon_days,
        settings,
        calendar,
        None,
        Local::now().date_naive(),
    )
}

/// Like [`project_future`], but an empty history is accepted when the caller
/// supplies `identity`: rows then start the day after `today` and every
/// context field takes its configured default.
///
/// `today` is ignored when the history is not empty.
pub fn project_future_for(
    history: &HistoricalSeries,
    horizon_days: usize,
    settings: &ProjectionSettings,
    calendar: Option<&EventCalendar>,
    identity: Option<&SeriesIdentity>,
    today: NaiveDate,
) -> CoreResult<Vec<FutureFeatureRow>> {
    if horizon_days == 0 {
        return Err(CoreError::invalid_input_with_context(
            "horizon must be at least one day",
            ErrorContext::new("project_future").with_entity("horizon_days"),
        ));
    }

    let (anchor, product, location) = match (history.last(), identity) {
        (Some(last), _) => (last.date, last.product.as_str(), last.location.as_str()),
        (None, Some(id)) => (today, id.product.as_str(), id.location.as_str()),
        (None, None) => {
            return Err(CoreError::insufficient_history_with_context(
                "history is empty; product and location are unknown",
                ErrorContext::new("project_future").with_entity("history"),
            ))
        }
    };

    let context = history.tail(settings.context_window_days);
    let temperature =
        trailing_mean(context, |p| p.temperature).unwrap_or(settings.default_temperature);
    let rainfall = trailing_mean(context, |p| p.rainfall).unwrap_or(settings.default_rainfall);
    let congestion_index = trailing_mean(context, |p| p.congestion_index)
        .unwrap_or(settings.default_congestion_index);

    let units_sold_seed =
        trailing_mean(history.tail(settings.seed_window_days), |p| p.units_sold).unwrap_or(0.0);

    debug!(
        "Projecting {} days after {} for ({}, {}): temp={:.2} rain={:.2} congestion={:.3} seed={:.2}",
        horizon_days,
        anchor,
        product,
        location,
        temperature,
        rainfall,
        congestion_index,
        units_sold_seed
    );

    let mut rows = Vec::with_capacity(horizon_days);
    for date in future_dates(anchor, horizon_days)? {
        let flags = calendar.map(|c| c.flags_for(date)).unwrap_or_default();
        rows.push(FutureFeatureRow {
            date,
            product: product.to_string(),
            location: location.to_string(),
            temperature,
            rainfall,
            congestion_index,
            holiday_flag: flags.holiday,
            promotion_flag: flags.promotion,
            units_sold_seed,
        });
    }

    Ok(rows)
}

/// The `count` consecutive days following `after`.
fn future_dates(after: NaiveDate, count: usize) -> CoreResult<Vec<NaiveDate>> {
    (1..=count as u64)
        .map(|offset| {
            after.checked_add_days(Days::new(offset)).ok_or_else(|| {
                CoreError::invalid_input_with_context(
                    format!("horizon of {} days overflows the calendar", count),
                    ErrorContext::new("project_future").with_entity("horizon_days"),
                )
            })
        })
        .collect()
}

/// Mean of the present values of `field`, `None` if there are none.
fn trailing_mean(points: &[TimePoint], field: impl Fn(&TimePoint) -> Option<f64>) -> Option<f64> {
    let (sum, count) = points
        .iter()
        .filter_map(field)
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

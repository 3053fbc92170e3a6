//! Longest safe procurement window search.

use chrono::NaiveDate;

use crate::error::{CoreError, CoreResult, ErrorContext};
use crate::models::SafeWindow;

/// Find the longest run of consecutive days with `risk < threshold`.
///
/// Equality is not safe. Among equally long runs the earliest wins. Returns
/// `Ok(None)` when either input is empty or no day qualifies.
///
/// # Errors
///
/// `InvalidInput` when the inputs differ in length or the threshold is not
/// strictly between 0 and 1.
pub fn find_longest_safe_window(
    dates: &[NaiveDate],
    risk: &[f64],
    threshold: f64,
) -> CoreResult<Option<SafeWindow>> {
    let context = || ErrorContext::new("find_longest_safe_window");

    if !(threshold > 0.0 && threshold < 1.0) {
        return Err(CoreError::invalid_input_with_context(
            format!("threshold {} is outside (0, 1)", threshold),
            context().with_entity("threshold"),
        ));
    }
    if dates.is_empty() || risk.is_empty() {
        return Ok(None);
    }
    if dates.len() != risk.len() {
        return Err(CoreError::invalid_input_with_context(
            format!("{} dates but {} risk values", dates.len(), risk.len()),
            context().with_entity("risk"),
        ));
    }

    // (start, len) of the best run so far
    let mut best: Option<(usize, usize)> = None;
    let mut run_start: Option<usize> = None;

    for (i, r) in risk.iter().enumerate() {
        if *r < threshold {
            run_start.get_or_insert(i);
        } else if let Some(start) = run_start.take() {
            best = longer(best, start, i - start);
        }
    }
    if let Some(start) = run_start {
        best = longer(best, start, risk.len() - start);
    }

    Ok(best.map(|(start, len)| {
        let end = start + len - 1;
        SafeWindow {
            start_date: dates[start],
            end_date: dates[end],
            length_days: len,
            start_index: start,
            end_index: end,
        }
    }))
}

/// Keep the earlier run unless the new one is strictly longer.
fn longer(best: Option<(usize, usize)>, start: usize, len: usize) -> Option<(usize, usize)> {
    match best {
        Some((_, best_len)) if best_len >= len => best,
        _ => Some((start, len)),
    }
}

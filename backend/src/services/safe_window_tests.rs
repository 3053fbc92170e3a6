#[cfg(test)]
mod tests {
    use crate::services::safe_window::find_longest_safe_window;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        start.iter_days().take(n).collect()
    }

    #[test]
    fn test_longest_run_wins_over_first_run() {
        let risk = [0.1, 0.4, 0.2, 0.2, 0.5, 0.1, 0.1, 0.1];
        let d = dates(risk.len());
        let window = find_longest_safe_window(&d, &risk, 0.3).unwrap().unwrap();

        assert_eq!(window.start_index, 5);
        assert_eq!(window.end_index, 7);
        assert_eq!(window.length_days, 3);
        assert_eq!(window.start_date, d[5]);
        assert_eq!(window.end_date, d[7]);
    }

    #[test]
    fn test_equality_is_not_safe() {
        let d = dates(2);
        assert_eq!(find_longest_safe_window(&d, &[0.3, 0.3], 0.3).unwrap(), None);
    }

    #[test]
    fn test_ties_keep_earliest_run() {
        let risk = [0.1, 0.1, 0.9, 0.1, 0.1];
        let d = dates(risk.len());
        let window = find_longest_safe_window(&d, &risk, 0.5).unwrap().unwrap();
        assert_eq!(window.start_index, 0);
        assert_eq!(window.length_days, 2);
    }

    #[test]
    fn test_whole_series_safe() {
        let d = dates(4);
        let window = find_longest_safe_window(&d, &[0.0; 4], 0.3).unwrap().unwrap();
        assert_eq!(window.length_days, 4);
        assert_eq!(window.end_date, d[3]);
    }

    #[test]
    fn test_empty_inputs_have_no_window() {
        assert_eq!(find_longest_safe_window(&[], &[], 0.3).unwrap(), None);
        assert_eq!(find_longest_safe_window(&dates(3), &[], 0.3).unwrap(), None);
    }

    #[test]
    fn test_mismatched_lengths_are_invalid() {
        let err = find_longest_safe_window(&dates(3), &[0.1, 0.1], 0.3).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_threshold_bounds_are_exclusive() {
        let d = dates(2);
        for threshold in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            let result = find_longest_safe_window(&d, &[0.1, 0.1], threshold);
            assert!(result.is_err(), "threshold {} should be rejected", threshold);
        }
    }

    proptest! {
        #[test]
        fn prop_window_is_safe_and_maximal(
            risk in prop::collection::vec(0.0..1.0f64, 1..120),
            threshold in 0.05..0.95f64,
        ) {
            let d = dates(risk.len());
            let window = find_longest_safe_window(&d, &risk, threshold).unwrap();

            // longest safe run by brute force, earliest on ties
            let mut best: Option<(usize, usize)> = None;
            for start in 0..risk.len() {
                let len = risk[start..].iter().take_while(|r| **r < threshold).count();
                if len > 0 && best.map_or(true, |(_, l)| len > l) {
                    best = Some((start, len));
                }
            }

            match (window, best) {
                (None, None) => {}
                (Some(w), Some((start, len))) => {
                    prop_assert_eq!(w.start_index, start);
                    prop_assert_eq!(w.length_days, len);
                    prop_assert!(risk[w.start_index..=w.end_index].iter().all(|r| *r < threshold));
                    prop_assert_eq!(w.start_date, d[w.start_index]);
                    prop_assert_eq!(w.end_date, d[w.end_index]);
                }
                (w, b) => prop_assert!(false, "window {:?} disagrees with {:?}", w, b),
            }
        }
    }
}

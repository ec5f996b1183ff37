use crate::timestamp::{now_millis, RunInterval};
use chrono::{DateTime, NaiveDate};
use itertools::Itertools;
use load_timeline_model::{purpose, TestRun};
use serde::{Deserialize, Serialize};

/// Purpose selection that matches every run
pub const ALL_PURPOSES: &str = "All";

/// Keep the runs that overlap `[start, end]`, against the current time.
pub fn filter_tests_by_date_range<'a, I>(
    runs: I,
    start: Option<i64>,
    end: Option<i64>,
) -> Vec<&'a TestRun>
where
    I: IntoIterator<Item = &'a TestRun>,
{
    filter_tests_by_date_range_at(runs, start, end, now_millis())
}

/// Keep the runs whose normalized interval overlaps `[start, end]`.
///
/// A `None` bound is open on that side. Uses the same normalization as
/// [crate::bounds::timeline_bounds_at], so a run inside the bounds is never dropped by a range
/// that covers it.
pub fn filter_tests_by_date_range_at<'a, I>(
    runs: I,
    start: Option<i64>,
    end: Option<i64>,
    now: i64,
) -> Vec<&'a TestRun>
where
    I: IntoIterator<Item = &'a TestRun>,
{
    runs.into_iter()
        .filter(|run| RunInterval::of(run, now).overlaps(start, end))
        .collect()
}

/// Keep the runs whose resolved purpose is exactly `selected`, or all runs for [ALL_PURPOSES].
pub fn filter_tests_by_purpose<'a, I>(runs: I, selected: &str) -> Vec<&'a TestRun>
where
    I: IntoIterator<Item = &'a TestRun>,
{
    runs.into_iter()
        .filter(|run| selected == ALL_PURPOSES || purpose(run) == selected)
        .collect()
}

/// The purpose choices for a dataset: [ALL_PURPOSES] then every distinct purpose, sorted
pub fn purposes<'a, I>(runs: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a TestRun>,
{
    std::iter::once(ALL_PURPOSES.to_string())
        .chain(runs.into_iter().map(purpose).sorted().dedup())
        .collect()
}

/// A date range as the user entered it
///
/// Either side may be empty, meaning unbounded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
}

impl DateRange {
    pub fn new(start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        Self {
            start_date: start_date.into(),
            end_date: end_date.into(),
        }
    }

    /// Start of the range in epoch milliseconds
    ///
    /// A plain date starts at midnight UTC.
    pub fn start_millis(&self) -> Option<i64> {
        parse_date_bound(&self.start_date)
    }

    /// End of the range in epoch milliseconds
    ///
    /// A plain date ends the range at midnight UTC, the start of that day.
    pub fn end_millis(&self) -> Option<i64> {
        parse_date_bound(&self.end_date)
    }
}

fn parse_date_bound(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis());
    }

    match DateTime::parse_from_rfc3339(raw) {
        Ok(timestamp) => Some(timestamp.timestamp_millis()),
        Err(e) => {
            log::warn!("Ignoring unparseable date bound {raw:?}: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const NOW: i64 = 1_760_000_000_000;

    fn run(name: &str, purpose: &str, begin: &str, end: &str) -> TestRun {
        TestRun {
            test_name: Some(name.to_string()),
            purpose: Some(purpose.to_string()),
            loadtestbegintime: begin.to_string(),
            loadtestendtime: end.to_string(),
            ..Default::default()
        }
    }

    fn names(runs: &[&TestRun]) -> Vec<String> {
        runs.iter()
            .map(|r| r.test_name.clone().unwrap_or_default())
            .collect()
    }

    fn sample() -> Vec<TestRun> {
        vec![
            run("a", "Regression", "1000", "2000"),
            run("b", "Soak", "3000", "4000"),
            run("c", "Regression", "5000", "6000"),
            run("d", "soak", "7000", "8000"),
        ]
    }

    #[test]
    fn unbounded_range_keeps_everything_in_order() {
        let runs = sample();
        let filtered = filter_tests_by_date_range_at(&runs, None, None, NOW);
        assert_eq!(vec!["a", "b", "c", "d"], names(&filtered));
    }

    #[test]
    fn range_keeps_overlapping_runs() {
        let runs = sample();
        let filtered = filter_tests_by_date_range_at(&runs, Some(1500), Some(5000), NOW);
        assert_eq!(vec!["a", "b", "c"], names(&filtered));

        let filtered = filter_tests_by_date_range_at(&runs, Some(4001), None, NOW);
        assert_eq!(vec!["c", "d"], names(&filtered));

        let filtered = filter_tests_by_date_range_at(&runs, None, Some(999), NOW);
        assert!(filtered.is_empty());
    }

    #[test]
    fn range_uses_normalized_timestamps() {
        // Malformed begin and negative end both mean "now"
        let runs = vec![
            run("broken", "Soak", "abc", "-1"),
            run("old", "Soak", "1000", "2000"),
        ];
        let filtered = filter_tests_by_date_range_at(&runs, Some(NOW), Some(NOW), NOW);
        assert_eq!(vec!["broken"], names(&filtered));
    }

    #[test]
    fn filtering_does_not_touch_the_input() {
        let runs = sample();
        let before = runs.clone();
        let _ = filter_tests_by_date_range_at(&runs, Some(3000), Some(3000), NOW);
        let _ = filter_tests_by_purpose(&runs, "Soak");
        assert_eq!(before, runs);
    }

    #[test]
    fn all_keeps_everything() {
        let runs = sample();
        assert_eq!(
            vec!["a", "b", "c", "d"],
            names(&filter_tests_by_purpose(&runs, ALL_PURPOSES))
        );
    }

    #[test]
    fn purpose_match_is_exact() {
        let runs = sample();
        assert_eq!(vec!["b"], names(&filter_tests_by_purpose(&runs, "Soak")));
        assert_eq!(vec!["d"], names(&filter_tests_by_purpose(&runs, "soak")));
        assert!(filter_tests_by_purpose(&runs, "Spike").is_empty());
    }

    #[test]
    fn missing_purpose_matches_unknown() {
        let runs = vec![TestRun::default()];
        assert_eq!(1, filter_tests_by_purpose(&runs, "Unknown").len());
    }

    #[test]
    fn date_then_purpose_equals_purpose_then_date() {
        let runs = sample();
        for (start, end) in [(None, None), (Some(2500), Some(6500)), (Some(0), Some(1000))] {
            for selected in [ALL_PURPOSES, "Regression", "Soak", "Unknown"] {
                let date_first = filter_tests_by_purpose(
                    filter_tests_by_date_range_at(&runs, start, end, NOW),
                    selected,
                );
                let purpose_first = filter_tests_by_date_range_at(
                    filter_tests_by_purpose(&runs, selected),
                    start,
                    end,
                    NOW,
                );
                assert_eq!(date_first, purpose_first);
            }
        }
    }

    #[test]
    fn purpose_choices() {
        let runs = sample();
        assert_eq!(vec!["All", "Regression", "Soak", "soak"], purposes(&runs));
        assert_eq!(vec!["All"], purposes(&Vec::new()));
    }

    #[test]
    fn plain_dates_are_midnight_utc() {
        let range = DateRange::new("2024-03-01", "2024-03-02");
        assert_eq!(Some(1_709_251_200_000), range.start_millis());
        assert_eq!(Some(1_709_337_600_000), range.end_millis());
    }

    #[test]
    fn plain_end_date_excludes_runs_later_that_day() {
        // 2024-03-02 10:00 UTC
        let runs = vec![run("late", "All", "1709373600000", "1709375400000")];
        let range = DateRange::new("", "2024-03-02");
        let filtered =
            filter_tests_by_date_range_at(&runs, range.start_millis(), range.end_millis(), NOW);
        assert!(filtered.is_empty());

        let range = DateRange::new("", "2024-03-03");
        let filtered =
            filter_tests_by_date_range_at(&runs, range.start_millis(), range.end_millis(), NOW);
        assert_eq!(1, filtered.len());
    }

    #[test]
    fn timestamps_and_empty_bounds() {
        let range = DateRange::new("2024-03-01T12:00:00Z", "");
        assert_eq!(Some(1_709_294_400_000), range.start_millis());
        assert_eq!(None, range.end_millis());

        let range = DateRange::new("next tuesday", "  ");
        assert_eq!(None, range.start_millis());
        assert_eq!(None, range.end_millis());
    }
}

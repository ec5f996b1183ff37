use crate::timestamp::{now_millis, RunInterval, DEFAULT_WINDOW_MILLIS};
use load_timeline_model::TestRun;
use serde::Serialize;

/// The time span covered by a set of runs, in epoch milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineBounds {
    pub min_date: i64,
    pub max_date: i64,
}

impl TimelineBounds {
    /// The window shown when there are no runs: the two weeks up to `now`
    pub fn default_window(now: i64) -> Self {
        Self {
            min_date: now.saturating_sub(DEFAULT_WINDOW_MILLIS),
            max_date: now,
        }
    }

    /// Milliseconds between the bounds, saturating at `i64::MAX`
    pub fn width(&self) -> i64 {
        self.max_date.saturating_sub(self.min_date)
    }
}

/// Compute the bounds of the timeline against the current time.
pub fn timeline_bounds<'a, I>(runs: I) -> TimelineBounds
where
    I: IntoIterator<Item = &'a TestRun>,
{
    timeline_bounds_at(runs, now_millis())
}

/// Compute the bounds of the timeline, normalizing every timestamp against `now`.
///
/// The result does not depend on the order of `runs`.
pub fn timeline_bounds_at<'a, I>(runs: I, now: i64) -> TimelineBounds
where
    I: IntoIterator<Item = &'a TestRun>,
{
    runs.into_iter()
        .map(|run| RunInterval::of(run, now))
        .fold(None, |acc: Option<TimelineBounds>, interval| {
            let (first, last) = interval.span();
            Some(match acc {
                None => TimelineBounds {
                    min_date: first,
                    max_date: last,
                },
                Some(bounds) => TimelineBounds {
                    min_date: bounds.min_date.min(first),
                    max_date: bounds.max_date.max(last),
                },
            })
        })
        .unwrap_or_else(|| TimelineBounds::default_window(now))
}

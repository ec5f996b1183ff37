//! Terminal rendering of the timeline and of single runs.

use crate::bounds::{timeline_bounds_at, TimelineBounds};
use crate::group::group_tests_by_name;
use crate::order::{order_test_names, SortOrder};
use crate::timestamp::{parse_int, RunInterval};
use chrono::DateTime;
use load_timeline_model::{purpose, sentiment, test_name, ColorMode, ColorScheme, TestRun};
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Distance kept between the tooltip and the edges of the viewport
pub const TOOLTIP_MARGIN: f64 = 20.0;
/// How far above the anchor the tooltip is placed
pub const TOOLTIP_LIFT: f64 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Place a tooltip of `tooltip` size for an anchor point, keeping it inside `viewport`.
///
/// The tooltip sits above the anchor. If that would leave the top of the viewport it drops below
/// the anchor instead, and it is pulled back in from the right and bottom edges.
pub fn tooltip_position(anchor: Point, tooltip: Size, viewport: Size) -> Point {
    let x = if anchor.x + tooltip.width > viewport.width {
        viewport.width - tooltip.width - TOOLTIP_MARGIN
    } else {
        anchor.x
    };

    let above = anchor.y - TOOLTIP_LIFT;
    let y = if above < 0.0 {
        anchor.y + TOOLTIP_MARGIN
    } else if above + tooltip.height > viewport.height {
        viewport.height - tooltip.height - TOOLTIP_MARGIN
    } else {
        above
    };

    Point { x, y }
}

/// Format epoch milliseconds as a UTC date and time, or `-` when out of range
pub fn format_date(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|date| date.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Everything shown about a single run
#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct RunDetail {
    #[tabled(rename = "Test")]
    pub name: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Purpose")]
    pub purpose: String,
    #[tabled(rename = "Sentiment")]
    pub sentiment: String,
    #[tabled(rename = "Start Time")]
    pub start_time: String,
    #[tabled(rename = "Duration")]
    pub duration: String,
    #[tabled(rename = "Total VUsers")]
    pub total_vusers: u64,
    #[tabled(rename = "Run By")]
    pub run_by: String,
}

impl RunDetail {
    pub fn of(run: &TestRun) -> Self {
        let sentiment = sentiment(run);
        Self {
            name: test_name(run),
            status: run.ui_status.clone(),
            purpose: purpose(run),
            sentiment: format!("{} ({})", sentiment.name, sentiment.color),
            start_time: parse_int(&run.loadtestbegintime)
                .map(format_date)
                .unwrap_or_else(|| "-".to_string()),
            duration: parse_int(&run.duration)
                .map(|millis| format!("{}s", (millis as f64 / 1000.0).round() as i64))
                .unwrap_or_else(|| "-".to_string()),
            total_vusers: run.total_vusers(),
            run_by: run.test_run_user.clone(),
        }
    }
}

/// How the timeline is drawn
#[derive(Debug, Clone)]
pub struct TimelineOptions {
    pub color_scheme: ColorScheme,
    pub color_mode: ColorMode,
    pub sort_order: SortOrder,
    pub test_order: Vec<String>,
    pub excluded_tests: Vec<String>,
    /// Number of characters in the lane column
    pub lane_width: usize,
}

impl Default for TimelineOptions {
    fn default() -> Self {
        Self {
            color_scheme: ColorScheme::default(),
            color_mode: ColorMode::default(),
            sort_order: SortOrder::default(),
            test_order: Vec::new(),
            excluded_tests: Vec::new(),
            lane_width: 60,
        }
    }
}

/// One test on the timeline
#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct TimelineRow {
    #[tabled(rename = "Test")]
    pub test: String,
    #[tabled(rename = "Runs")]
    pub runs: usize,
    #[tabled(rename = "Last Start")]
    pub last_start: String,
    #[tabled(rename = "Last Status")]
    pub last_status: String,
    #[tabled(rename = "Max VUsers")]
    pub max_vusers: u64,
    #[tabled(rename = "Color")]
    pub color: String,
    #[tabled(rename = "Timeline")]
    pub lane: String,
}

/// The timeline for a set of already filtered runs
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    pub bounds: TimelineBounds,
    pub rows: Vec<TimelineRow>,
}

impl Timeline {
    /// Lay out `runs` against `now`.
    ///
    /// Excluded tests are left out, including from the bounds and the vuser scale.
    pub fn build(runs: &[&TestRun], options: &TimelineOptions, now: i64) -> Self {
        let grouped = group_tests_by_name(runs.iter().copied());
        let ordered = order_test_names(
            grouped.keys().cloned(),
            &options.test_order,
            options.sort_order,
        );
        let visible = ordered
            .into_iter()
            .filter(|name| !options.excluded_tests.contains(name))
            .filter_map(|name| grouped.get(&name).map(|runs| (name, runs)))
            .collect::<Vec<_>>();

        let visible_runs = || visible.iter().flat_map(|(_, runs)| runs.iter().copied());
        let bounds = timeline_bounds_at(visible_runs(), now);
        let max_vusers = visible_runs().map(TestRun::total_vusers).max().unwrap_or(0);

        let rows = visible
            .iter()
            .map(|(name, runs)| {
                let latest = runs
                    .iter()
                    .copied()
                    .max_by_key(|run| RunInterval::of(run, now).begin);
                TimelineRow {
                    test: name.clone(),
                    runs: runs.len(),
                    last_start: latest
                        .map(|run| format_date(RunInterval::of(run, now).begin))
                        .unwrap_or_else(|| "-".to_string()),
                    last_status: latest.map(|run| run.ui_status.clone()).unwrap_or_default(),
                    max_vusers: runs.iter().map(|run| run.total_vusers()).max().unwrap_or(0),
                    color: latest
                        .map(|run| {
                            options
                                .color_mode
                                .color_for(run, options.color_scheme, max_vusers)
                                .to_string()
                        })
                        .unwrap_or_default(),
                    lane: lane(runs, bounds, options.lane_width, now),
                }
            })
            .collect();

        Self { bounds, rows }
    }

    pub fn render(&self) -> String {
        let header = format!(
            "Timeline {} .. {}",
            format_date(self.bounds.min_date),
            format_date(self.bounds.max_date)
        );
        if self.rows.is_empty() {
            return format!("{header}\nNo test runs to show");
        }

        let mut table = Table::new(&self.rows);
        table.with(Style::rounded());
        format!("{header}\n{table}")
    }
}

/// Draw the runs of one test as marks across `width` columns spanning `bounds`
fn lane(runs: &[&TestRun], bounds: TimelineBounds, width: usize, now: i64) -> String {
    if width == 0 {
        return String::new();
    }

    // The span can exceed i64::MAX
    let span = i128::from(bounds.max_date) - i128::from(bounds.min_date);
    let column = |timestamp: i64| -> usize {
        if span <= 0 {
            return 0;
        }
        let offset = (i128::from(timestamp) - i128::from(bounds.min_date)).clamp(0, span) as f64
            / span as f64;
        ((offset * (width - 1) as f64).round() as usize).min(width - 1)
    };

    let mut cells = vec!['·'; width];
    for run in runs {
        let (first, last) = RunInterval::of(run, now).span();
        for cell in &mut cells[column(first)..=column(last)] {
            *cell = '█';
        }
    }
    cells.into_iter().collect()
}

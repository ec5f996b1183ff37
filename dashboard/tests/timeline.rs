use load_timeline_dashboard::{
    filter_tests_by_date_range_at, filter_tests_by_purpose, group_tests_by_name, purposes,
    timeline_bounds_at, DataLoader, DateRange, Preferences, SettingsStore, SortOrder, Timeline,
    TimelineBounds, TimelineOptions,
};
use load_timeline_model::{test_name, ColorMode, TestRun};
use pretty_assertions::assert_eq;
use std::path::Path;

const NOW: i64 = 1_760_000_000_000;

const MARCH_1_10AM: i64 = 1_709_287_200_000;
const MARCH_5_10AM: i64 = 1_709_632_800_000;

fn fixture() -> Vec<TestRun> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("test_data")
        .join("mixed_versions.json");
    let mut loader = DataLoader::new();
    let runs = loader
        .load(Some(path.to_str().expect("fixture path is utf-8")))
        .data()
        .expect("fixture should load")
        .to_vec();
    runs
}

fn names<'a>(runs: impl IntoIterator<Item = &'a TestRun>) -> Vec<String> {
    runs.into_iter().map(test_name).collect()
}

#[test]
fn fixture_loads_every_object_across_schema_versions() {
    let runs = fixture();
    assert_eq!(
        vec![
            "Checkout Flow",
            "Search API",
            "Checkout Flow",
            "Order Sync ERP",
            "Unknown"
        ],
        names(&runs)
    );
    assert_eq!(75, runs[1].total_vusers());
}

#[test]
fn bounds_cover_all_runs_with_malformed_times_as_now() {
    let runs = fixture();
    assert_eq!(
        TimelineBounds {
            min_date: MARCH_1_10AM,
            max_date: NOW,
        },
        timeline_bounds_at(&runs, NOW)
    );
}

#[test]
fn date_range_selects_overlapping_runs() {
    let runs = fixture();

    let range = DateRange::new("2024-03-01", "2024-03-03");
    let selected =
        filter_tests_by_date_range_at(&runs, range.start_millis(), range.end_millis(), NOW);
    assert_eq!(vec!["Checkout Flow", "Search API"], names(selected));

    // Runs with a missing end are still running as far as the timeline is concerned
    let range = DateRange::new("2024-03-04", "");
    let selected =
        filter_tests_by_date_range_at(&runs, range.start_millis(), range.end_millis(), NOW);
    assert_eq!(vec!["Order Sync ERP", "Unknown"], names(selected));
}

#[test]
fn every_run_inside_the_bounds_passes_a_range_equal_to_the_bounds() {
    let runs = fixture();
    let bounds = timeline_bounds_at(&runs, NOW);
    let selected =
        filter_tests_by_date_range_at(&runs, Some(bounds.min_date), Some(bounds.max_date), NOW);
    assert_eq!(runs.len(), selected.len());

    // And a range just past the end keeps only the runs reaching now
    let selected = filter_tests_by_date_range_at(&runs, Some(MARCH_5_10AM + 1), None, NOW);
    assert_eq!(vec!["Order Sync ERP", "Unknown"], names(selected));
}

#[test]
fn purpose_filter_after_date_filter() {
    let runs = fixture();
    assert_eq!(
        vec!["All", "Regression", "Smoke", "Soak"],
        purposes(&runs)
    );

    let range = DateRange::new("2024-03-02", "");
    let by_date =
        filter_tests_by_date_range_at(&runs, range.start_millis(), range.end_millis(), NOW);
    let smoke = filter_tests_by_purpose(by_date.clone(), "Smoke");
    assert_eq!(vec!["Search API", "Unknown"], names(smoke.clone()));

    let purpose_first = filter_tests_by_date_range_at(
        filter_tests_by_purpose(&runs, "Smoke"),
        range.start_millis(),
        range.end_millis(),
        NOW,
    );
    assert_eq!(smoke, purpose_first);
}

#[test]
fn grouping_counts_add_up() {
    let runs = fixture();
    let grouped = group_tests_by_name(&runs);
    assert_eq!(4, grouped.len());
    assert_eq!(
        runs.len(),
        grouped.values().map(|group| group.len()).sum::<usize>()
    );
    let checkout_users = grouped["Checkout Flow"]
        .iter()
        .map(|run| run.test_run_user.as_str())
        .collect::<Vec<_>>();
    assert_eq!(vec!["alice", "carol"], checkout_users);
}

#[test]
fn saved_preferences_shape_the_timeline() {
    let dir = tempfile::tempdir().unwrap();
    let settings_path = dir.path().join("settings.json");

    {
        let mut preferences = Preferences::open(SettingsStore::new(&settings_path));
        preferences.exclude_test("Unknown").unwrap();
        preferences.set_sort_order(SortOrder::Desc).unwrap();
        preferences.move_test("Search API", 0).unwrap();
        preferences
            .set_date_range(DateRange::new("2024-03-01", "2024-03-05"))
            .unwrap();
    }

    let preferences = Preferences::open(SettingsStore::new(&settings_path));
    let runs = fixture();
    let range = preferences.date_range();
    let filtered = filter_tests_by_purpose(
        filter_tests_by_date_range_at(&runs, range.start_millis(), range.end_millis(), NOW),
        "All",
    );

    let options = TimelineOptions {
        color_scheme: preferences.color_scheme(),
        color_mode: ColorMode::Status,
        sort_order: preferences.sort_order(),
        test_order: preferences.test_order().to_vec(),
        excluded_tests: preferences.excluded_tests().to_vec(),
        lane_width: 20,
    };
    let timeline = Timeline::build(&filtered, &options, NOW);

    let tests = timeline
        .rows
        .iter()
        .map(|row| row.test.as_str())
        .collect::<Vec<_>>();
    assert_eq!(vec!["Search API", "Order Sync ERP", "Checkout Flow"], tests);
    assert_eq!(MARCH_1_10AM, timeline.bounds.min_date);
    assert_eq!(NOW, timeline.bounds.max_date);

    let rendered = timeline.render();
    assert!(rendered.contains("Order Sync ERP"));
    assert!(!rendered.contains("Unknown"));
}

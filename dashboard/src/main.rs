use anyhow::{bail, Context};
use clap::Parser as _;
use load_timeline_dashboard::timestamp::now_millis;
use load_timeline_dashboard::view::format_date;
use load_timeline_dashboard::{
    filter_tests_by_date_range_at, filter_tests_by_purpose, group_tests_by_name, purposes,
    timeline_bounds_at, unique_test_names, DataLoader, DateRange, LoadState, Preferences,
    RunDetail, SettingsStore, Timeline, TimelineOptions,
};
use load_timeline_model::TestRun;
use log::{debug, info};
use tabled::settings::Style;
use tabled::Table;

use crate::cli::{CliArgs, Command};

mod cli;

const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
const CRATE_VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = CliArgs::parse();
    info!("{CRATE_NAME} {CRATE_VERSION}");
    debug!("Using settings file: {}", args.settings.display());

    let mut preferences = Preferences::open(SettingsStore::new(&args.settings));

    match args.command {
        Command::Exclude { name } => {
            preferences
                .exclude_test(&name)
                .context("Failed to save excluded tests")?;
            println!("Excluded {name}");
        }
        Command::Include { name } => {
            preferences
                .include_test(&name)
                .context("Failed to save excluded tests")?;
            println!("Included {name}");
        }
        Command::Sort { order } => {
            preferences
                .set_sort_order(order)
                .context("Failed to save sort order")?;
            println!("Sort order set to {order}");
        }
        Command::Order { names } => {
            preferences
                .set_test_order(names)
                .context("Failed to save test order")?;
            println!("Test order: {}", preferences.test_order().join(", "));
        }
        Command::Move { name, position } => {
            preferences
                .move_test(&name, position)
                .context("Failed to save test order")?;
            println!("Test order: {}", preferences.test_order().join(", "));
        }
        Command::Range { start, end } => {
            let range = DateRange::new(start.unwrap_or_default(), end.unwrap_or_default());
            validate_range(&range)?;
            preferences
                .set_date_range(range.clone())
                .context("Failed to save date range")?;
            println!(
                "Date range set to {} .. {}",
                or_open(&range.start_date),
                or_open(&range.end_date)
            );
        }
        Command::Scheme { scheme } => {
            preferences
                .set_color_scheme(scheme)
                .context("Failed to save color scheme")?;
            println!("Color scheme set to {scheme}");
        }
        view => {
            let runs = load_data(args.data.as_deref())?;
            show_view(view, &runs, &preferences)?;
        }
    }

    Ok(())
}

/// Load the dataset once. A failed load is reported instead of showing anything.
fn load_data(source: Option<&str>) -> anyhow::Result<Vec<TestRun>> {
    let mut loader = DataLoader::new();
    loader.load(source);
    match loader.into_state() {
        LoadState::Ready(runs) => Ok(runs),
        LoadState::Error(message) => bail!("Error loading data: {message}"),
        state => bail!("Data loader did not finish: {state:?}"),
    }
}

fn show_view(command: Command, runs: &[TestRun], preferences: &Preferences) -> anyhow::Result<()> {
    let now = now_millis();
    let range = preferences.date_range();
    let by_date =
        filter_tests_by_date_range_at(runs, range.start_millis(), range.end_millis(), now);
    debug!(
        "{} of {} runs in date range {:?}",
        by_date.len(),
        runs.len(),
        range
    );

    match command {
        Command::Show {
            purpose,
            color_mode,
            lane_width,
        } => {
            let filtered = filter_tests_by_purpose(by_date, &purpose);
            let options = TimelineOptions {
                color_scheme: preferences.color_scheme(),
                color_mode,
                sort_order: preferences.sort_order(),
                test_order: preferences.test_order().to_vec(),
                excluded_tests: preferences.excluded_tests().to_vec(),
                lane_width,
            };
            println!("{}", Timeline::build(&filtered, &options, now).render());
        }
        Command::Bounds { purpose } => {
            let bounds = timeline_bounds_at(filter_tests_by_purpose(by_date, &purpose), now);
            println!(
                "{} .. {} ({} .. {})",
                format_date(bounds.min_date),
                format_date(bounds.max_date),
                bounds.min_date,
                bounds.max_date
            );
        }
        Command::Runs { name, purpose } => {
            let grouped = group_tests_by_name(filter_tests_by_purpose(by_date, &purpose));
            match grouped.get(name.trim()) {
                Some(runs) => {
                    let mut table = Table::new(runs.iter().map(|run| RunDetail::of(run)));
                    table.with(Style::rounded());
                    println!("{table}");
                }
                None => println!("No runs for test {name}"),
            }
        }
        Command::Tests { purpose } => {
            let excluded = preferences.excluded_tests();
            for name in unique_test_names(filter_tests_by_purpose(by_date, &purpose)) {
                if excluded.contains(&name) {
                    println!("{name} (excluded)");
                } else {
                    println!("{name}");
                }
            }
        }
        Command::Purposes => {
            for purpose in purposes(by_date) {
                println!("{purpose}");
            }
        }
        other => bail!("Not a view command: {}", command_name(&other)),
    }

    Ok(())
}

fn validate_range(range: &DateRange) -> anyhow::Result<()> {
    if !range.start_date.trim().is_empty() && range.start_millis().is_none() {
        bail!("Invalid start date: {}", range.start_date);
    }
    if !range.end_date.trim().is_empty() && range.end_millis().is_none() {
        bail!("Invalid end date: {}", range.end_date);
    }
    if let (Some(start), Some(end)) = (range.start_millis(), range.end_millis()) {
        if start > end {
            bail!("Start date {} is after end date {}", range.start_date, range.end_date);
        }
    }
    Ok(())
}

fn or_open(date: &str) -> &str {
    if date.is_empty() {
        "(open)"
    } else {
        date
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Show { .. } => "show",
        Command::Bounds { .. } => "bounds",
        Command::Runs { .. } => "runs",
        Command::Tests { .. } => "tests",
        Command::Purposes => "purposes",
        Command::Exclude { .. } => "exclude",
        Command::Include { .. } => "include",
        Command::Sort { .. } => "sort",
        Command::Order { .. } => "order",
        Command::Move { .. } => "move",
        Command::Range { .. } => "range",
        Command::Scheme { .. } => "scheme",
    }
}

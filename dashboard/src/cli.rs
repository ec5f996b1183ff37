use clap::{Parser, Subcommand};
use load_timeline_dashboard::settings::{DEFAULT_SETTINGS_PATH, SETTINGS_PATH_ENV};
use load_timeline_dashboard::{SortOrder, ALL_PURPOSES};
use load_timeline_model::{ColorMode, ColorScheme};
use std::path::PathBuf;

#[derive(Parser)]
#[command(about, long_about = None)]
pub struct CliArgs {
    /// URL or file path of a JSON array of test runs.
    ///
    /// `http` and `https` URLs are fetched once. When not set, the bundled sample dataset is shown.
    #[arg(long, env = "LOAD_TIMELINE_DATA")]
    pub data: Option<String>,

    /// Path to the settings file, created on the first change.
    #[arg(long, env = SETTINGS_PATH_ENV, default_value = DEFAULT_SETTINGS_PATH)]
    pub settings: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the timeline of the runs in the saved date range
    Show {
        /// Only show runs with this purpose
        #[arg(long, default_value = ALL_PURPOSES)]
        purpose: String,

        /// What the color column encodes: vusers, status or sentiment
        #[arg(long, default_value_t = ColorMode::Vusers)]
        color_mode: ColorMode,

        /// Width of the timeline column in characters
        #[arg(long, default_value_t = 60)]
        lane_width: usize,
    },
    /// Print the time span covered by the runs in the saved date range
    Bounds {
        #[arg(long, default_value = ALL_PURPOSES)]
        purpose: String,
    },
    /// Show every run of one test
    Runs {
        /// The test name
        name: String,

        #[arg(long, default_value = ALL_PURPOSES)]
        purpose: String,
    },
    /// List the test names in the saved date range
    Tests {
        #[arg(long, default_value = ALL_PURPOSES)]
        purpose: String,
    },
    /// List the purposes that can be filtered on
    Purposes,
    /// Hide a test from the timeline
    Exclude { name: String },
    /// Show a hidden test again
    Include { name: String },
    /// Set the order of tests that have no explicit position
    Sort { order: SortOrder },
    /// Set the explicit display order of tests
    Order { names: Vec<String> },
    /// Move one test to a position in the explicit display order
    Move { name: String, position: usize },
    /// Set the date range, either side may be left out to leave it open.
    ///
    /// Dates are `YYYY-MM-DD` (midnight UTC) or RFC 3339 timestamps.
    Range {
        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        end: Option<String>,
    },
    /// Choose the color scheme: viridis, plasma, inferno, magma, cividis or turbo
    Scheme { scheme: ColorScheme },
}

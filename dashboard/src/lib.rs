pub mod bounds;
pub mod filter;
pub mod group;
pub mod loader;
pub mod order;
pub mod settings;
pub mod timestamp;
pub mod view;

pub use bounds::{timeline_bounds, timeline_bounds_at, TimelineBounds};
pub use filter::{
    filter_tests_by_date_range, filter_tests_by_date_range_at, filter_tests_by_purpose, purposes,
    DateRange, ALL_PURPOSES,
};
pub use group::{group_tests_by_name, unique_test_names};
pub use loader::{DataLoader, LoadError, LoadState};
pub use order::{move_test, order_test_names, SortOrder};
pub use settings::{Preferences, Settings, SettingsError, SettingsStore};
pub use view::{tooltip_position, RunDetail, Timeline, TimelineOptions};

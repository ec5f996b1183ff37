use crate::filter::DateRange;
use crate::order::{move_test, SortOrder};
use load_timeline_model::ColorScheme;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Environment variable name to set a custom settings file path
pub const SETTINGS_PATH_ENV: &str = "LOAD_TIMELINE_SETTINGS";
/// Default path for the settings file
pub const DEFAULT_SETTINGS_PATH: &str = "load_timeline_settings.json";

/// User preferences, every field optional
///
/// Used both for what was loaded and for partial updates passed to [SettingsStore::save].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_scheme: Option<ColorScheme>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excluded_tests: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_order: Option<Vec<String>>,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serde JSON error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Failed to replace settings file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// A settings record kept as a single JSON object in a file
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load whatever can be recovered from the settings file.
    ///
    /// Never fails. A missing or unreadable file gives empty settings, and each field is decoded
    /// on its own so one bad value does not lose the others.
    pub fn load(&self) -> Settings {
        let record = self.read_record();
        Settings {
            color_scheme: decode_field(&record, "colorScheme"),
            date_range: decode_field(&record, "dateRange"),
            excluded_tests: decode_field(&record, "excludedTests"),
            sort_order: decode_field(&record, "sortOrder"),
            test_order: decode_field(&record, "testOrder"),
        }
    }

    /// Merge the fields set in `partial` into the stored record.
    ///
    /// Fields not set in `partial`, including keys this version does not know about, are kept.
    pub fn save(&self, partial: &Settings) -> Result<(), SettingsError> {
        let mut record = self.read_record();
        if let Value::Object(update) = serde_json::to_value(partial)? {
            record.extend(update);
        }

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut file, &record)?;
        file.write_all(b"\n")?;
        file.persist(&self.path)?;

        log::debug!("Saved settings to {}", self.path.display());
        Ok(())
    }

    fn read_record(&self) -> Map<String, Value> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Map::new(),
            Err(e) => {
                log::warn!("Cannot read settings from {}: {e}", self.path.display());
                return Map::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(Value::Object(record)) => record,
            Ok(other) => {
                log::warn!("Ignoring settings that are not a JSON object: {other}");
                Map::new()
            }
            Err(e) => {
                log::warn!("Ignoring invalid settings file {}: {e}", self.path.display());
                Map::new()
            }
        }
    }
}

fn decode_field<T: DeserializeOwned>(record: &Map<String, Value>, key: &str) -> Option<T> {
    let value = record.get(key)?;
    match T::deserialize(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            log::warn!("Ignoring invalid setting {key}: {e}");
            None
        }
    }
}

/// The preferences of the current session
///
/// Holds the settings loaded at startup and writes every change straight through to the store.
#[derive(Debug)]
pub struct Preferences {
    settings: Settings,
    store: SettingsStore,
}

impl Preferences {
    /// Load preferences from `store`
    pub fn open(store: SettingsStore) -> Self {
        let settings = store.load();
        log::debug!("Loaded settings: {settings:?}");
        Self { settings, store }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn color_scheme(&self) -> ColorScheme {
        self.settings.color_scheme.unwrap_or_default()
    }

    pub fn date_range(&self) -> DateRange {
        self.settings.date_range.clone().unwrap_or_default()
    }

    pub fn excluded_tests(&self) -> &[String] {
        self.settings.excluded_tests.as_deref().unwrap_or_default()
    }

    pub fn sort_order(&self) -> SortOrder {
        self.settings.sort_order.unwrap_or_default()
    }

    pub fn test_order(&self) -> &[String] {
        self.settings.test_order.as_deref().unwrap_or_default()
    }

    pub fn set_color_scheme(&mut self, scheme: ColorScheme) -> Result<(), SettingsError> {
        self.settings.color_scheme = Some(scheme);
        self.store.save(&Settings {
            color_scheme: Some(scheme),
            ..Default::default()
        })
    }

    pub fn set_date_range(&mut self, range: DateRange) -> Result<(), SettingsError> {
        self.settings.date_range = Some(range.clone());
        self.store.save(&Settings {
            date_range: Some(range),
            ..Default::default()
        })
    }

    /// Hide a test from the timeline. Excluding a test twice changes nothing.
    pub fn exclude_test(&mut self, name: &str) -> Result<(), SettingsError> {
        if self.excluded_tests().iter().any(|t| t == name) {
            return Ok(());
        }
        let mut excluded = self.excluded_tests().to_vec();
        excluded.push(name.to_string());
        self.set_excluded_tests(excluded)
    }

    /// Show a previously excluded test again
    pub fn include_test(&mut self, name: &str) -> Result<(), SettingsError> {
        let excluded = self
            .excluded_tests()
            .iter()
            .filter(|t| *t != name)
            .cloned()
            .collect();
        self.set_excluded_tests(excluded)
    }

    fn set_excluded_tests(&mut self, excluded: Vec<String>) -> Result<(), SettingsError> {
        self.settings.excluded_tests = Some(excluded.clone());
        self.store.save(&Settings {
            excluded_tests: Some(excluded),
            ..Default::default()
        })
    }

    pub fn set_sort_order(&mut self, order: SortOrder) -> Result<(), SettingsError> {
        self.settings.sort_order = Some(order);
        self.store.save(&Settings {
            sort_order: Some(order),
            ..Default::default()
        })
    }

    pub fn set_test_order(&mut self, order: Vec<String>) -> Result<(), SettingsError> {
        self.settings.test_order = Some(order.clone());
        self.store.save(&Settings {
            test_order: Some(order),
            ..Default::default()
        })
    }

    /// Move one test within the explicit display order
    pub fn move_test(&mut self, name: &str, position: usize) -> Result<(), SettingsError> {
        let order = move_test(self.test_order(), name, position);
        self.set_test_order(order)
    }
}

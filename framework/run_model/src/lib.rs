use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::Read;

mod color;
mod label;

pub use color::{ColorMode, ColorScheme, ParseColorError, Rgb};
pub use label::{purpose, sentiment, test_name, Sentiment, SentimentKind, UNKNOWN_LABEL};

/// Keys that can carry the test name, in order of preference.
///
/// Keys are compared after [canonical_key], so `testName`, `Test_Name` and `TESTNAME` all match
/// `testname`.
const NAME_KEYS: &[&str] = &["testname", "name", "test"];

/// Keys that can carry the purpose, in order of preference.
const PURPOSE_KEYS: &[&str] = &["purpose", "testpurpose"];

/// A single executed load test
///
/// Records come from datasets produced by different versions of the load test tooling, so
/// deserialization never fails for a JSON object. Label fields are matched case-insensitively
/// across known aliases, numbers are accepted where strings are expected and the other way
/// around, and anything unrecognised is kept in [TestRun::extra].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(from = "Map<String, Value>")]
pub struct TestRun {
    /// The raw test name, if the record carried one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_name: Option<String>,
    /// The raw purpose tag, if the record carried one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    /// Start of the run in epoch milliseconds, as written by the producer
    ///
    /// May be non-numeric, negative or shifted by an epoch. Use the normalization in the
    /// dashboard crate rather than parsing this directly.
    pub loadtestbegintime: String,
    /// End of the run in epoch milliseconds, as written by the producer
    pub loadtestendtime: String,
    /// Duration of the run in milliseconds
    pub duration: String,
    pub dev_vusers_num: u64,
    pub api_vusers_num: u64,
    pub ui_vusers_num: u64,
    pub erp_vusers_num: u64,
    pub legacy_vusers_num: u64,
    pub mobile_vusers_num: u64,
    /// `PASSED` for a passing run, anything else otherwise
    pub ui_status: String,
    /// Who ran the test
    pub test_run_user: String,
    /// Fields this model does not know about
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TestRun {
    /// Total virtual users across all channels
    pub fn total_vusers(&self) -> u64 {
        [
            self.dev_vusers_num,
            self.api_vusers_num,
            self.ui_vusers_num,
            self.erp_vusers_num,
            self.legacy_vusers_num,
            self.mobile_vusers_num,
        ]
        .into_iter()
        .fold(0u64, |acc, n| acc.saturating_add(n))
    }

    /// Whether the UI status is exactly `PASSED`
    pub fn is_passed(&self) -> bool {
        self.ui_status == "PASSED"
    }
}

impl From<Map<String, Value>> for TestRun {
    fn from(mut map: Map<String, Value>) -> Self {
        let test_name = take_any(&mut map, NAME_KEYS).and_then(|v| as_label(&v));
        let purpose = take_any(&mut map, PURPOSE_KEYS).and_then(|v| as_label(&v));

        let mut text = |key: &str| {
            take_any(&mut map, &[key])
                .map(|v| as_text(&v))
                .unwrap_or_default()
        };
        let loadtestbegintime = text("loadtestbegintime");
        let loadtestendtime = text("loadtestendtime");
        let duration = text("duration");
        let ui_status = text("uistatus");
        let test_run_user = text("testrunuser");

        let mut count = |key: &str| take_any(&mut map, &[key]).map_or(0, |v| as_count(&v));
        let dev_vusers_num = count("devvusersnum");
        let api_vusers_num = count("apivusersnum");
        let ui_vusers_num = count("uivusersnum");
        let erp_vusers_num = count("erpvusersnum");
        let legacy_vusers_num = count("legacyvusersnum");
        let mobile_vusers_num = count("mobilevusersnum");

        Self {
            test_name,
            purpose,
            loadtestbegintime,
            loadtestendtime,
            duration,
            dev_vusers_num,
            api_vusers_num,
            ui_vusers_num,
            erp_vusers_num,
            legacy_vusers_num,
            mobile_vusers_num,
            ui_status,
            test_run_user,
            extra: map,
        }
    }
}

/// Lowercase a key and drop separators, so `Test_Name`, `test-name` and `testName` compare equal.
fn canonical_key(key: &str) -> String {
    key.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Remove and return the value of the first present key among `aliases`.
fn take_any(map: &mut Map<String, Value>, aliases: &[&str]) -> Option<Value> {
    aliases.iter().find_map(|alias| {
        let key = map.keys().find(|k| canonical_key(k) == *alias)?.clone();
        map.remove(&key)
    })
}

fn as_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn as_text(value: &Value) -> String {
    as_label(value).unwrap_or_default()
}

fn as_count(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n.as_u64().unwrap_or_else(|| match n.as_f64() {
            Some(f) if f.is_finite() && f > 0.0 => f as u64,
            _ => 0,
        }),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Build a dataset from an arbitrary JSON document
///
/// An array is the dataset. Each object element becomes a [TestRun], other elements are skipped.
/// Any other document is an empty dataset.
pub fn test_runs_from_value(value: Value) -> Vec<TestRun> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match item {
                Value::Object(map) => Some(TestRun::from(map)),
                other => {
                    log::warn!("Skipping dataset entry {index}, not an object: {other}");
                    None
                }
            })
            .collect(),
        other => {
            log::warn!("Dataset is not a JSON array, treating it as empty: {other}");
            Vec::new()
        }
    }
}

/// Load a dataset from a reader
///
/// Fails only if the content is not valid JSON. See [test_runs_from_value] for how the document is
/// interpreted.
pub fn load_test_runs<R: Read>(reader: R) -> serde_json::Result<Vec<TestRun>> {
    let reader = std::io::BufReader::new(reader);
    let value: Value = serde_json::from_reader(reader)?;
    Ok(test_runs_from_value(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn deserialize_full_record() {
        let run: TestRun = serde_json::from_value(json!({
            "test_name": "Checkout",
            "purpose": "Regression",
            "loadtestbegintime": "1700000000000",
            "loadtestendtime": "1700000600000",
            "duration": "600000",
            "dev_vusers_num": 1,
            "api_vusers_num": 2,
            "ui_vusers_num": 3,
            "erp_vusers_num": 4,
            "legacy_vusers_num": 5,
            "mobile_vusers_num": 6,
            "ui_status": "PASSED",
            "test_run_user": "alice",
            "build": "1.2.3"
        }))
        .unwrap();

        assert_eq!(Some("Checkout".to_string()), run.test_name);
        assert_eq!(Some("Regression".to_string()), run.purpose);
        assert_eq!("1700000000000", run.loadtestbegintime);
        assert_eq!(21, run.total_vusers());
        assert!(run.is_passed());
        assert_eq!(Some(&json!("1.2.3")), run.extra.get("build"));
    }

    #[test]
    fn label_keys_match_across_case_and_aliases() {
        let run: TestRun =
            serde_json::from_value(json!({ "TestName": "Search", "Test_Purpose": "Soak" }))
                .unwrap();
        assert_eq!(Some("Search".to_string()), run.test_name);
        assert_eq!(Some("Soak".to_string()), run.purpose);

        let run: TestRun = serde_json::from_value(json!({ "name": "Login" })).unwrap();
        assert_eq!(Some("Login".to_string()), run.test_name);
    }

    #[test]
    fn preferred_name_alias_wins_and_others_are_kept() {
        let run: TestRun =
            serde_json::from_value(json!({ "name": "fallback", "testName": "preferred" }))
                .unwrap();
        assert_eq!(Some("preferred".to_string()), run.test_name);
        assert_eq!(Some(&json!("fallback")), run.extra.get("name"));
    }

    #[test]
    fn numbers_and_strings_are_interchangeable() {
        let run: TestRun = serde_json::from_value(json!({
            "loadtestbegintime": 1000,
            "loadtestendtime": "2000",
            "dev_vusers_num": "7",
            "api_vusers_num": 2.9,
            "ui_vusers_num": -4,
            "erp_vusers_num": "lots",
            "legacy_vusers_num": null
        }))
        .unwrap();

        assert_eq!("1000", run.loadtestbegintime);
        assert_eq!("2000", run.loadtestendtime);
        assert_eq!(7, run.dev_vusers_num);
        assert_eq!(2, run.api_vusers_num);
        assert_eq!(0, run.ui_vusers_num);
        assert_eq!(0, run.erp_vusers_num);
        assert_eq!(0, run.legacy_vusers_num);
        assert_eq!(9, run.total_vusers());
    }

    #[test]
    fn empty_object_is_a_default_run() {
        let run: TestRun = serde_json::from_value(json!({})).unwrap();
        assert_eq!(TestRun::default(), run);
    }

    #[test]
    fn total_vusers_saturates() {
        let run = TestRun {
            dev_vusers_num: u64::MAX,
            api_vusers_num: 1,
            ..Default::default()
        };
        assert_eq!(u64::MAX, run.total_vusers());
    }

    #[test]
    fn serialize_then_deserialize_keeps_extra_fields() {
        let original: TestRun = serde_json::from_value(json!({
            "testName": "Checkout",
            "ui_status": "FAILED",
            "region": "eu"
        }))
        .unwrap();
        let value = serde_json::to_value(&original).unwrap();
        assert_eq!(Some(&json!("Checkout")), value.get("test_name"));
        assert_eq!(Some(&json!("eu")), value.get("region"));

        let reloaded: TestRun = serde_json::from_value(value).unwrap();
        assert_eq!(original, reloaded);
    }

    #[test]
    fn dataset_skips_non_objects() {
        let runs = test_runs_from_value(json!([{ "test_name": "a" }, 42, "x", { "name": "b" }]));
        assert_eq!(2, runs.len());
        assert_eq!(Some("b".to_string()), runs[1].test_name);
    }

    #[test]
    fn non_array_dataset_is_empty() {
        assert!(test_runs_from_value(json!({ "runs": [] })).is_empty());
        assert!(test_runs_from_value(json!(null)).is_empty());
    }

    #[test]
    fn load_rejects_invalid_json() {
        assert!(load_test_runs("[{".as_bytes()).is_err());
        assert_eq!(1, load_test_runs("[{}]".as_bytes()).unwrap().len());
    }
}

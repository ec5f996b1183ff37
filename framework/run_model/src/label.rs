use crate::TestRun;
use serde::{Deserialize, Serialize};

/// Label used when a record does not carry a usable name or purpose
pub const UNKNOWN_LABEL: &str = "Unknown";

/// The display name of a run
///
/// Always non-empty. Falls back to [UNKNOWN_LABEL] when the record has no name or a blank one.
pub fn test_name(run: &TestRun) -> String {
    resolve_label(run.test_name.as_deref())
}

/// The purpose of a run, falling back to [UNKNOWN_LABEL]
pub fn purpose(run: &TestRun) -> String {
    resolve_label(run.purpose.as_deref())
}

fn resolve_label(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(label) if !label.is_empty() => label.to_string(),
        _ => UNKNOWN_LABEL.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum SentimentKind {
    #[display("Positive")]
    Positive,
    #[display("Negative")]
    Negative,
    #[display("Unknown")]
    Unknown,
}

impl SentimentKind {
    /// Display color as a `#rrggbb` hex string
    pub fn color(&self) -> &'static str {
        match self {
            SentimentKind::Positive => "#22c55e",
            SentimentKind::Negative => "#ef4444",
            SentimentKind::Unknown => "#9ca3af",
        }
    }
}

/// How a run went, with the color to show it in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentiment {
    pub name: String,
    pub color: String,
}

impl From<SentimentKind> for Sentiment {
    fn from(kind: SentimentKind) -> Self {
        Self {
            name: kind.to_string(),
            color: kind.color().to_string(),
        }
    }
}

/// Derive the sentiment of a run from its status
pub fn sentiment(run: &TestRun) -> Sentiment {
    sentiment_kind(run).into()
}

pub(crate) fn sentiment_kind(run: &TestRun) -> SentimentKind {
    if run.ui_status.trim().is_empty() {
        SentimentKind::Unknown
    } else if run.is_passed() {
        SentimentKind::Positive
    } else {
        SentimentKind::Negative
    }
}

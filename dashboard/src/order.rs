use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(anyhow::anyhow!("Unknown sort order: {other}, expected asc or desc")),
        }
    }
}

/// Order test names for display.
///
/// Names listed in `test_order` come first, in that order. Entries of `test_order` that are not
/// among `names` are ignored. The remaining names follow, sorted by `sort_order`.
pub fn order_test_names<I, S>(names: I, test_order: &[String], sort_order: SortOrder) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut remaining = names.into_iter().map(Into::into).collect::<HashSet<String>>();

    let mut ordered = Vec::with_capacity(remaining.len());
    for name in test_order {
        if remaining.remove(name) {
            ordered.push(name.clone());
        }
    }

    let mut rest = remaining.into_iter().collect::<Vec<_>>();
    rest.sort();
    if sort_order == SortOrder::Desc {
        rest.reverse();
    }
    ordered.extend(rest);

    ordered
}

/// Move `name` to `position` in `order`, inserting it if it is not there yet.
///
/// Positions past the end move the name to the end.
pub fn move_test(order: &[String], name: &str, position: usize) -> Vec<String> {
    let mut moved = order
        .iter()
        .filter(|n| n.as_str() != name)
        .cloned()
        .collect::<Vec<_>>();
    let position = position.min(moved.len());
    moved.insert(position, name.to_string());
    moved
}

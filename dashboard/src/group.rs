use itertools::Itertools;
use load_timeline_model::{test_name, TestRun};
use std::collections::BTreeMap;

/// Group runs by their resolved test name.
///
/// Runs keep their relative input order within each group.
pub fn group_tests_by_name<'a, I>(runs: I) -> BTreeMap<String, Vec<&'a TestRun>>
where
    I: IntoIterator<Item = &'a TestRun>,
{
    runs.into_iter().fold(BTreeMap::new(), |mut acc, run| {
        acc.entry(test_name(run)).or_insert_with(Vec::new).push(run);
        acc
    })
}

/// Distinct resolved test names, sorted
pub fn unique_test_names<'a, I>(runs: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a TestRun>,
{
    runs.into_iter().map(test_name).sorted().dedup().collect()
}

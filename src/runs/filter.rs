use std::{borrow::Borrow, collections::BTreeSet};

use super::TestRun;

/// A dimension runs can be filtered on
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
    strum_macros::AsRefStr,
)]
pub enum FilterDimension {
    #[strum(serialize = "team")]
    Team,
    #[strum(serialize = "testType")]
    TestType,
    #[strum(serialize = "status")]
    Status,
}

impl FilterDimension {
    #[must_use]
    pub fn value_of(self, run: &TestRun) -> &str {
        match self {
            FilterDimension::Team => &run.team,
            FilterDimension::TestType => &run.test_type,
            FilterDimension::Status => run.status.as_str(),
        }
    }
}

/// Allowed values per dimension, an empty set does not restrict
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    team: BTreeSet<String>,
    test_type: BTreeSet<String>,
    status: BTreeSet<String>,
}

impl FilterSet {
    #[must_use]
    pub fn allowed(&self, dimension: FilterDimension) -> &BTreeSet<String> {
        match dimension {
            FilterDimension::Team => &self.team,
            FilterDimension::TestType => &self.test_type,
            FilterDimension::Status => &self.status,
        }
    }

    fn allowed_mut(&mut self, dimension: FilterDimension) -> &mut BTreeSet<String> {
        match dimension {
            FilterDimension::Team => &mut self.team,
            FilterDimension::TestType => &mut self.test_type,
            FilterDimension::Status => &mut self.status,
        }
    }

    /// Adds or removes `value` for `dimension`, returns whether anything changed
    pub fn set(
        &mut self,
        dimension: FilterDimension,
        value: impl Into<String>,
        included: bool,
    ) -> bool {
        let value = value.into();
        let allowed = self.allowed_mut(dimension);

        if included {
            allowed.insert(value)
        } else {
            allowed.remove(&value)
        }
    }

    #[must_use]
    pub fn is_included(&self, dimension: FilterDimension, value: &str) -> bool {
        self.allowed(dimension).contains(value)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.team.is_empty() && self.test_type.is_empty() && self.status.is_empty()
    }

    pub fn clear(&mut self) {
        *self = FilterSet::default();
    }

    /// A run passes if, for every restricted dimension, its value is allowed
    #[must_use]
    pub fn passes(&self, run: &TestRun) -> bool {
        [
            FilterDimension::Team,
            FilterDimension::TestType,
            FilterDimension::Status,
        ]
        .into_iter()
        .all(|dimension| {
            let allowed = self.allowed(dimension);
            allowed.is_empty() || allowed.contains(dimension.value_of(run))
        })
    }
}

/// Keeps the runs passing `filters`, in their original order
pub fn apply_filters<'a>(
    runs: impl IntoIterator<Item = &'a TestRun>,
    filters: &FilterSet,
) -> Vec<&'a TestRun> {
    runs.into_iter().filter(|run| filters.passes(run)).collect()
}

/// Sorts by status priority, then most recent first
///
/// The sort is stable, runs with equal keys keep their relative order.
pub fn sort_runs<R: Borrow<TestRun>>(runs: &mut [R]) {
    runs.sort_by(|a, b| {
        let (a, b) = (a.borrow(), b.borrow());
        a.status
            .priority()
            .cmp(&b.status.priority())
            .then_with(|| b.recency().cmp(&a.recency()))
    });
}

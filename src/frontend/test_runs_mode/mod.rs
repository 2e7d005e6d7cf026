//! Historical runs: stats, a selectable table, filters and batch re-runs
mod on_key;
mod ui;

pub use on_key::on_key;
pub use ui::ui;

use strum::IntoEnumIterator as _;

use crate::runs::{FilterDimension, RunRegistry};

/// Every value that can be filtered on, per dimension, in display order
pub(super) fn filter_options(registry: &RunRegistry) -> Vec<(FilterDimension, String)> {
    FilterDimension::iter()
        .flat_map(|dimension| {
            registry
                .distinct_values(dimension)
                .into_iter()
                .map(move |value| (dimension, value.to_string()))
                .collect::<Vec<_>>()
        })
        .collect()
}

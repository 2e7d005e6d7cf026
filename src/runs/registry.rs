use std::collections::{BTreeMap, BTreeSet, HashSet};

use futures::StreamExt as _;
use serde_json::{Map, Value};

use crate::gateway::{Gateway, GatewayError};

use super::{
    apply_filters, execute_batch, sort_runs, FilterDimension, FilterSet, MergeError, RunError,
    RunSource, RunSourceError, RunStatus, TestRun,
};

/// A run picked for re-running
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selected {
    pub run_id: String,
    pub file_path: String,
}

impl From<&TestRun> for Selected {
    fn from(run: &TestRun) -> Self {
        Self {
            run_id: run.run_id.clone(),
            file_path: run.file_path.clone(),
        }
    }
}

/// Counts over the filtered view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub passed: usize,
    pub failed: usize,
    pub untested: usize,
    pub total: usize,
}

/// How a batch re-run went
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Succeeded { total: usize },
    Failed {
        total: usize,
        failed: usize,
        message: String,
    },
}

impl BatchOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, BatchOutcome::Succeeded { .. })
    }
}

#[derive(Debug, Default)]
struct Batch {
    total: usize,
    errors: Vec<RunError>,
}

/// Holds all known runs together with the filters and selection applied to them
#[derive(Debug, Default)]
pub struct RunRegistry {
    runs: Vec<TestRun>,
    filters: FilterSet,
    selection: Vec<Selected>,
    batch: Option<Batch>,
    loaded: bool,
}

impl RunRegistry {
    #[must_use]
    pub fn with_runs(runs: Vec<TestRun>) -> Self {
        let mut registry = Self::default();
        registry.load_runs(runs);
        registry
    }

    /// Replaces every run
    ///
    /// Run ids are unique, later duplicates are dropped. Runs without an id cannot be selected
    /// or merged and are dropped as well.
    pub fn load_runs(&mut self, runs: Vec<TestRun>) {
        let mut seen = HashSet::new();
        self.runs = runs
            .into_iter()
            .filter(|run| {
                if run.run_id.is_empty() {
                    tracing::warn!(file_path = %run.file_path, "Dropping run without an id");
                    return false;
                }

                let unique = seen.insert(run.run_id.clone());
                if !unique {
                    tracing::warn!(run_id = %run.run_id, "Dropping duplicate run");
                }
                unique
            })
            .collect();
        self.loaded = true;
        self.prune_selection();
    }

    /// Loads the runs for `timeframe` from `source`
    pub async fn load_from<S: RunSource + ?Sized>(
        &mut self,
        source: &S,
        timeframe: &str,
    ) -> Result<(), RunSourceError> {
        let runs = source.fetch(timeframe).await?;
        tracing::info!(timeframe, count = runs.len(), "Loaded runs");
        self.load_runs(runs);
        Ok(())
    }

    #[must_use]
    pub fn runs(&self) -> &[TestRun] {
        &self.runs
    }

    #[must_use]
    pub fn find(&self, run_id: &str) -> Option<&TestRun> {
        self.runs.iter().find(|run| run.run_id == run_id)
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Marks the registry as waiting for a new set of runs
    pub fn mark_loading(&mut self) {
        self.loaded = false;
    }

    /// Ends loading without replacing the runs, i.e. when the source failed
    pub fn mark_loaded(&mut self) {
        self.loaded = true;
    }

    #[must_use]
    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn set_filter(&mut self, dimension: FilterDimension, value: &str, included: bool) {
        if self.filters.set(dimension, value, included) {
            self.prune_selection();
        }
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    /// Distinct values present for a dimension, used to offer filter options
    #[must_use]
    pub fn distinct_values(&self, dimension: FilterDimension) -> BTreeSet<&str> {
        self.runs
            .iter()
            .map(|run| dimension.value_of(run))
            .filter(|value| !value.is_empty())
            .collect()
    }

    /// The filtered runs, failures first and most recent first within a status
    #[must_use]
    pub fn derived_view(&self) -> Vec<&TestRun> {
        let mut view = apply_filters(&self.runs, &self.filters);
        sort_runs(&mut view);
        view
    }

    #[must_use]
    pub fn group_by_status(&self) -> BTreeMap<RunStatus, Vec<&TestRun>> {
        let mut groups: BTreeMap<RunStatus, Vec<&TestRun>> = BTreeMap::new();
        for run in self.derived_view() {
            groups.entry(run.status.clone()).or_default().push(run);
        }
        groups
    }

    #[must_use]
    pub fn stats(&self) -> RunStats {
        let groups = self.group_by_status();
        let count = |status: &RunStatus| groups.get(status).map_or(0, Vec::len);

        RunStats {
            passed: count(&RunStatus::Passed),
            failed: count(&RunStatus::Failed),
            untested: count(&RunStatus::Untested),
            total: groups.values().map(Vec::len).sum(),
        }
    }

    #[must_use]
    pub fn selection(&self) -> &[Selected] {
        &self.selection
    }

    #[must_use]
    pub fn is_selected(&self, run_id: &str) -> bool {
        self.selection.iter().any(|selected| selected.run_id == run_id)
    }

    /// Selects the run if it is not selected, deselects it otherwise
    ///
    /// Only runs in the filtered view can be selected.
    pub fn toggle_select(&mut self, run_id: &str, file_path: &str) {
        if self.is_selected(run_id) {
            self.selection.retain(|selected| selected.run_id != run_id);
        } else if !self.derived_view().iter().any(|run| run.run_id == run_id) {
            tracing::debug!(run_id, "Ignoring selection of a run that is not shown");
        } else {
            self.selection.push(Selected {
                run_id: run_id.to_string(),
                file_path: file_path.to_string(),
            });
        }
    }

    /// Selects everything in the filtered view, or nothing
    pub fn select_all(&mut self, select: bool) {
        self.selection = if select {
            self.derived_view().into_iter().map(Selected::from).collect()
        } else {
            Vec::new()
        };
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.batch.is_some()
    }

    /// Starts a batch re-run of the selection and returns its targets
    ///
    /// Returns `None` while another batch is running.
    pub fn begin_batch(&mut self) -> Option<Vec<Selected>> {
        if self.batch.is_some() {
            tracing::debug!("Batch already running, ignoring");
            return None;
        }

        let targets = self.selection.clone();
        self.batch = Some(Batch {
            total: targets.len(),
            errors: Vec::new(),
        });
        Some(targets)
    }

    /// Merges a single re-run result into the run it belongs to
    ///
    /// Failures are remembered for the running batch and returned.
    pub fn apply_result(
        &mut self,
        run_id: &str,
        result: Result<Map<String, Value>, GatewayError>,
    ) -> Result<(), String> {
        let outcome = match result {
            Ok(fields) => self.merge(run_id, fields).map_err(RunError::from),
            Err(source) => Err(RunError::Remote {
                run_id: run_id.to_string(),
                source,
            }),
        };

        outcome.map_err(|error| {
            tracing::error!(%error, "Re-run failed");
            let message = error.to_string();
            if let Some(batch) = self.batch.as_mut() {
                batch.errors.push(error);
            }
            message
        })
    }

    fn merge(&mut self, run_id: &str, fields: Map<String, Value>) -> Result<(), MergeError> {
        let run = self
            .runs
            .iter_mut()
            .find(|run| run.run_id == run_id)
            .ok_or_else(|| MergeError::UnknownRun(run_id.to_string()))?;

        run.merge(fields)
    }

    /// Ends the running batch, clearing the selection whatever the outcome
    pub fn finish_batch(&mut self) -> BatchOutcome {
        self.selection.clear();
        let batch = self.batch.take().unwrap_or_default();

        match batch.errors.first() {
            None => {
                tracing::info!(total = batch.total, "All re-runs succeeded");
                BatchOutcome::Succeeded { total: batch.total }
            }
            Some(first) => {
                tracing::error!(
                    total = batch.total,
                    failed = batch.errors.len(),
                    "Batch re-run failed: {first}"
                );
                BatchOutcome::Failed {
                    total: batch.total,
                    failed: batch.errors.len(),
                    message: first.to_string(),
                }
            }
        }
    }

    /// Re-runs every selected run concurrently and merges results as they land
    ///
    /// Results that arrived before a failure stay applied.
    pub async fn run_selected<G: Gateway + ?Sized>(&mut self, gateway: &G) -> BatchOutcome {
        let Some(targets) = self.begin_batch() else {
            return BatchOutcome::Failed {
                total: 0,
                failed: 0,
                message: "a batch is already running".to_string(),
            };
        };

        let mut results = execute_batch(gateway, &targets);
        while let Some((run_id, result)) = results.next().await {
            let _ = self.apply_result(&run_id, result);
        }

        self.finish_batch()
    }

    fn prune_selection(&mut self) {
        let visible = self
            .derived_view()
            .into_iter()
            .map(|run| run.run_id.clone())
            .collect::<HashSet<_>>();
        self.selection
            .retain(|selected| visible.contains(&selected.run_id));
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::gateway::{EndpointKind, MockGateway};
    use crate::runs::JUST_UPDATED;

    fn registry() -> RunRegistry {
        RunRegistry::with_runs(vec![
            TestRun::new("1", "a.py", "Untested", "2024-01-01").with_team("Core"),
            TestRun::new("2", "b.py", "Failed", "2024-01-02").with_team("Growth"),
            TestRun::new("3", "c.py", "Passed", "2024-01-03").with_team("Core"),
        ])
    }

    fn view_ids(registry: &RunRegistry) -> Vec<&str> {
        registry
            .derived_view()
            .into_iter()
            .map(|run| run.run_id.as_str())
            .collect()
    }

    #[test]
    fn test_derived_view_orders_by_status() {
        assert_eq!(view_ids(&registry()), ["2", "3", "1"]);
    }

    #[test]
    fn test_status_filter_on_and_off() {
        let mut registry = registry();
        registry.set_filter(FilterDimension::Status, "Failed", true);
        assert_eq!(view_ids(&registry), ["2"]);

        registry.set_filter(FilterDimension::Status, "Failed", false);
        assert_eq!(view_ids(&registry), ["2", "3", "1"]);
    }

    #[test]
    fn test_toggle_select_is_an_involution() {
        let mut registry = registry();
        registry.toggle_select("3", "c.py");
        let before = registry.selection().to_vec();

        registry.toggle_select("1", "a.py");
        registry.toggle_select("1", "a.py");

        assert_eq!(registry.selection(), before.as_slice());
    }

    #[test]
    fn test_select_all_uses_the_filtered_view() {
        let mut registry = registry();
        registry.set_filter(FilterDimension::Team, "Core", true);

        registry.select_all(true);
        let ids = registry
            .selection()
            .iter()
            .map(|selected| selected.run_id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, ["3", "1"]);

        registry.select_all(false);
        assert!(registry.selection().is_empty());
    }

    #[test]
    fn test_filtering_prunes_the_selection() {
        let mut registry = registry();
        registry.select_all(true);

        registry.set_filter(FilterDimension::Team, "Growth", true);

        assert_eq!(registry.selection().len(), 1);
        assert!(registry.is_selected("2"));
    }

    #[test]
    fn test_stats() {
        let stats = registry().stats();

        assert_eq!(
            stats,
            RunStats {
                passed: 1,
                failed: 1,
                untested: 1,
                total: 3
            }
        );
    }

    #[test]
    fn test_stats_on_empty_registry() {
        let registry = RunRegistry::default();

        assert!(registry.group_by_status().is_empty());
        assert_eq!(registry.stats(), RunStats::default());
    }

    #[test]
    fn test_group_by_status_respects_filters() {
        let mut registry = registry();
        registry.set_filter(FilterDimension::Team, "Core", true);

        let groups = registry.group_by_status();

        assert!(!groups.contains_key(&RunStatus::Failed));
        assert_eq!(groups[&RunStatus::Passed].len(), 1);
        assert_eq!(groups[&RunStatus::Untested].len(), 1);
    }

    #[test]
    fn test_duplicate_run_ids_are_dropped() {
        let registry = RunRegistry::with_runs(vec![
            TestRun::new("1", "a.py", "Passed", ""),
            TestRun::new("1", "b.py", "Failed", ""),
        ]);

        assert_eq!(registry.runs().len(), 1);
        assert_eq!(registry.runs()[0].file_path, "a.py");
    }

    #[test]
    fn test_runs_without_an_id_are_dropped() {
        let registry = RunRegistry::with_runs(vec![
            TestRun::new("", "a.py", "Failed", ""),
            TestRun::new("", "b.py", "Failed", ""),
            TestRun::new("3", "c.py", "Passed", ""),
        ]);

        let ids = registry
            .runs()
            .iter()
            .map(|run| run.run_id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, ["3"]);
    }

    #[test]
    fn test_only_shown_runs_can_be_selected() {
        let mut registry = registry();
        registry.set_filter(FilterDimension::Team, "Core", true);

        registry.toggle_select("2", "b.py");
        registry.toggle_select("unknown", "x.py");
        assert!(registry.selection().is_empty());

        registry.toggle_select("1", "a.py");
        assert!(registry.is_selected("1"));
    }

    #[test_log::test(tokio::test)]
    async fn test_run_selected_with_one_failure() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_call()
            .times(3)
            .returning(|endpoint, payload| {
                assert_eq!(endpoint, EndpointKind::Execute);
                match payload["filePath"].as_str() {
                    Some("b.py") => Err(GatewayError::remote(endpoint, "500")),
                    _ => Ok(json!({ "status": "Passed" })),
                }
            });

        let mut registry = registry();
        registry.select_all(true);

        let outcome = registry.run_selected(&gateway).await;

        assert!(matches!(
            outcome,
            BatchOutcome::Failed {
                total: 3,
                failed: 1,
                ..
            }
        ));
        assert!(registry.selection().is_empty());
        assert!(!registry.is_running());

        let run = |id| registry.find(id).unwrap();
        assert_eq!(run("1").status, RunStatus::Passed);
        assert_eq!(run("1").timeframe, JUST_UPDATED);
        assert_eq!(run("3").timeframe, JUST_UPDATED);
        assert_eq!(run("2").status, RunStatus::Failed);
        assert_eq!(run("2").timeframe, "2024-01-02");
    }

    #[tokio::test]
    async fn test_run_selected_success() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_call()
            .withf(|_, payload| payload == &json!({ "filePath": "a.py" }))
            .times(1)
            .returning(|_, _| Ok(json!({ "status": "Failed", "durationMs": 10 })));

        let mut registry = registry();
        registry.toggle_select("1", "a.py");

        let outcome = registry.run_selected(&gateway).await;

        assert_eq!(outcome, BatchOutcome::Succeeded { total: 1 });
        let run = registry.find("1").unwrap();
        assert_eq!(run.status, RunStatus::Failed);
        assert_eq!(run.extra.get("durationMs"), Some(&json!(10)));
        // Freshly failed runs move to the top
        assert_eq!(view_ids(&registry)[0], "1");
    }

    #[test]
    fn test_only_one_batch_at_a_time() {
        let mut registry = registry();
        registry.toggle_select("1", "a.py");

        assert!(registry.begin_batch().is_some());
        assert!(registry.begin_batch().is_none());

        registry.finish_batch();
        assert!(!registry.is_running());
    }

    #[test]
    fn test_result_for_unknown_run_fails_the_batch() {
        let mut registry = registry();
        registry.begin_batch();

        let result = registry.apply_result("nope", Ok(Map::new()));

        assert!(result.is_err());
        assert!(!registry.finish_batch().is_success());
    }
}

//! In-memory record of the current pipeline run.
//!
//! A single [`Snapshot`] exists per process. It is mutated only through the
//! methods below, which the [`EventHub`](crate::hub::EventHub) calls while
//! holding its exclusive region, so readers always observe a fully applied
//! update.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default iteration budget when `pipeline/start` omits one.
pub const DEFAULT_MAX_ITERATIONS: u64 = 5;

/// Label used by `set_current_step` immediately after an iteration starts.
const STARTING_STEP: &str = "starting";

/// Run status as seen by viewers.
///
/// Finish statuses are open-ended: the pipeline may report anything
/// (`converged`, `max_reached`, or a label of its own), so unknown strings
/// round-trip through the untagged variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Idle,
    Running,
    Converged,
    MaxReached,
    Finished,
    #[serde(untagged)]
    Other(String),
}

impl Default for RunStatus {
    fn default() -> Self {
        RunStatus::Idle
    }
}

/// One iteration of the run: appended by `iteration/start`, filled in by
/// `step/complete`, never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Iteration {
    pub number: u64,
    /// Step name -> result payload. `step/complete` overwrites on repeat.
    pub steps: Map<String, Value>,
    pub started_at: DateTime<Utc>,
}

impl Iteration {
    fn new(number: u64) -> Self {
        Self {
            number,
            steps: Map::new(),
            started_at: Utc::now(),
        }
    }
}

/// The full state of the current run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub status: RunStatus,
    pub current_iteration: u64,
    pub current_step: String,
    pub iterations: Vec<Iteration>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Map<String, Value>>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            status: RunStatus::Idle,
            current_iteration: 0,
            current_step: String::new(),
            iterations: Vec::new(),
            started_at: None,
            finished_at: None,
            max_iterations: None,
            summary: None,
        }
    }
}

impl Snapshot {
    /// Start a fresh run, discarding everything from the previous one.
    pub fn reset(&mut self, max_iterations: u64) {
        self.status = RunStatus::Running;
        self.current_iteration = 0;
        self.current_step.clear();
        self.iterations.clear();
        self.started_at = Some(Utc::now());
        self.finished_at = None;
        self.max_iterations = Some(max_iterations);
        self.summary = None;
    }

    /// Append a new iteration and make it current.
    ///
    /// When the caller omits the number it continues the sequence from
    /// `current_iteration + 1`.
    pub fn begin_iteration(&mut self, number: Option<u64>) -> u64 {
        let number = number.unwrap_or(self.current_iteration + 1);
        self.current_iteration = number;
        self.current_step = STARTING_STEP.to_string();
        self.iterations.push(Iteration::new(number));
        number
    }

    /// Update the step label only; iterations are untouched.
    pub fn set_current_step(&mut self, step: &str) {
        self.current_step = step.to_string();
    }

    /// Record a step result in the last appended iteration.
    ///
    /// Results always land in the most recently appended iteration, not the
    /// one matching `current_iteration` — out-of-order callers get
    /// last-appended-wins. With no iterations at all this is a no-op.
    pub fn record_step_result(&mut self, step: &str, result: Value) {
        if let Some(iteration) = self.iterations.last_mut() {
            iteration.steps.insert(step.to_string(), result);
        }
    }

    /// Mark the run finished with a status label and summary.
    pub fn finish(&mut self, status: RunStatus, summary: Map<String, Value>) {
        self.status = status;
        self.finished_at = Some(Utc::now());
        self.summary = Some(summary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reset_starts_a_clean_run() {
        let mut snap = Snapshot::default();
        snap.begin_iteration(Some(3));
        snap.finish(RunStatus::Converged, Map::new());

        snap.reset(7);

        assert_eq!(snap.status, RunStatus::Running);
        assert_eq!(snap.current_iteration, 0);
        assert_eq!(snap.current_step, "");
        assert!(snap.iterations.is_empty());
        assert!(snap.started_at.is_some());
        assert!(snap.finished_at.is_none());
        assert_eq!(snap.max_iterations, Some(7));
        assert!(snap.summary.is_none());
    }

    #[test]
    fn test_begin_iteration_defaults_to_next_number() {
        let mut snap = Snapshot::default();
        snap.reset(5);

        assert_eq!(snap.begin_iteration(None), 1);
        assert_eq!(snap.begin_iteration(None), 2);
        assert_eq!(snap.begin_iteration(Some(9)), 9);
        assert_eq!(snap.begin_iteration(None), 10);
        assert_eq!(snap.current_step, "starting");
        assert_eq!(snap.iterations.len(), 4);
    }

    #[test]
    fn test_step_result_without_iteration_is_a_noop() {
        let mut snap = Snapshot::default();
        snap.reset(5);

        snap.record_step_result("generate", json!({"ok": true}));

        assert!(snap.iterations.is_empty());
    }

    #[test]
    fn test_step_result_overwrites_same_step() {
        let mut snap = Snapshot::default();
        snap.reset(5);
        snap.begin_iteration(None);

        snap.record_step_result("generate", json!({"attempt": 1}));
        snap.record_step_result("generate", json!({"attempt": 2}));

        let steps = &snap.iterations[0].steps;
        assert_eq!(steps.len(), 1);
        assert_eq!(steps["generate"], json!({"attempt": 2}));
    }

    #[test]
    fn test_step_result_targets_last_appended_iteration() {
        let mut snap = Snapshot::default();
        snap.reset(5);
        snap.begin_iteration(Some(1));
        snap.begin_iteration(Some(2));
        // current_iteration deliberately moved off the last iteration
        snap.current_iteration = 1;

        snap.record_step_result("review", json!("done"));

        assert!(snap.iterations[0].steps.is_empty());
        assert_eq!(snap.iterations[1].steps["review"], json!("done"));
    }

    #[test]
    fn test_finish_sets_status_and_summary() {
        let mut snap = Snapshot::default();
        snap.reset(5);

        let mut summary = Map::new();
        summary.insert("score".into(), json!(0.9));
        snap.finish(RunStatus::Converged, summary);

        assert_eq!(snap.status, RunStatus::Converged);
        assert!(snap.finished_at.is_some());
        assert_eq!(snap.summary.as_ref().unwrap()["score"], json!(0.9));
    }

    #[test]
    fn test_custom_status_serializes_as_bare_string() {
        let status = RunStatus::Other("gave_up".to_string());
        assert_eq!(serde_json::to_value(&status).unwrap(), json!("gave_up"));

        let parsed: RunStatus = serde_json::from_value(json!("max_reached")).unwrap();
        assert_eq!(parsed, RunStatus::MaxReached);
        let parsed: RunStatus = serde_json::from_value(json!("gave_up")).unwrap();
        assert_eq!(parsed, RunStatus::Other("gave_up".to_string()));
    }
}

//! Wire format for messages pushed to viewers.

use serde::Serialize;
use serde_json::Value;

use crate::snapshot::Snapshot;

/// Events sent to WebSocket clients as `{"type": ..., "data": ...}`.
///
/// `State` is only ever the first message on a fresh connection; everything
/// else mirrors a pipeline lifecycle event.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum WsEvent {
    /// Full snapshot, sent once on connect.
    State(Snapshot),
    /// A run started; carries the freshly reset snapshot.
    PipelineStart(Snapshot),
    /// An iteration started.
    IterationStart { number: u64 },
    /// A step began within the current iteration.
    StepStart { iteration: u64, step: String },
    /// A step finished with a result payload.
    StepComplete {
        iteration: u64,
        step: String,
        result: Value,
    },
    /// The run finished; carries the final snapshot.
    PipelineFinish(Snapshot),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_events_encode_as_type_data_envelopes() {
        let ev = WsEvent::IterationStart { number: 2 };
        assert_eq!(
            serde_json::to_value(&ev).unwrap(),
            json!({"type": "iteration_start", "data": {"number": 2}})
        );

        let ev = WsEvent::StepComplete {
            iteration: 2,
            step: "generate".to_string(),
            result: json!({"ok": true}),
        };
        assert_eq!(
            serde_json::to_value(&ev).unwrap(),
            json!({
                "type": "step_complete",
                "data": {"iteration": 2, "step": "generate", "result": {"ok": true}}
            })
        );
    }

    #[test]
    fn test_state_event_carries_full_snapshot() {
        let ev = WsEvent::State(Snapshot::default());
        let value = serde_json::to_value(&ev).unwrap();
        assert_eq!(value["type"], "state");
        assert_eq!(value["data"]["status"], "idle");
        assert_eq!(value["data"]["iterations"], json!([]));
    }
}

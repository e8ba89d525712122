//! Event hub: the single place where pipeline events meet viewers.
//!
//! One mutex guards both the [`Snapshot`] and the subscriber registry, so
//! every lifecycle event runs mutate → build message → fan-out as one
//! exclusive region. Nothing inside that region awaits: sends use
//! `try_send` on bounded channels, which also gives the stuck-subscriber
//! bound (a viewer whose buffer is full is pruned, not awaited).
//!
//! A viewer registered by [`EventHub::subscribe`] has the current snapshot
//! queued before the lock is released, so no broadcast from a later event
//! can overtake its initial `state` message.

use std::sync::{Mutex, MutexGuard};

use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::snapshot::{RunStatus, Snapshot};
use crate::ws::events::WsEvent;

/// Per-subscriber event buffer. A viewer this far behind is treated as dead.
const SUBSCRIBER_BUFFER: usize = 64;

/// Handle to one connected viewer.
struct Subscriber {
    id: Uuid,
    tx: mpsc::Sender<WsEvent>,
}

/// Live viewer connections, iterated by the broadcaster.
#[derive(Default)]
struct SubscriberRegistry {
    entries: Vec<Subscriber>,
}

impl SubscriberRegistry {
    fn add(&mut self, id: Uuid, tx: mpsc::Sender<WsEvent>) {
        self.entries.push(Subscriber { id, tx });
    }

    /// Idempotent: removing an unknown id is a no-op.
    fn remove(&mut self, id: Uuid) {
        self.entries.retain(|s| s.id != id);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

struct HubInner {
    snapshot: Snapshot,
    registry: SubscriberRegistry,
}

/// Shared state machine plus fan-out for one pipeline run.
pub struct EventHub {
    inner: Mutex<HubInner>,
}

impl EventHub {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HubInner {
                snapshot: Snapshot::default(),
                registry: SubscriberRegistry::default(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HubInner> {
        // A panic mid-region can only come from serialization of plain data;
        // the snapshot itself stays coherent, so recover the guard.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a viewer and queue the current snapshot as its first event.
    pub fn subscribe(&self) -> (Uuid, mpsc::Receiver<WsEvent>) {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);
        let id = Uuid::new_v4();

        let mut inner = self.lock();
        // Fresh channel, cannot be full.
        let _ = tx.try_send(WsEvent::State(inner.snapshot.clone()));
        inner.registry.add(id, tx);
        debug!(subscriber = %id, viewers = inner.registry.len(), "viewer subscribed");
        (id, rx)
    }

    /// Drop a viewer. Safe to call after the broadcaster already pruned it.
    pub fn unsubscribe(&self, id: Uuid) {
        let mut inner = self.lock();
        inner.registry.remove(id);
        debug!(subscriber = %id, viewers = inner.registry.len(), "viewer unsubscribed");
    }

    /// Current snapshot, cloned under the lock.
    pub fn state(&self) -> Snapshot {
        self.lock().snapshot.clone()
    }

    #[cfg(test)]
    fn subscriber_count(&self) -> usize {
        self.lock().registry.len()
    }

    // --- Pipeline lifecycle events -----------------------------------------

    pub fn pipeline_start(&self, max_iterations: u64) {
        let mut inner = self.lock();
        inner.snapshot.reset(max_iterations);
        let event = WsEvent::PipelineStart(inner.snapshot.clone());
        Self::fan_out(&mut inner, event);
    }

    pub fn iteration_start(&self, number: Option<u64>) -> u64 {
        let mut inner = self.lock();
        let number = inner.snapshot.begin_iteration(number);
        Self::fan_out(&mut inner, WsEvent::IterationStart { number });
        number
    }

    pub fn step_start(&self, step: String) {
        let mut inner = self.lock();
        inner.snapshot.set_current_step(&step);
        let iteration = inner.snapshot.current_iteration;
        Self::fan_out(&mut inner, WsEvent::StepStart { iteration, step });
    }

    pub fn step_complete(&self, step: String, result: Value) {
        let mut inner = self.lock();
        inner.snapshot.record_step_result(&step, result.clone());
        let iteration = inner.snapshot.current_iteration;
        Self::fan_out(
            &mut inner,
            WsEvent::StepComplete {
                iteration,
                step,
                result,
            },
        );
    }

    pub fn pipeline_finish(&self, status: RunStatus, summary: Map<String, Value>) {
        let mut inner = self.lock();
        inner.snapshot.finish(status, summary);
        let event = WsEvent::PipelineFinish(inner.snapshot.clone());
        Self::fan_out(&mut inner, event);
    }

    /// Deliver `event` to every subscriber, pruning the ones that fail.
    ///
    /// A closed or full channel is terminal for that subscriber; delivery to
    /// the rest is unaffected.
    fn fan_out(inner: &mut HubInner, event: WsEvent) {
        let mut dead = Vec::new();
        for sub in &inner.registry.entries {
            if sub.tx.try_send(event.clone()).is_err() {
                dead.push(sub.id);
            }
        }
        for id in dead {
            inner.registry.remove(id);
            debug!(subscriber = %id, "pruned unreachable viewer");
        }
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn recv(rx: &mut mpsc::Receiver<WsEvent>) -> WsEvent {
        rx.try_recv().expect("event queued")
    }

    #[test]
    fn test_subscriber_gets_state_before_later_broadcasts() {
        let hub = EventHub::new();
        hub.pipeline_start(3);

        let (_id, mut rx) = hub.subscribe();
        hub.iteration_start(None);

        match recv(&mut rx) {
            WsEvent::State(snap) => {
                assert_eq!(snap.max_iterations, Some(3));
                // Registered before iteration_start, so the snapshot predates it.
                assert!(snap.iterations.is_empty());
            }
            other => panic!("expected state first, got {other:?}"),
        }
        assert!(matches!(
            recv(&mut rx),
            WsEvent::IterationStart { number: 1 }
        ));
    }

    #[test]
    fn test_broken_subscriber_is_pruned_without_affecting_others() {
        let hub = EventHub::new();

        let (_healthy_id, mut healthy_rx) = hub.subscribe();
        let (_broken_id, broken_rx) = hub.subscribe();
        drop(broken_rx);
        assert_eq!(hub.subscriber_count(), 2);

        hub.step_start("generate".to_string());

        assert_eq!(hub.subscriber_count(), 1);
        let _state = recv(&mut healthy_rx);
        assert!(matches!(recv(&mut healthy_rx), WsEvent::StepStart { .. }));
    }

    #[test]
    fn test_stuck_subscriber_is_pruned_when_buffer_fills() {
        let hub = EventHub::new();
        let (_id, rx) = hub.subscribe();

        // Never drain rx: the initial state event plus broadcasts fill the
        // buffer, after which the subscriber counts as failed.
        for i in 0..2 * SUBSCRIBER_BUFFER as u64 {
            hub.step_start(format!("step-{i}"));
        }

        assert_eq!(hub.subscriber_count(), 0);
        drop(rx);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let hub = EventHub::new();
        let (id, rx) = hub.subscribe();
        drop(rx);

        hub.unsubscribe(id);
        hub.unsubscribe(id);

        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn test_lifecycle_events_carry_expected_payloads() {
        let hub = EventHub::new();
        hub.pipeline_start(5);
        let (_id, mut rx) = hub.subscribe();

        hub.iteration_start(Some(4));
        hub.step_start("review".to_string());
        hub.step_complete("review".to_string(), json!({"ok": true}));

        let mut summary = Map::new();
        summary.insert("score".into(), json!(0.9));
        hub.pipeline_finish(RunStatus::Converged, summary);

        let _state = recv(&mut rx);
        assert!(matches!(
            recv(&mut rx),
            WsEvent::IterationStart { number: 4 }
        ));
        match recv(&mut rx) {
            WsEvent::StepStart { iteration, step } => {
                assert_eq!(iteration, 4);
                assert_eq!(step, "review");
            }
            other => panic!("unexpected event {other:?}"),
        }
        match recv(&mut rx) {
            WsEvent::StepComplete { step, result, .. } => {
                assert_eq!(step, "review");
                assert_eq!(result, json!({"ok": true}));
            }
            other => panic!("unexpected event {other:?}"),
        }
        match recv(&mut rx) {
            WsEvent::PipelineFinish(snap) => {
                assert_eq!(snap.status, RunStatus::Converged);
                assert!(snap.finished_at.is_some());
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_state_reflects_full_event_sequence() {
        let hub = EventHub::new();
        hub.pipeline_start(3);
        hub.iteration_start(None);
        hub.step_complete("generate".to_string(), json!({"tokens": 120}));

        let snap = hub.state();
        assert_eq!(snap.status, RunStatus::Running);
        assert_eq!(snap.current_iteration, 1);
        assert_eq!(snap.iterations[0].steps["generate"], json!({"tokens": 120}));
    }
}

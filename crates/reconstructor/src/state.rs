//! The per-resource state machine (C4, §4.4): `Absent → Running → Terminated`,
//! turning an ordered stream of parsed lifecycle transitions into
//! [`ResourceInterval`]s.

use chrono::{DateTime, Utc};
use model::{ResourceInterval, ResourceSnapshot};

use crate::payload::Transition;

#[derive(Debug, Clone)]
enum State {
    Absent,
    Running { snapshot: ResourceSnapshot, opened_at: DateTime<Utc> },
    Terminated,
}

/// Tracks one resource's lifecycle. Memory is `O(1)` regardless of how many
/// events the resource has seen (§9 "bounded per-resource memory").
#[derive(Debug, Clone)]
pub struct ResourceMachine {
    resource_guid: String,
    state: State,
}

impl ResourceMachine {
    pub fn new(resource_guid: String) -> Self {
        Self {
            resource_guid,
            state: State::Absent,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, State::Running { .. })
    }

    /// Applies one `(transition, snapshot)` pair at `created_at`, returning
    /// a closed [`ResourceInterval`] if this event closed one (§4.4).
    /// Ties on `created_at` must already be broken by `event_guid` by the
    /// caller before events reach here (§4.4 "Determinism").
    pub fn apply(
        &mut self,
        transition: Transition,
        snapshot: ResourceSnapshot,
        created_at: DateTime<Utc>,
    ) -> Option<ResourceInterval> {
        match (&self.state, transition) {
            (State::Absent, Transition::Start) => {
                self.state = State::Running {
                    snapshot,
                    opened_at: created_at,
                };
                None
            }
            (State::Running { snapshot: current, .. }, Transition::Start) if *current == snapshot => {
                // No actual change: a re-asserted start (e.g. a platform
                // retry) doesn't split the interval.
                None
            }
            (State::Running { snapshot: current, opened_at }, Transition::Start) => {
                let closed = self.close(*opened_at, current.clone(), created_at);
                self.state = State::Running {
                    snapshot,
                    opened_at: created_at,
                };
                closed
            }
            (State::Running { snapshot: current, opened_at }, Transition::Stop) => {
                let closed = self.close(*opened_at, current.clone(), created_at);
                self.state = State::Terminated;
                closed
            }
            // Absent/Terminated ignore anything but a legitimate start; the
            // raw stream is authoritative, we never invent transitions.
            (State::Absent, Transition::Stop)
            | (State::Terminated, Transition::Start)
            | (State::Terminated, Transition::Stop) => None,
        }
    }

    /// Synthesises a stop at `stop_at` for a resource still `Running` at
    /// query time (§4.4 "If still Running at query time").
    pub fn finish(&mut self, stop_at: DateTime<Utc>) -> Option<ResourceInterval> {
        match std::mem::replace(&mut self.state, State::Terminated) {
            State::Running { snapshot, opened_at } => self.close(opened_at, snapshot, stop_at),
            other => {
                self.state = other;
                None
            }
        }
    }

    fn close(
        &self,
        start: DateTime<Utc>,
        snapshot: ResourceSnapshot,
        stop: DateTime<Utc>,
    ) -> Option<ResourceInterval> {
        let duration = model::Interval::bounded(start, stop)?; // drops zero-duration intervals
        Some(ResourceInterval {
            resource_guid: self.resource_guid.clone(),
            snapshot,
            duration,
        })
    }
}

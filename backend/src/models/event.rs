//! Event logging for observability and debugging.
//!
//! The engine records significant state changes as it ticks:
//! - **StatusTransition**: the delay state machine fired for a bus
//! - **StopArrival**: a bus reached the next waypoint and exchanged
//!   passengers
//!
//! The log is capacity-bounded and drops its oldest entries once full; the
//! engine runs indefinitely, so an unbounded log would grow without limit.
//! The number of dropped events is retained so consumers can tell the
//! window is partial.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::models::bus::BusStatus;

/// Default number of events retained.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Simulation event capturing a state change.
///
/// All events include the tick number for temporal ordering. Events are
/// logged in the order they occur within a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The delay state machine resampled a bus's state.
    ///
    /// `from` may equal `to`: the resample is memoryless and can land on
    /// the current state, which still redraws `delay_minutes`.
    StatusTransition {
        tick: u64,
        bus_id: String,
        from: BusStatus,
        to: BusStatus,
        delay_minutes: f64,
    },

    /// A bus arrived at a stop and exchanged passengers.
    StopArrival {
        tick: u64,
        bus_id: String,
        route_id: String,
        stop_label: String,
        occupancy_change: i64,
        occupancy: i64,
    },
}

impl Event {
    /// Tick number when this event occurred.
    pub fn tick(&self) -> u64 {
        match self {
            Event::StatusTransition { tick, .. } => *tick,
            Event::StopArrival { tick, .. } => *tick,
        }
    }

    /// Short description of the event type.
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::StatusTransition { .. } => "StatusTransition",
            Event::StopArrival { .. } => "StopArrival",
        }
    }

    /// Bus this event relates to.
    pub fn bus_id(&self) -> &str {
        match self {
            Event::StatusTransition { bus_id, .. } => bus_id,
            Event::StopArrival { bus_id, .. } => bus_id,
        }
    }
}

/// Bounded event log.
///
/// Keeps the most recent `capacity` events; older entries are dropped and
/// counted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLog {
    events: VecDeque<Event>,
    capacity: usize,
    dropped: u64,
}

impl EventLog {
    /// Create a log with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    /// Create a log retaining at most `capacity` events.
    ///
    /// A zero capacity is remapped to 1 so `log` never has to special-case
    /// an unstorable event.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Add an event, evicting the oldest entry if the log is full.
    pub fn log(&mut self, event: Event) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
            self.dropped += 1;
        }
        self.events.push_back(event);
    }

    /// Number of events currently retained.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of events evicted since creation.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Iterate retained events, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    /// The most recent `limit` events, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<Event> {
        let skip = self.events.len().saturating_sub(limit);
        self.events.iter().skip(skip).cloned().collect()
    }

    /// Retained events of a specific type.
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Retained events for a specific bus.
    pub fn events_for_bus(&self, bus_id: &str) -> Vec<&Event> {
        self.events.iter().filter(|e| e.bus_id() == bus_id).collect()
    }

    /// Drop all retained events. The dropped counter is preserved.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

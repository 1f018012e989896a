use std::fmt;

use particles::{BondTypeId, ParticleId};
use serde::{Deserialize, Serialize};

/// One bond that crossed its breaking threshold this step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BreakageEvent {
    pub bond_type: BondTypeId,
    pub particle_a: ParticleId,
    pub particle_b: ParticleId,
}

impl BreakageEvent {
    pub fn new(bond_type: BondTypeId, particle_a: ParticleId, particle_b: ParticleId) -> Self {
        Self {
            bond_type,
            particle_a,
            particle_b,
        }
    }
}

impl fmt::Display for BreakageEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bond type {} between particles {} and {}",
            self.bond_type, self.particle_a, self.particle_b
        )
    }
}

/// Where the queue is in its per-step cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueuePhase {
    #[default]
    Idle,
    /// Events are being appended by the strain check
    Collecting,
    /// The handler chain is consuming the events
    Draining,
}

/// Per-step buffer of breakage events
///
/// Filled while bonds are evaluated, drained exactly once by the handler
/// chain, then empty again. Local queues collected independently can be
/// merged with [`BreakageQueue::extend`] before the drain.
#[derive(Debug, Clone, Default)]
pub struct BreakageQueue {
    events: Vec<BreakageEvent>,
    phase: QueuePhase,
}

impl BreakageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: BreakageEvent) {
        self.phase = QueuePhase::Collecting;
        self.events.push(event);
    }

    /// Appends events collected elsewhere, preserving their order
    pub fn extend<I: IntoIterator<Item = BreakageEvent>>(&mut self, events: I) {
        let before = self.events.len();
        self.events.extend(events);
        if self.events.len() > before {
            self.phase = QueuePhase::Collecting;
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn phase(&self) -> QueuePhase {
        self.phase
    }

    pub fn events(&self) -> &[BreakageEvent] {
        &self.events
    }

    /// Drops every queued event without handling it
    pub fn clear(&mut self) {
        self.events.clear();
        self.phase = QueuePhase::Idle;
    }

    /// Moves the events out for draining; the queue is empty afterwards
    pub(crate) fn begin_drain(&mut self) -> Vec<BreakageEvent> {
        self.phase = QueuePhase::Draining;
        std::mem::take(&mut self.events)
    }

    pub(crate) fn finish_drain(&mut self) {
        self.phase = QueuePhase::Idle;
    }
}

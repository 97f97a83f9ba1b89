use chrono::{NaiveDateTime, TimeDelta};

use crate::queue::ElevatorQueue;
use crate::types::call::{Call, ElevatorId, Floor, GROUND_FLOOR, Sense};

/// Whether an elevator at `position`, heading `direction`, can pick up `call`
/// without turning around. An idle elevator can take anything.
pub fn is_available(position: Floor, direction: Option<Sense>, idle: bool, call: &Call) -> bool {
    if idle {
        return true;
    }
    match direction {
        Some(Sense::Upward) => call.sense() == Sense::Upward && call.floor() >= position,
        Some(Sense::Downward) => call.sense() == Sense::Downward && call.floor() <= position,
        // Only served calls left, still inside their grace period.
        None => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Elevator {
    id: ElevatorId,
    position: Floor,
    queue: ElevatorQueue,
}

impl Elevator {
    pub fn new(id: ElevatorId) -> Self {
        Self::at(id, GROUND_FLOOR)
    }

    pub fn at(id: ElevatorId, position: Floor) -> Self {
        Elevator {
            id,
            position,
            queue: ElevatorQueue::new(),
        }
    }

    pub fn id(&self) -> ElevatorId {
        self.id
    }

    pub fn position(&self) -> Floor {
        self.position
    }

    pub fn queue(&self) -> &ElevatorQueue {
        &self.queue
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn direction(&self) -> Option<Sense> {
        self.queue.direction(self.position)
    }

    pub fn next_stop(&self) -> Option<&Call> {
        self.queue.peek_next(self.position)
    }

    pub fn update_position(&mut self, floor: Floor, now: NaiveDateTime) {
        self.position = floor;
        self.queue.mark_reached(floor, now);
    }

    pub fn evict_expired(&mut self, now: NaiveDateTime, wait: TimeDelta) -> Vec<Call> {
        let evicted = self.queue.evict_expired(now, wait);
        self.queue.settle(self.position);
        evicted
    }

    pub fn is_available_for(&self, call: &Call) -> bool {
        is_available(self.position, self.direction(), self.is_idle(), call)
    }

    /// True when this elevator already has the same stop pending or is
    /// standing at it.
    pub fn absorbs(&self, call: &Call) -> bool {
        self.queue.contains(call, self.position)
    }

    pub fn accept(&mut self, call: Call) -> bool {
        self.queue.insert(call, self.position)
    }
}

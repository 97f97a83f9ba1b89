use chrono::{NaiveDateTime, TimeDelta};

use crate::types::call::{Call, Floor, Sense};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedCall {
    pub call: Call,
    /// Set when the elevator stopped at the call's floor heading its way.
    pub reached_at: Option<NaiveDateTime>,
}

/// Calls assigned to one elevator, kept in collective-control service order:
/// stops ahead in the current sweep first, then the opposite sense on the way
/// back, then whatever was left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElevatorQueue {
    entries: Vec<QueuedCall>,
    sweep: Option<Sense>,
}

impl ElevatorQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[QueuedCall] {
        &self.entries
    }

    pub fn calls(&self) -> impl Iterator<Item = &Call> {
        self.entries.iter().map(|entry| &entry.call)
    }

    pub fn sweep(&self) -> Option<Sense> {
        self.sweep
    }

    /// True when the same stop is queued and still to be served, or being
    /// served at `position`. Stops the car has already left do not count.
    pub fn contains(&self, call: &Call, position: Floor) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.call.same_stop(call) && !departed(entry, position))
    }

    /// Adds `call` in service order. Returns false when the same stop is
    /// already queued. A new press for a stop the car has left replaces it.
    pub fn insert(&mut self, call: Call, position: Floor) -> bool {
        if self.contains(&call, position) {
            return false;
        }
        self.entries.retain(|entry| !entry.call.same_stop(&call));
        if self.sweep.is_none() {
            self.sweep = Some(Sense::towards(position, call.floor()).unwrap_or(call.sense()));
        }
        self.entries.push(QueuedCall {
            call,
            reached_at: None,
        });
        self.settle(position);
        true
    }

    pub fn peek_next(&self, position: Floor) -> Option<&Call> {
        self.entries
            .first()
            .filter(|entry| !departed(entry, position))
            .map(|entry| &entry.call)
    }

    /// Direction the elevator is heading to serve its next stop.
    pub fn direction(&self, position: Floor) -> Option<Sense> {
        self.peek_next(position)
            .map(|call| Sense::towards(position, call.floor()).unwrap_or(call.sense()))
    }

    pub fn mark_reached(&mut self, position: Floor, now: NaiveDateTime) {
        self.settle(position);
        let Some(heading) = self.direction(position) else {
            return;
        };
        for entry in &mut self.entries {
            if entry.reached_at.is_none()
                && entry.call.floor() == position
                && entry.call.sense() == heading
            {
                entry.reached_at = Some(now);
            }
        }
        self.settle(position);
    }

    /// Drops reached calls whose grace period is over and returns them.
    pub fn evict_expired(&mut self, now: NaiveDateTime, wait: TimeDelta) -> Vec<Call> {
        let (expired, kept): (Vec<_>, Vec<_>) = self
            .entries
            .drain(..)
            .partition(|entry| entry.reached_at.is_some_and(|at| now - at >= wait));
        self.entries = kept;
        expired.into_iter().map(|entry| entry.call).collect()
    }

    /// Re-sorts for `position` and turns the sweep around once nothing is
    /// left ahead of it.
    pub fn settle(&mut self, position: Floor) {
        self.sort(position);
        let Some(sweep) = self.sweep else {
            return;
        };
        let next_sweep = match self.entries.first() {
            None => None,
            Some(lead) if departed(lead, position) => None,
            Some(lead)
                if lead.reached_at.is_none() && !ahead(sweep, lead.call.floor(), position) =>
            {
                Some(sweep.reversed())
            }
            Some(_) => Some(sweep),
        };
        if next_sweep != self.sweep {
            self.sweep = next_sweep;
            self.sort(position);
        }
    }

    fn sort(&mut self, position: Floor) {
        let sweep = self.sweep;
        self.entries
            .sort_by_key(|entry| service_rank(entry, sweep, position));
    }
}

fn ahead(sweep: Sense, floor: Floor, position: Floor) -> bool {
    match sweep {
        Sense::Upward => floor >= position,
        Sense::Downward => floor <= position,
    }
}

fn departed(entry: &QueuedCall, position: Floor) -> bool {
    entry.reached_at.is_some() && entry.call.floor() != position
}

fn service_rank(entry: &QueuedCall, sweep: Option<Sense>, position: Floor) -> (u8, i16) {
    if entry.reached_at.is_some() {
        return if departed(entry, position) { (4, 0) } else { (0, 0) };
    }
    let floor = i16::from(entry.call.floor());
    let along = |sense: Sense| match sense {
        Sense::Upward => floor,
        Sense::Downward => -floor,
    };
    let sweep = sweep.unwrap_or(entry.call.sense());
    if entry.call.sense() != sweep {
        (2, along(sweep.reversed()))
    } else if ahead(sweep, entry.call.floor(), position) {
        (1, along(sweep))
    } else {
        (3, along(sweep))
    }
}

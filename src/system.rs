use std::collections::VecDeque;

use chrono::TimeDelta;
use log::{debug, info, warn};

use crate::config::SystemConfig;
use crate::elevator::Elevator;
use crate::error::Result;
use crate::strategies::NearestAvailable;
use crate::strategy::{Elevators, Strategy};
use crate::types::call::{Call, ElevatorId, Floor, Origin};
use crate::types::request::{RawRequest, Request};
use crate::types::snapshot::{ElevatorSnapshot, SystemSnapshot};

/// A bank of elevators plus the hall calls nobody could take yet.
#[derive(Debug, Clone)]
pub struct ElevatorSystem<ST = NearestAvailable> {
    elevators: Elevators,
    pending: VecDeque<Call>,
    n_floors: Floor,
    wait: TimeDelta,
    strategy: ST,
}

impl ElevatorSystem {
    pub fn new(elevator_count: u32, n_floors: Floor, wait: TimeDelta) -> Self {
        Self::with_strategy(elevator_count, n_floors, wait, NearestAvailable)
    }

    pub fn from_config(config: &SystemConfig) -> Self {
        Self::new(config.elevators, config.floors, config.wait())
    }
}

impl<ST: Strategy> ElevatorSystem<ST> {
    pub fn with_strategy(
        elevator_count: u32,
        n_floors: Floor,
        wait: TimeDelta,
        strategy: ST,
    ) -> Self {
        ElevatorSystem {
            elevators: (0..elevator_count).map(|id| (id, Elevator::new(id))).collect(),
            pending: VecDeque::new(),
            n_floors,
            wait,
            strategy,
        }
    }

    pub fn n_floors(&self) -> Floor {
        self.n_floors
    }

    pub fn wait(&self) -> TimeDelta {
        self.wait
    }

    pub fn elevator(&self, id: ElevatorId) -> Option<&Elevator> {
        self.elevators.get(&id)
    }

    pub fn elevators(&self) -> impl Iterator<Item = &Elevator> {
        self.elevators.values()
    }

    pub fn pending(&self) -> impl Iterator<Item = &Call> {
        self.pending.iter()
    }

    pub fn snapshot(&self) -> SystemSnapshot {
        SystemSnapshot {
            elevators: self.elevators.values().map(ElevatorSnapshot::from).collect(),
            pending: self.pending.iter().cloned().collect(),
        }
    }

    /// Validates `raw` against this building without touching any state.
    pub fn validate(&self, raw: &RawRequest) -> Result<Request> {
        let count = u32::try_from(self.elevators.len()).unwrap_or(u32::MAX);
        Request::from_raw(raw, count, self.n_floors)
    }

    /// Applies one request: positions, grace-period eviction, routing of the
    /// carried call, then a retry of every pending call. A rejected request
    /// changes nothing.
    pub fn take_request(&mut self, raw: &RawRequest) -> Result<()> {
        let request = self.validate(raw).inspect_err(|e| warn!("request rejected: {e}"))?;
        self.apply(request);
        Ok(())
    }

    fn apply(&mut self, request: Request) {
        let now = request.timestamp();
        for (id, &floor) in request.positions() {
            if let Some(elevator) = self.elevators.get_mut(id) {
                elevator.update_position(floor, now);
            }
        }

        for elevator in self.elevators.values_mut() {
            for call in elevator.evict_expired(now, self.wait) {
                debug!("elevator {} cleared {call}", elevator.id());
            }
        }

        if let Request::Call { call, .. } = request {
            match call.origin() {
                Origin::Inside(id) => self.route_inside(id, call),
                Origin::Outside => self.route_outside(call),
            }
        }

        self.retry_pending();
    }

    fn route_inside(&mut self, id: ElevatorId, call: Call) {
        let Some(elevator) = self.elevators.get_mut(&id) else {
            warn!("inside call {call} for unknown elevator {id}");
            return;
        };
        match elevator.direction() {
            Some(direction) if direction != call.sense() => {
                info!("elevator {id} heading {direction}, dropped {call}");
            }
            _ => {
                if elevator.accept(call.clone()) {
                    info!("elevator {id} took {call}");
                }
            }
        }
    }

    fn route_outside(&mut self, call: Call) {
        let duplicate = self.pending.iter().any(|queued| queued.same_stop(&call))
            || self.elevators.values().any(|elevator| elevator.absorbs(&call));
        if duplicate {
            debug!("{call} already being served");
            return;
        }
        if !self.assign(&call) {
            debug!("no elevator available for {call}, pending");
            self.pending.push_back(call);
        }
    }

    /// Hands `call` to the elevator the strategy selects. False if none can take it.
    fn assign(&mut self, call: &Call) -> bool {
        let Some(id) = self.strategy.select(&self.elevators, call) else {
            return false;
        };
        let Some(elevator) = self.elevators.get_mut(&id) else {
            return false;
        };
        if elevator.accept(call.clone()) {
            info!("elevator {id} at floor {} took {call}", elevator.position());
        }
        true
    }

    fn retry_pending(&mut self) {
        let mut still_pending = VecDeque::with_capacity(self.pending.len());
        while let Some(call) = self.pending.pop_front() {
            if !self.assign(&call) {
                still_pending.push_back(call);
            }
        }
        self.pending = still_pending;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::call::{CallType, RawCall, Sense};
    use chrono::{NaiveDate, NaiveDateTime};
    use std::collections::BTreeMap;

    fn at(secs: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2022, 5, 13)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
            + TimeDelta::seconds(secs)
    }

    fn system() -> ElevatorSystem {
        ElevatorSystem::new(3, 10, TimeDelta::seconds(10))
    }

    fn raw(secs: i64, state: [i64; 3], call: Option<RawCall>) -> RawRequest {
        RawRequest {
            timestamp: at(secs).format(crate::types::request::TIMESTAMP_FORMAT).to_string(),
            call,
            state: state
                .iter()
                .enumerate()
                .map(|(id, &floor)| (id.to_string(), floor))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn out(floor: i64, sense: Sense) -> Option<RawCall> {
        Some(RawCall {
            floor,
            sense,
            call_type: CallType::Out,
            elevator_id: None,
        })
    }

    fn inside(id: ElevatorId, floor: i64, sense: Sense) -> Option<RawCall> {
        Some(RawCall {
            floor,
            sense,
            call_type: CallType::In,
            elevator_id: Some(id),
        })
    }

    #[test]
    fn starts_idle_on_ground_floor() {
        let system = system();
        assert_eq!(system.elevators().count(), 3);
        assert!(system.elevators().all(|e| e.position() == 1 && e.is_idle()));
        assert_eq!(system.pending().count(), 0);
    }

    #[test]
    fn positions_are_copied_from_state() {
        let mut system = system();
        system.take_request(&raw(0, [10, 2, 5], None)).unwrap();
        let floors: Vec<_> = system.elevators().map(Elevator::position).collect();
        assert_eq!(floors, vec![10, 2, 5]);
    }

    #[test]
    fn outside_call_goes_to_nearest() {
        let mut system = system();
        system
            .take_request(&raw(0, [5, 3, 10], out(2, Sense::Upward)))
            .unwrap();
        assert_eq!(system.snapshot().queued_floors(1), vec![2]);
        assert!(system.snapshot().queued_floors(0).is_empty());
    }

    #[test]
    fn rejected_request_changes_nothing() {
        let mut system = system();
        system
            .take_request(&raw(0, [4, 4, 4], out(6, Sense::Upward)))
            .unwrap();
        let before = system.snapshot();

        let bad = raw(5, [9, 9, 9], out(10, Sense::Upward));
        assert!(system.take_request(&bad).is_err());
        let bad = raw(5, [9, 9, 9], inside(7, 3, Sense::Downward));
        assert!(system.take_request(&bad).is_err());

        assert_eq!(system.snapshot(), before);
    }

    #[test]
    fn opposing_inside_call_is_dropped() {
        let mut system = system();
        system
            .take_request(&raw(0, [1, 1, 1], inside(0, 6, Sense::Upward)))
            .unwrap();
        let before = system.snapshot();

        system
            .take_request(&raw(1, [1, 1, 1], inside(0, 3, Sense::Downward)))
            .unwrap();
        assert_eq!(system.snapshot(), before);
    }

    #[test]
    fn inside_call_never_goes_pending() {
        let mut system = system();
        system
            .take_request(&raw(0, [3, 3, 3], inside(2, 7, Sense::Upward)))
            .unwrap();
        assert_eq!(system.snapshot().queued_floors(2), vec![7]);
        assert_eq!(system.pending().count(), 0);
    }

    #[test]
    fn unassignable_call_waits_then_gets_picked_up() {
        let mut system = ElevatorSystem::new(1, 10, TimeDelta::seconds(10));
        let one = |secs, floor, call| RawRequest {
            timestamp: at(secs).format(crate::types::request::TIMESTAMP_FORMAT).to_string(),
            call,
            state: BTreeMap::from([("0".to_string(), floor)]),
        };

        system.take_request(&one(0, 1, out(8, Sense::Upward))).unwrap();
        system.take_request(&one(1, 2, out(3, Sense::Downward))).unwrap();
        assert_eq!(system.pending().map(Call::floor).collect::<Vec<_>>(), vec![3]);
        assert_eq!(system.snapshot().queued_floors(0), vec![8]);

        system.take_request(&one(20, 8, None)).unwrap();
        assert_eq!(system.pending().count(), 1);

        system.take_request(&one(31, 8, None)).unwrap();
        assert_eq!(system.pending().count(), 0);
        assert_eq!(system.snapshot().queued_floors(0), vec![3]);
    }

    #[test]
    fn pending_keeps_arrival_order() {
        let mut system = ElevatorSystem::new(1, 10, TimeDelta::seconds(10));
        let one = |secs, call| RawRequest {
            timestamp: at(secs).format(crate::types::request::TIMESTAMP_FORMAT).to_string(),
            call,
            state: BTreeMap::from([("0".to_string(), 5)]),
        };

        system.take_request(&one(0, out(9, Sense::Downward))).unwrap();
        system.take_request(&one(1, out(2, Sense::Upward))).unwrap();
        system.take_request(&one(2, out(4, Sense::Upward))).unwrap();
        system.take_request(&one(3, None)).unwrap();

        let pending: Vec<_> = system.pending().map(Call::floor).collect();
        assert_eq!(pending, vec![2, 4]);
    }

    #[test]
    fn repeated_hall_press_is_absorbed() {
        let mut system = system();
        system
            .take_request(&raw(0, [1, 1, 1], out(6, Sense::Downward)))
            .unwrap();
        system
            .take_request(&raw(1, [1, 1, 1], out(6, Sense::Downward)))
            .unwrap();

        let snapshot = system.snapshot();
        let total: usize = snapshot.elevators.iter().map(|e| e.calls.len()).sum();
        assert_eq!(total, 1);
        assert!(snapshot.pending.is_empty());
    }

    #[test]
    fn hall_press_after_car_left_is_routed_again() {
        let mut system = ElevatorSystem::new(1, 10, TimeDelta::seconds(10));
        let one = |secs, floor, call| RawRequest {
            timestamp: at(secs).format(crate::types::request::TIMESTAMP_FORMAT).to_string(),
            call,
            state: BTreeMap::from([("0".to_string(), floor)]),
        };

        system.take_request(&one(0, 1, out(5, Sense::Downward))).unwrap();
        system.take_request(&one(10, 5, None)).unwrap();
        system.take_request(&one(11, 5, inside(0, 2, Sense::Downward))).unwrap();
        system.take_request(&one(12, 4, None)).unwrap();

        // The car has left floor 5; someone presses 5-down again.
        system.take_request(&one(13, 4, out(5, Sense::Downward))).unwrap();
        let pending: Vec<_> = system.pending().map(Call::floor).collect();
        assert_eq!(pending, vec![5]);

        system.take_request(&one(25, 3, None)).unwrap();
        assert_eq!(system.snapshot().queued_floors(0), vec![2]);
        assert_eq!(system.pending().count(), 1);

        system.take_request(&one(26, 2, None)).unwrap();
        system.take_request(&one(37, 2, None)).unwrap();
        assert_eq!(system.pending().count(), 0);
        assert_eq!(system.snapshot().queued_floors(0), vec![5]);
    }
}

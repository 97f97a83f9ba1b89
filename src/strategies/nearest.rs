use crate::strategy::{Elevators, Strategy};
use crate::types::call::{Call, ElevatorId};

/// Closest elevator that can take the call without reversing. Ties go to the
/// lowest id.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestAvailable;

impl Strategy for NearestAvailable {
    fn select(&self, elevators: &Elevators, call: &Call) -> Option<ElevatorId> {
        elevators
            .values()
            .filter(|elevator| elevator.is_available_for(call))
            .min_by_key(|elevator| (elevator.position().abs_diff(call.floor()), elevator.id()))
            .map(|elevator| elevator.id())
    }
}

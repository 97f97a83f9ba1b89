use std::fmt;

use serde::Serialize;

use crate::elevator::Elevator;
use crate::types::call::{Call, ElevatorId, Floor, Sense};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElevatorSnapshot {
    pub id: ElevatorId,
    pub floor: Floor,
    pub direction: Option<Sense>,
    /// Queue in service order.
    pub calls: Vec<Call>,
}

impl From<&Elevator> for ElevatorSnapshot {
    fn from(elevator: &Elevator) -> Self {
        ElevatorSnapshot {
            id: elevator.id(),
            floor: elevator.position(),
            direction: elevator.direction(),
            calls: elevator.queue().calls().cloned().collect(),
        }
    }
}

/// Observable state of the whole bank after a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemSnapshot {
    pub elevators: Vec<ElevatorSnapshot>,
    pub pending: Vec<Call>,
}

impl SystemSnapshot {
    pub fn elevator(&self, id: ElevatorId) -> Option<&ElevatorSnapshot> {
        self.elevators.iter().find(|elevator| elevator.id == id)
    }

    /// Floors queued at `id`, in service order.
    pub fn queued_floors(&self, id: ElevatorId) -> Vec<Floor> {
        self.elevator(id)
            .map(|elevator| elevator.calls.iter().map(Call::floor).collect())
            .unwrap_or_default()
    }
}

/// One `"<id>: [<floor>, ...]"` line per elevator.
impl fmt::Display for SystemSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for elevator in &self.elevators {
            let floors = elevator
                .calls
                .iter()
                .map(|call| call.floor().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(f, "{}: [{floors}]", elevator.id)?;
        }
        Ok(())
    }
}

use std::collections::BTreeMap;

use crate::elevator::Elevator;
use crate::types::call::{Call, ElevatorId};

pub type Elevators = BTreeMap<ElevatorId, Elevator>;

/// Picks which elevator should take an outside call, if any can.
pub trait Strategy {
    fn select(&self, elevators: &Elevators, call: &Call) -> Option<ElevatorId>;
}

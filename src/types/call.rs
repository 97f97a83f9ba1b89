use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result};

pub type Floor = u8;
pub type ElevatorId = u32;

/// Lowest floor of every building.
pub const GROUND_FLOOR: Floor = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sense {
    Upward,
    Downward,
}

impl Sense {
    pub fn reversed(self) -> Sense {
        match self {
            Sense::Upward => Sense::Downward,
            Sense::Downward => Sense::Upward,
        }
    }

    /// Sense of travel needed to get from `from` to `to`, if they differ.
    pub fn towards(from: Floor, to: Floor) -> Option<Sense> {
        match to.cmp(&from) {
            std::cmp::Ordering::Greater => Some(Sense::Upward),
            std::cmp::Ordering::Less => Some(Sense::Downward),
            std::cmp::Ordering::Equal => None,
        }
    }
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sense::Upward => write!(f, "upward"),
            Sense::Downward => write!(f, "downward"),
        }
    }
}

/// Wire literal for where a call was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallType {
    #[serde(rename = "in")]
    In,
    #[serde(rename = "out")]
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "call_type", content = "elevator_id")]
pub enum Origin {
    /// Cab panel of the given elevator.
    #[serde(rename = "in")]
    Inside(ElevatorId),
    /// Hall button, no elevator in particular.
    #[serde(rename = "out")]
    Outside,
}

/// Call payload as it arrives on the wire, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCall {
    pub floor: i64,
    pub sense: Sense,
    pub call_type: CallType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevator_id: Option<ElevatorId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Call {
    floor: Floor,
    sense: Sense,
    #[serde(flatten)]
    origin: Origin,
    timestamp: NaiveDateTime,
}

impl Call {
    pub fn new(
        floor: i64,
        sense: Sense,
        origin: Origin,
        timestamp: NaiveDateTime,
        n_floors: Floor,
    ) -> Result<Call> {
        let floor = Floor::try_from(floor)
            .ok()
            .filter(|f| (GROUND_FLOOR..=n_floors).contains(f))
            .ok_or_else(|| {
                DispatchError::invalid_call(format!(
                    "floor {floor} outside {GROUND_FLOOR}..={n_floors}"
                ))
            })?;

        match sense {
            Sense::Downward if floor == GROUND_FLOOR => {
                return Err(DispatchError::invalid_call(format!(
                    "cannot go downward from floor {floor}"
                )));
            }
            Sense::Upward if floor == n_floors => {
                return Err(DispatchError::invalid_call(format!(
                    "cannot go upward from top floor {floor}"
                )));
            }
            _ => {}
        }

        Ok(Call {
            floor,
            sense,
            origin,
            timestamp,
        })
    }

    pub fn outside(
        floor: i64,
        sense: Sense,
        timestamp: NaiveDateTime,
        n_floors: Floor,
    ) -> Result<Call> {
        Call::new(floor, sense, Origin::Outside, timestamp, n_floors)
    }

    pub fn inside(
        elevator_id: ElevatorId,
        floor: i64,
        sense: Sense,
        timestamp: NaiveDateTime,
        n_floors: Floor,
    ) -> Result<Call> {
        Call::new(floor, sense, Origin::Inside(elevator_id), timestamp, n_floors)
    }

    pub fn from_raw(raw: &RawCall, timestamp: NaiveDateTime, n_floors: Floor) -> Result<Call> {
        let origin = match (raw.call_type, raw.elevator_id) {
            (CallType::In, Some(id)) => Origin::Inside(id),
            (CallType::In, None) => {
                return Err(DispatchError::invalid_call(
                    "inside call without elevator_id",
                ));
            }
            // The wire format lets hall calls carry a stray id; it means nothing.
            (CallType::Out, _) => Origin::Outside,
        };
        Call::new(raw.floor, raw.sense, origin, timestamp, n_floors)
    }

    pub fn floor(&self) -> Floor {
        self.floor
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn is_inside(&self) -> bool {
        matches!(self.origin, Origin::Inside(_))
    }

    /// Two calls for the same stop in the same sense are the same request.
    pub fn same_stop(&self, other: &Call) -> bool {
        self.floor == other.floor && self.sense == other.sense
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.origin {
            Origin::Inside(id) => write!(f, "in@{id} {}-{}", self.floor, self.sense),
            Origin::Outside => write!(f, "out {}-{}", self.floor, self.sense),
        }
    }
}

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result};
use crate::types::call::{Call, ElevatorId, Floor, GROUND_FLOOR, Origin, RawCall};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One request exactly as it appears in a trace or datagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRequest {
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call: Option<RawCall>,
    pub state: BTreeMap<String, i64>,
}

impl TryFrom<&[u8]> for RawRequest {
    type Error = DispatchError;

    fn try_from(value: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(value)?)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TraceFile {
    Wrapped { data: Vec<RawRequest> },
    Bare(Vec<RawRequest>),
}

/// Reads a recorded request sequence, either `{"data": [...]}` or a bare array.
pub fn parse_trace(raw: &str) -> Result<Vec<RawRequest>> {
    let trace: TraceFile = serde_json::from_str(raw)?;
    Ok(match trace {
        TraceFile::Wrapped { data } => data,
        TraceFile::Bare(requests) => requests,
    })
}

pub type Positions = BTreeMap<ElevatorId, Floor>;

/// A request that passed validation against the configured building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Positions {
        timestamp: NaiveDateTime,
        positions: Positions,
    },
    Call {
        timestamp: NaiveDateTime,
        positions: Positions,
        call: Call,
    },
}

impl Request {
    /// Validates `raw` for a building with elevators `0..elevator_count`
    /// and floors `1..=n_floors`. Nothing is applied on failure.
    pub fn from_raw(raw: &RawRequest, elevator_count: u32, n_floors: Floor) -> Result<Request> {
        let timestamp = parse_timestamp(&raw.timestamp)?;

        let mut positions = Positions::new();
        for (key, &floor) in &raw.state {
            let id: ElevatorId = key.trim().parse().map_err(|_| {
                DispatchError::malformed(format!("elevator id '{key}' is not a number"))
            })?;
            if id >= elevator_count {
                return Err(DispatchError::UnknownElevator(id));
            }
            let floor = Floor::try_from(floor)
                .ok()
                .filter(|f| (GROUND_FLOOR..=n_floors).contains(f))
                .ok_or_else(|| {
                    DispatchError::malformed(format!("elevator {id} reported floor {floor}"))
                })?;
            if positions.insert(id, floor).is_some() {
                return Err(DispatchError::malformed(format!(
                    "elevator {id} listed twice in state"
                )));
            }
        }
        if let Some(missing) = (0..elevator_count).find(|id| !positions.contains_key(id)) {
            return Err(DispatchError::malformed(format!(
                "state has no floor for elevator {missing}"
            )));
        }

        let Some(raw_call) = &raw.call else {
            return Ok(Request::Positions {
                timestamp,
                positions,
            });
        };
        let call = Call::from_raw(raw_call, timestamp, n_floors)?;
        if let Origin::Inside(id) = call.origin() {
            if id >= elevator_count {
                return Err(DispatchError::UnknownElevator(id));
            }
        }
        Ok(Request::Call {
            timestamp,
            positions,
            call,
        })
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        match self {
            Request::Positions { timestamp, .. } | Request::Call { timestamp, .. } => *timestamp,
        }
    }

    pub fn positions(&self) -> &Positions {
        match self {
            Request::Positions { positions, .. } | Request::Call { positions, .. } => positions,
        }
    }

    pub fn call(&self) -> Option<&Call> {
        match self {
            Request::Positions { .. } => None,
            Request::Call { call, .. } => Some(call),
        }
    }
}

pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT).map_err(|e| {
        DispatchError::malformed(format!("timestamp '{raw}' is not {TIMESTAMP_FORMAT}: {e}"))
    })
}

pub mod config;
pub mod elevator;
pub mod error;
pub mod queue;
pub mod replay;
pub mod services;
pub mod strategies;
pub mod strategy;
pub mod system;
pub mod types;

pub use config::{Config, SystemConfig, load_config};
pub use elevator::{Elevator, is_available};
pub use error::{DispatchError, Result};
pub use queue::{ElevatorQueue, QueuedCall};
pub use replay::{replay, verify};
pub use services::{DecodeLayer, DispatchService};
pub use strategies::NearestAvailable;
pub use strategy::Strategy;
pub use system::ElevatorSystem;
pub use types::call::{Call, CallType, ElevatorId, Floor, Origin, RawCall, Sense};
pub use types::request::{RawRequest, Request, parse_trace};
pub use types::snapshot::{ElevatorSnapshot, SystemSnapshot};

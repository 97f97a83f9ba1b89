pub mod decode;
pub mod dispatch;

pub use decode::{DecodeLayer, DecodeService};
pub use dispatch::{DispatchService, SharedSystem};

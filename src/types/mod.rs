pub mod call;
pub mod request;
pub mod snapshot;

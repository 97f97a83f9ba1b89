pub mod nearest;

pub use nearest::NearestAvailable;

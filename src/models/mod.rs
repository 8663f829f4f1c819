pub mod filter;
pub mod location;
pub mod reading;

pub use filter::{AveragingWindow, FilterSettings};
pub use location::{Coordinate, Location, ResolvedLocation};
pub use reading::Reading;

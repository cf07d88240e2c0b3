pub mod coordinate;
pub mod geo;
pub mod route;
pub mod traffic;
pub mod trip;
pub mod view;

pub use coordinate::{Coordinate, CoordinateError};
pub use geo::distance_km;
pub use traffic::{traffic_level, TrafficLevel};
pub use trip::{TimeOfDay, TravelMode};

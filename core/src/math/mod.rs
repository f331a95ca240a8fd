pub mod geo;
pub mod stats;
pub mod window;

pub use geo::{haversine_distance_m, heading_deg, wrap_turn_deg};
pub use stats::{angle_to_ratio, ratio_to_angle, StatsHelper, INFINITE_GLIDE_RATIO};
pub use window::RingWindow;

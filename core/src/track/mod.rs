pub mod parser;
pub mod sample;
pub mod sanity;

pub use parser::{parse_track, IgcParser};
pub use sample::{AltitudeSource, Sample, Track};
pub use sanity::{check_sanity, SanityCode};

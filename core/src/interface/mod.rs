pub mod record;
pub mod series;

pub use record::{GlideRecord, WingSummary};
pub use series::SeriesReport;

use crate::workflow::runner::FlightStatus;
use std::fmt;
use std::sync::Mutex;

pub struct BatchMetrics {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub analysed: usize,
    pub no_glide: usize,
    pub parse_failures: usize,
    pub sanity_failures: usize,
    pub io_failures: usize,
}

impl MetricsSnapshot {
    pub fn total(&self) -> usize {
        self.analysed + self.no_glide + self.parse_failures + self.sanity_failures + self.io_failures
    }
}

impl fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} flights: {} analysed, {} without glide, {} unparsable, {} insane, {} unreadable",
            self.total(),
            self.analysed,
            self.no_glide,
            self.parse_failures,
            self.sanity_failures,
            self.io_failures
        )
    }
}

impl BatchMetrics {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record(&self, status: &FlightStatus) {
        if let Ok(mut metrics) = self.inner.lock() {
            match status {
                FlightStatus::Analysed { .. } => metrics.analysed += 1,
                FlightStatus::NoGlide => metrics.no_glide += 1,
                FlightStatus::ParseFailed { .. } => metrics.parse_failures += 1,
                FlightStatus::SanityFailed { .. } => metrics.sanity_failures += 1,
                FlightStatus::IoFailed { .. } => metrics.io_failures += 1,
            }
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for BatchMetrics {
    fn default() -> Self {
        Self::new()
    }
}

//! Causal sliding-window statistics over the kinematics series.
//!
//! All three quantities share one frame length `F`. For step `i < F` the
//! window is still filling (bootstrap) and reaches back to the first fix;
//! from `i >= F` on it covers the last `F` steps.

use crate::math::geo::haversine_distance_m;
use crate::math::window::RingWindow;
use crate::prelude::{AnalysisResult, ProcessingStage};
use crate::processing::kinematics::Kinematics;
use crate::telemetry::StageLogger;
use crate::track::Track;

/// Running mean updated in O(1) per value.
///
/// While filling, `denominator` counts the values seen. Once full it stays at
/// the window width and the mean creeps by `(new - leaving) / width`, which
/// drifts slightly from a recomputed average over long tracks.
#[derive(Debug, Clone)]
pub struct SweepingMean {
    value: f64,
    denominator: usize,
    window: RingWindow<f64>,
}

impl SweepingMean {
    pub fn new(frame_len: usize) -> Self {
        Self {
            value: 0.0,
            denominator: 0,
            window: RingWindow::with_width(frame_len),
        }
    }

    pub fn push(&mut self, sample: f64) -> f64 {
        match self.window.push(sample) {
            Some(leaving) => {
                self.value += (sample - leaving) / self.denominator as f64;
            }
            None => {
                self.denominator += 1;
                let n = self.denominator as f64;
                self.value = (self.value * (n - 1.0) + sample) / n;
            }
        }
        self.value
    }

    pub fn denominator(&self) -> usize {
        self.denominator
    }
}

/// Windowed turn total normalized by the window's elapsed time.
#[derive(Debug, Clone)]
pub struct TurnRateWindow {
    total: f64,
    span: f64,
    window: RingWindow<f64>,
}

impl TurnRateWindow {
    pub fn new(frame_len: usize) -> Self {
        Self {
            total: 0.0,
            span: 0.0,
            window: RingWindow::with_width(frame_len),
        }
    }

    /// Adds `turn` (degrees) and returns the rate over `span` seconds.
    pub fn push(&mut self, turn: f64, span: f64) -> f64 {
        match self.window.push(turn) {
            Some(leaving) => self.total += turn - leaving,
            None => self.total += turn,
        }
        self.span = span;
        self.rate()
    }

    /// Degrees per second; zero while the window spans no time.
    pub fn rate(&self) -> f64 {
        if self.span > 0.0 {
            self.total / self.span
        } else {
            0.0
        }
    }
}

/// Smoothed series, one entry per track step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SmoothedSeries {
    pub frame_len: usize,
    pub glide_angles: Vec<f64>,
    /// Degrees per second.
    pub turn_rates: Vec<f64>,
    /// Net displacement speed across the window, m/s.
    pub straight_line_speeds: Vec<f64>,
}

impl SmoothedSeries {
    pub fn len(&self) -> usize {
        self.glide_angles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glide_angles.is_empty()
    }
}

pub struct SmoothingStage {
    frame_len: usize,
}

impl SmoothingStage {
    pub fn new(frame_len: usize) -> Self {
        Self {
            frame_len: frame_len.max(1),
        }
    }

    /// Frame length derived from the track's own sampling interval.
    pub fn for_track(track: &Track, frame_len_sec: f64) -> Self {
        Self::new(track.samples_for(frame_len_sec))
    }

    pub fn frame_len(&self) -> usize {
        self.frame_len
    }
}

impl<'a> ProcessingStage<'a> for SmoothingStage {
    type Input = (&'a Track, &'a Kinematics);
    type Output = SmoothedSeries;

    fn name(&self) -> &'static str {
        "smoothing"
    }

    fn execute(&self, (track, kinematics): Self::Input) -> AnalysisResult<SmoothedSeries> {
        let samples = track.samples();
        let frame = self.frame_len;
        let steps = kinematics.len();
        // A frame longer than the track never leaves bootstrap.
        let width = frame.min(steps).max(1);

        let mut glide = SweepingMean::new(width);
        let mut turn = TurnRateWindow::new(width);
        let mut out = SmoothedSeries {
            frame_len: frame,
            glide_angles: Vec::with_capacity(steps),
            turn_rates: Vec::with_capacity(steps),
            straight_line_speeds: Vec::with_capacity(steps),
        };

        for i in 0..steps {
            let head = &samples[i + 1];
            // Oldest fix inside the window ending at step i.
            let anchor = &samples[if i < frame { 0 } else { i + 1 - frame }];
            let span = (head.timestamp - anchor.timestamp) as f64;

            out.glide_angles.push(glide.push(kinematics.glide_angles[i]));
            out.turn_rates.push(turn.push(kinematics.turns[i], span));

            let displacement = haversine_distance_m(
                anchor.latitude,
                anchor.longitude,
                head.latitude,
                head.longitude,
            );
            out.straight_line_speeds
                .push(if span > 0.0 { displacement / span } else { 0.0 });
        }

        StageLogger::for_stage(self).record(&format!(
            "frame of {} samples over {} steps{}",
            frame,
            steps,
            if steps <= frame { " (bootstrap only)" } else { "" }
        ));
        Ok(out)
    }
}

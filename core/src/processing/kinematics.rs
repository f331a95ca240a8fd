use crate::math::geo::{haversine_distance_m, heading_deg, wrap_turn_deg};
use crate::prelude::{AnalysisResult, ProcessingStage};
use crate::telemetry::StageLogger;
use crate::track::{AltitudeSource, Track};

/// Horizontal distance floor, meters. Keeps the glide-angle ratio finite.
pub const MIN_HORIZONTAL_DISTANCE_M: f64 = 1e-7;

/// Per-step kinematics; entry `i` describes the move from sample `i` to `i + 1`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Kinematics {
    /// Seconds since the first fix, taken at the end of each step.
    pub timestamps: Vec<i64>,
    pub headings: Vec<f64>,
    pub turns: Vec<f64>,
    /// Clamped to [`MIN_HORIZONTAL_DISTANCE_M`].
    pub horizontal_distances: Vec<f64>,
    pub glide_angles: Vec<f64>,
    /// Running sum of unclamped step distances, one entry per sample.
    pub cumulative_distance: Vec<f64>,
}

impl Kinematics {
    pub fn len(&self) -> usize {
        self.glide_angles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glide_angles.is_empty()
    }
}

/// Derives heading, turn, distance and glide angle for each consecutive pair.
pub struct KinematicsStage {
    source: AltitudeSource,
}

impl KinematicsStage {
    pub fn new(source: AltitudeSource) -> Self {
        Self { source }
    }
}

impl<'a> ProcessingStage<'a> for KinematicsStage {
    type Input = &'a Track;
    type Output = Kinematics;

    fn name(&self) -> &'static str {
        "kinematics"
    }

    fn execute(&self, track: &'a Track) -> AnalysisResult<Kinematics> {
        let samples = track.samples();
        let steps = samples.len().saturating_sub(1);
        let mut out = Kinematics {
            timestamps: Vec::with_capacity(steps),
            headings: Vec::with_capacity(steps),
            turns: Vec::with_capacity(steps),
            horizontal_distances: Vec::with_capacity(steps),
            glide_angles: Vec::with_capacity(steps),
            cumulative_distance: Vec::with_capacity(samples.len()),
        };
        out.cumulative_distance.push(0.0);

        let start = samples[0].timestamp;
        let mut travelled = 0.0;
        let mut heading = 0.0;
        for pair in samples.windows(2) {
            let (from, to) = (&pair[0], &pair[1]);
            let distance =
                haversine_distance_m(from.latitude, from.longitude, to.latitude, to.longitude);
            travelled += distance;
            out.cumulative_distance.push(travelled);
            let distance = distance.max(MIN_HORIZONTAL_DISTANCE_M);

            let previous = heading;
            heading = heading_deg(to.latitude - from.latitude, to.longitude - from.longitude);
            out.headings.push(heading);
            out.turns.push(wrap_turn_deg(heading, previous));

            let climb = (to.altitude(self.source) - from.altitude(self.source)) as f64;
            out.glide_angles.push((climb / distance).atan().to_degrees());
            out.horizontal_distances.push(distance);
            out.timestamps.push(to.timestamp - start);
        }

        StageLogger::for_stage(self).record(&format!(
            "{} steps over {:.0} m ({:?} altitude)",
            out.len(),
            travelled,
            self.source
        ));
        Ok(out)
    }
}

use log::{debug, info};

use crate::prelude::ProcessingStage;

/// Stage-scoped diagnostics routed through the `log` facade.
pub struct StageLogger {
    stage: &'static str,
}

impl StageLogger {
    pub fn new(stage: &'static str) -> Self {
        Self { stage }
    }

    /// Tags messages with the stage's own name.
    pub fn for_stage<'a, S: ProcessingStage<'a>>(stage: &S) -> Self {
        Self::new(stage.name())
    }

    pub fn stage(&self) -> &'static str {
        self.stage
    }

    pub fn record(&self, message: &str) {
        debug!("[{}] {}", self.stage, message);
    }

    /// Noteworthy but expected events, such as an altitude-channel fallback.
    pub fn notice(&self, message: &str) {
        info!("[{}] {}", self.stage, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::AnalysisConfig;
    use crate::processing::classifier::{GlideThresholds, SegmentClassifier};
    use crate::processing::estimator::RatioEstimator;
    use crate::processing::kinematics::KinematicsStage;
    use crate::processing::smoothing::SmoothingStage;
    use crate::track::AltitudeSource;

    #[test]
    fn stage_loggers_carry_stage_names() {
        let thresholds = GlideThresholds::from_config(&AnalysisConfig::default());
        let tags = [
            StageLogger::for_stage(&KinematicsStage::new(AltitudeSource::Barometric)).stage(),
            StageLogger::for_stage(&SmoothingStage::new(4)).stage(),
            StageLogger::for_stage(&SegmentClassifier::new(thresholds, 2)).stage(),
            StageLogger::for_stage(&RatioEstimator).stage(),
        ];
        assert_eq!(tags, ["kinematics", "smoothing", "classifier", "estimator"]);
    }
}

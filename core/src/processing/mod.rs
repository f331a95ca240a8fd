pub mod classifier;
pub mod estimator;
pub mod kinematics;
pub mod pipeline;
pub mod smoothing;

pub use classifier::{filter_short_runs, GlideMask, GlideThresholds, SegmentClassifier};
pub use estimator::{GlideEstimate, RatioEstimator, WingAccumulator};
pub use kinematics::{Kinematics, KinematicsStage};
pub use pipeline::{TrackAnalyser, TrackAnalysis};
pub use smoothing::{SmoothedSeries, SmoothingStage, SweepingMean, TurnRateWindow};

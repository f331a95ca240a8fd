//! Track analysis engine for paraglider glide-ratio estimation.
//!
//! An IGC recording is decoded into a [`track::Track`], turned into per-step
//! kinematics, smoothed over a causal window, classified into steady-glide
//! segments and reduced to one glide ratio. Every stage is a pure function
//! of its input; tracks can be analysed in parallel without coordination.

pub mod interface;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod telemetry;
pub mod track;

pub use prelude::{AnalysisConfig, AnalysisError, AnalysisResult, ParseError, ProcessingStage};
pub use processing::{TrackAnalyser, TrackAnalysis};

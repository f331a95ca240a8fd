use anyhow::Context;
use glidecore::prelude::AnalysisConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub analysis: AnalysisConfig,
    /// Parallel analyses; 0 picks the available parallelism.
    pub jobs: usize,
    /// Seed for the dispatch shuffle and the synthetic generator.
    pub seed: u64,
    pub output_dir: Option<PathBuf>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            jobs: 0,
            seed: 0,
            output_dir: None,
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        config
            .analysis
            .validate()
            .with_context(|| format!("validating workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(frame_len_sec: f64, max_turn: f64, min_speed: f64, min_sec: f64) -> Self {
        Self {
            analysis: AnalysisConfig {
                frame_len_sec,
                max_turn_deg_per_sec: max_turn,
                min_speed_kmh: min_speed,
                min_duration_sec: min_sec,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn to_analysis_config(&self) -> AnalysisConfig {
        self.analysis.clone()
    }

    pub fn worker_count(&self) -> usize {
        if self.jobs > 0 {
            return self.jobs;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}

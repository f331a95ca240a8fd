use crate::workflow::config::WorkflowConfig;
use crate::workflow::manifest::FlightJob;
use anyhow::Context;
use glidecore::interface::GlideRecord;
use glidecore::{AnalysisError, TrackAnalyser, TrackAnalysis};
use log::{debug, warn};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// How one flight of a batch ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FlightStatus {
    Analysed { glide_ratio: f64, samples: usize },
    NoGlide,
    ParseFailed { reason: String },
    SanityFailed { baro: u8, gnss: u8 },
    IoFailed { reason: String },
}

impl FlightStatus {
    /// `NoGlide` is a valid outcome, not a failure.
    pub fn is_failure(&self) -> bool {
        !matches!(self, FlightStatus::Analysed { .. } | FlightStatus::NoGlide)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlightOutcome {
    pub flight_id: String,
    pub wing_id: String,
    pub status: FlightStatus,
    /// Present whenever the track got through analysis, even with no glide.
    pub record: Option<GlideRecord>,
}

#[derive(Clone)]
pub struct Runner {
    analyser: TrackAnalyser,
}

impl Runner {
    pub fn new(config: &WorkflowConfig) -> anyhow::Result<Self> {
        let analyser =
            TrackAnalyser::new(config.to_analysis_config()).context("building track analyser")?;
        Ok(Self { analyser })
    }

    pub fn execute(&self, text: &str) -> anyhow::Result<TrackAnalysis> {
        self.analyser.analyse_text(text).context("analysing track")
    }

    pub fn analyse_file(&self, path: &Path) -> anyhow::Result<TrackAnalysis> {
        let text = read_track(path)?;
        self.execute(&text)
            .with_context(|| format!("in {}", path.display()))
    }

    /// Analyses one manifest entry. Never fails: every problem is folded
    /// into the returned status.
    pub fn run_flight(&self, job: &FlightJob) -> FlightOutcome {
        let (status, record) = match read_track(&job.path) {
            Ok(text) => self.classify(&job.flight_id, &text),
            Err(err) => {
                warn!("{}: {:#}", job.flight_id, err);
                (
                    FlightStatus::IoFailed {
                        reason: format!("{:#}", err),
                    },
                    None,
                )
            }
        };
        FlightOutcome {
            flight_id: job.flight_id.clone(),
            wing_id: job.wing_id.clone(),
            status,
            record,
        }
    }

    fn classify(&self, flight_id: &str, text: &str) -> (FlightStatus, Option<GlideRecord>) {
        match self.analyser.analyse_text(text) {
            Ok(analysis) => {
                let record = analysis.to_record();
                let status = match analysis.estimate() {
                    Ok(estimate) => FlightStatus::Analysed {
                        glide_ratio: estimate.glide_ratio,
                        samples: estimate.sample_count,
                    },
                    Err(_) => {
                        debug!("{}: no steady glide found", flight_id);
                        FlightStatus::NoGlide
                    }
                };
                (status, Some(record))
            }
            Err(AnalysisError::Sanity { baro, gnss }) => {
                debug!(
                    "{}: skipped, baro code {} gnss code {}",
                    flight_id,
                    baro.code(),
                    gnss.code()
                );
                (
                    FlightStatus::SanityFailed {
                        baro: baro.code(),
                        gnss: gnss.code(),
                    },
                    None,
                )
            }
            Err(err) => {
                warn!("{}: {}", flight_id, err);
                (
                    FlightStatus::ParseFailed {
                        reason: err.to_string(),
                    },
                    None,
                )
            }
        }
    }
}

/// Recorder files are mostly ASCII; stray bytes in free-text headers are
/// replaced rather than rejected.
fn read_track(path: &Path) -> anyhow::Result<String> {
    let bytes = fs::read(path).with_context(|| format!("reading track {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::{generate_igc, GeneratorConfig};
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn runner() -> Runner {
        Runner::new(&WorkflowConfig::default()).unwrap()
    }

    fn job(path: PathBuf) -> FlightJob {
        FlightJob {
            flight_id: "7001".into(),
            wing_id: "12".into(),
            path,
        }
    }

    #[test]
    fn runner_analyses_synthetic_flight() {
        let config = GeneratorConfig {
            noise_m: 0.0,
            ..Default::default()
        };
        let text = generate_igc(&config).unwrap();
        let analysis = runner().execute(&text).unwrap();
        let ratio = analysis.glide_ratio().unwrap();
        assert!((ratio - config.glide_ratio).abs() / config.glide_ratio < 0.03, "ratio {}", ratio);
    }

    #[test]
    fn run_flight_reports_analysed_with_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.igc");
        fs::write(&path, generate_igc(&GeneratorConfig::default()).unwrap()).unwrap();

        let outcome = runner().run_flight(&job(path));
        assert_eq!(outcome.flight_id, "7001");
        assert_eq!(outcome.wing_id, "12");
        assert!(matches!(outcome.status, FlightStatus::Analysed { .. }));
        let record = outcome.record.unwrap();
        assert!(!record.is_empty());
        assert_eq!(record.sampling, 1.0);
    }

    #[test]
    fn run_flight_folds_errors_into_status() {
        let dir = tempdir().unwrap();
        let outcome = runner().run_flight(&job(dir.path().join("missing.igc")));
        assert!(matches!(outcome.status, FlightStatus::IoFailed { .. }));
        assert!(outcome.status.is_failure());
        assert!(outcome.record.is_none());

        let garbled = dir.path().join("garbled.igc");
        fs::write(&garbled, "HFDTE150722\nB10123050170\n").unwrap();
        let outcome = runner().run_flight(&job(garbled));
        assert!(matches!(outcome.status, FlightStatus::ParseFailed { .. }));
    }

    #[test]
    fn flat_track_is_a_sanity_failure() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("flat.igc");
        let config = GeneratorConfig {
            glide_ratio: 1.0e9,
            thermal_sec: 0,
            fixes: 60,
            noise_m: 0.0,
            ..Default::default()
        };
        fs::write(&path, generate_igc(&config).unwrap()).unwrap();
        let outcome = runner().run_flight(&job(path));
        assert_eq!(outcome.status, FlightStatus::SanityFailed { baro: 3, gnss: 3 });
    }

    #[test]
    fn circling_only_track_has_no_glide() {
        let config = GeneratorConfig {
            glide_sec: 0,
            fixes: 300,
            ..Default::default()
        };
        let dir = tempdir().unwrap();
        let path = dir.path().join("thermal.igc");
        fs::write(&path, generate_igc(&config).unwrap()).unwrap();
        let outcome = runner().run_flight(&job(path));
        assert_eq!(outcome.status, FlightStatus::NoGlide);
        assert!(!outcome.status.is_failure());
        assert!(outcome.record.unwrap().is_empty());
    }

    #[test]
    fn frozen_clock_is_a_sampling_failure() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stuck.igc");
        let mut text = String::from("HFDTE150722\n");
        for i in 0..40 {
            text.push_str(&format!("B110000460{:04}N00700000EA{:05}{:05}\n", i, 2000 - i, 1980 - i));
        }
        fs::write(&path, text).unwrap();
        let outcome = runner().run_flight(&job(path));
        assert_eq!(outcome.status, FlightStatus::SanityFailed { baro: 1, gnss: 1 });
        assert!(outcome.record.is_none());
    }
}

use anyhow::Context;
use log::debug;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// One flight to analyse: a recording on disk and the wing it was flown on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightJob {
    pub flight_id: String,
    pub wing_id: String,
    pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WingRef {
    Text(String),
    Number(u64),
}

impl WingRef {
    fn into_id(self) -> String {
        match self {
            WingRef::Text(id) => id,
            WingRef::Number(id) => id.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    gps: Option<String>,
    wing: Option<WingRef>,
}

/// Flights listed by the fetch service, with incomplete entries set aside.
#[derive(Debug, Default)]
pub struct Manifest {
    pub jobs: Vec<FlightJob>,
    pub skipped: Vec<String>,
}

impl Manifest {
    /// Reads `{flight_id: {"gps": path, "wing": id} | null}`; `gps` is
    /// relative to `igc_dir`.
    pub fn load(path: &Path, igc_dir: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading manifest {}", path.display()))?;
        Self::from_json(&contents, igc_dir)
            .with_context(|| format!("parsing manifest {}", path.display()))
    }

    pub fn from_json(contents: &str, igc_dir: &Path) -> anyhow::Result<Self> {
        let entries: BTreeMap<String, Option<ManifestEntry>> = serde_json::from_str(contents)?;
        let mut manifest = Manifest::default();
        for (flight_id, entry) in entries {
            match entry {
                Some(ManifestEntry {
                    gps: Some(gps),
                    wing: Some(wing),
                }) => manifest.jobs.push(FlightJob {
                    path: igc_dir.join(gps),
                    wing_id: wing.into_id(),
                    flight_id,
                }),
                _ => {
                    debug!("{} has incomplete data", flight_id);
                    manifest.skipped.push(flight_id);
                }
            }
        }
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_entries_are_skipped() {
        let json = r#"{
            "101": {"gps": "0/a.igc", "wing": "42"},
            "102": null,
            "103": {"gps": "0/c.igc"},
            "104": {"gps": "1/d.igc", "wing": 7}
        }"#;
        let manifest = Manifest::from_json(json, Path::new("/data/igcfiles")).unwrap();
        assert_eq!(manifest.skipped, vec!["102".to_string(), "103".to_string()]);
        assert_eq!(manifest.jobs.len(), 2);
        assert_eq!(manifest.jobs[0].path, PathBuf::from("/data/igcfiles/0/a.igc"));
        assert_eq!(manifest.jobs[0].wing_id, "42");
        assert_eq!(manifest.jobs[1].wing_id, "7");
    }

    #[test]
    fn malformed_manifest_is_an_error() {
        assert!(Manifest::from_json("[1, 2]", Path::new(".")).is_err());
    }
}

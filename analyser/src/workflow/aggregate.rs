use crate::store::ResultStore;
use crate::workflow::manifest::FlightJob;
use anyhow::Context;
use glidecore::interface::WingSummary;
use glidecore::processing::WingAccumulator;
use log::debug;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const WING_SUMMARY_FILE: &str = "wings.json";

/// Pools the stored records of every job by wing. Wings whose flights hold
/// no usable glide are left out.
pub fn aggregate_wings(
    jobs: &[FlightJob],
    store: &dyn ResultStore,
) -> anyhow::Result<BTreeMap<String, WingSummary>> {
    let mut accumulators: BTreeMap<&str, WingAccumulator> = BTreeMap::new();
    for job in jobs {
        let Some(record) = store.get(&job.flight_id)? else {
            continue;
        };
        accumulators
            .entry(job.wing_id.as_str())
            .or_default()
            .add_record(&record);
    }

    let mut summaries = BTreeMap::new();
    for (wing_id, accumulator) in accumulators {
        match accumulator.summary() {
            Some(summary) => {
                summaries.insert(wing_id.to_string(), summary);
            }
            None => debug!("wing {} has no glide samples", wing_id),
        }
    }
    Ok(summaries)
}

pub fn write_wing_summaries(
    output_dir: &Path,
    summaries: &BTreeMap<String, WingSummary>,
) -> anyhow::Result<()> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;
    let path = output_dir.join(WING_SUMMARY_FILE);
    let body = serde_json::to_string_pretty(summaries).context("serializing wing summaries")?;
    fs::write(&path, body).with_context(|| format!("writing {}", path.display()))
}

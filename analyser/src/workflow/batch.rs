use crate::store::ResultStore;
use crate::telemetry::BatchMetrics;
use crate::workflow::manifest::FlightJob;
use crate::workflow::runner::{FlightOutcome, FlightStatus, Runner};
use anyhow::Context;
use log::{info, warn};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    pub workers: usize,
    pub seed: u64,
}

/// Analyses every job on a pool of at most `workers` blocking threads and
/// persists each record as soon as its flight completes.
///
/// Dropping the returned future abandons the flights still queued; records
/// already written stay in the store.
pub async fn run_batch(
    runner: Arc<Runner>,
    mut jobs: Vec<FlightJob>,
    store: Arc<dyn ResultStore>,
    metrics: Arc<BatchMetrics>,
    options: BatchOptions,
) -> anyhow::Result<Vec<FlightOutcome>> {
    // Large and small files are spread evenly so the ETA stays honest.
    jobs.shuffle(&mut StdRng::seed_from_u64(options.seed));
    let total = jobs.len();
    info!(
        "analysing {} flights on {} workers",
        total,
        options.workers.max(1)
    );

    let semaphore = Arc::new(Semaphore::new(options.workers.max(1)));
    let mut tasks = JoinSet::new();
    for job in jobs {
        let semaphore = semaphore.clone();
        let runner = runner.clone();
        let store = store.clone();
        tasks.spawn(run_flight_task(semaphore, runner, store, job));
    }

    let started = Instant::now();
    let progress_every = (total / 20).max(1);
    let mut outcomes = Vec::with_capacity(total);
    while let Some(joined) = tasks.join_next().await {
        let outcome = match joined {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => {
                warn!("flight lost: {:#}", err);
                continue;
            }
            Err(err) => {
                warn!("flight task aborted: {}", err);
                continue;
            }
        };
        metrics.record(&outcome.status);
        outcomes.push(outcome);

        let done = outcomes.len();
        if done % progress_every == 0 || done == total {
            let elapsed = started.elapsed();
            let remaining = elapsed.mul_f64((total - done) as f64 / done as f64);
            info!(
                "{}/{} flights ({:.0}%), eta {}",
                done,
                total,
                100.0 * done as f64 / total as f64,
                format_eta(remaining)
            );
        }
    }
    Ok(outcomes)
}

async fn run_flight_task(
    semaphore: Arc<Semaphore>,
    runner: Arc<Runner>,
    store: Arc<dyn ResultStore>,
    job: FlightJob,
) -> anyhow::Result<FlightOutcome> {
    let _permit = semaphore
        .acquire_owned()
        .await
        .context("worker pool closed")?;
    tokio::task::spawn_blocking(move || process_flight(&runner, store.as_ref(), &job))
        .await
        .context("analysis worker panicked")
}

fn process_flight(runner: &Runner, store: &dyn ResultStore, job: &FlightJob) -> FlightOutcome {
    let mut outcome = runner.run_flight(job);
    if let Some(record) = &outcome.record {
        if let Err(err) = store.put(&outcome.flight_id, record) {
            warn!("{}: storing result failed: {:#}", outcome.flight_id, err);
            outcome.status = FlightStatus::IoFailed {
                reason: format!("{:#}", err),
            };
        }
    }
    outcome
}

pub const STATUS_FILE: &str = "status.json";

/// Writes `{flight_id: status}` for every finished flight.
pub fn write_status_report(output_dir: &Path, outcomes: &[FlightOutcome]) -> anyhow::Result<()> {
    let statuses: BTreeMap<&str, &FlightStatus> = outcomes
        .iter()
        .map(|outcome| (outcome.flight_id.as_str(), &outcome.status))
        .collect();
    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;
    let path = output_dir.join(STATUS_FILE);
    let body = serde_json::to_string_pretty(&statuses).context("serializing flight statuses")?;
    fs::write(&path, body).with_context(|| format!("writing {}", path.display()))
}

pub fn format_eta(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, secs / 60 % 60, secs % 60);
    if hours > 0 {
        format!("{}h{:02}m{:02}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{:02}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

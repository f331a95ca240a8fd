use anyhow::Context;
use clap::Parser;
use generator::profile::{generate_igc, GeneratorConfig};
use glidecore::TrackAnalysis;
use log::{debug, info, warn};
use report_bridge::bridge::ReportBridge;
use report_bridge::model::ReportModel;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use store::{JsonDirStore, MemoryStore, ResultStore};
use telemetry::BatchMetrics;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::aggregate::{aggregate_wings, write_wing_summaries};
use workflow::batch::{run_batch, write_status_report, BatchOptions};
use workflow::config::WorkflowConfig;
use workflow::manifest::Manifest;
use workflow::runner::Runner;

mod generator;
mod report_bridge;
mod store;
mod telemetry;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Glide-ratio analysis driver for IGC flight tracks")]
struct Args {
    /// Generate a synthetic flight, analyse it and print the estimate
    #[arg(long, default_value_t = false)]
    synthetic: bool,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Analyse a single IGC file
    #[arg(long)]
    track: Option<PathBuf>,
    /// JSON manifest mapping flight ids to IGC files and wings
    #[arg(long)]
    manifest: Option<PathBuf>,
    /// Directory the manifest paths are relative to (default: the manifest's directory)
    #[arg(long)]
    igc_dir: Option<PathBuf>,
    /// Directory receiving per-flight records and wing summaries
    #[arg(long)]
    output: Option<PathBuf>,
    /// Parallel analyses (0 = available cores)
    #[arg(long)]
    jobs: Option<usize>,
    #[arg(long, default_value_t = 20.0)]
    frame_len_sec: f64,
    #[arg(long, default_value_t = 10.0)]
    max_turn: f64,
    #[arg(long, default_value_t = 25.0)]
    min_speed: f64,
    #[arg(long, default_value_t = 20.0)]
    min_sec: f64,
    /// Keep the report bridge alive for a plotting client
    #[arg(long, default_value_t = false)]
    serve: bool,
    #[arg(long, default_value = "127.0.0.1:9000")]
    bind: SocketAddr,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut workflow_config = if let Some(path) = &args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(args.frame_len_sec, args.max_turn, args.min_speed, args.min_sec)
    };
    if let Some(jobs) = args.jobs {
        workflow_config.jobs = jobs;
    }
    if let Some(output) = &args.output {
        workflow_config.output_dir = Some(output.clone());
    }

    let runner = Arc::new(Runner::new(&workflow_config)?);
    let report_bridge = ReportBridge::new();
    if args.serve {
        report_bridge.serve(runner.clone(), args.bind);
    }

    if !(args.synthetic || args.serve || args.track.is_some() || args.manifest.is_some()) {
        warn!("nothing to do: pass --track, --manifest, --synthetic or --serve");
    }

    if args.synthetic {
        run_synthetic(&runner, &report_bridge, workflow_config.seed)?;
    }
    if let Some(path) = &args.track {
        run_track(&runner, &report_bridge, path, workflow_config.output_dir.as_deref())?;
    }
    if let Some(path) = &args.manifest {
        run_manifest(
            runner.clone(),
            &report_bridge,
            &workflow_config,
            path,
            args.igc_dir.as_deref(),
        )?;
    }

    if args.serve {
        report_bridge.publish_status("HTTP bridge running (Ctrl+C to stop)...");
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}

fn describe(analysis: &TrackAnalysis) -> String {
    match analysis.estimate() {
        Ok(estimate) => format!(
            "glide ratio {:.2} from {} samples ({:?} altitude)",
            estimate.glide_ratio, estimate.sample_count, analysis.source
        ),
        Err(_) => format!("no steady glide ({:?} altitude)", analysis.source),
    }
}

fn run_synthetic(runner: &Runner, report_bridge: &ReportBridge, seed: u64) -> anyhow::Result<()> {
    let generator = GeneratorConfig {
        seed,
        ..Default::default()
    };
    let text = generate_igc(&generator).context("generating synthetic flight")?;
    let analysis = runner.execute(&text)?;
    println!(
        "Synthetic flight (ratio {:.2}) -> {}",
        generator.glide_ratio,
        describe(&analysis)
    );
    report_bridge.publish(ReportModel::from_analysis(Some("synthetic".into()), &analysis));
    report_bridge.publish_status("Synthetic analysis ready.");
    Ok(())
}

fn run_track(
    runner: &Runner,
    report_bridge: &ReportBridge,
    path: &Path,
    output_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let analysis = runner.analyse_file(path)?;
    let flight_id = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "track".to_string());
    println!("{} -> {}", path.display(), describe(&analysis));

    if let Some(dir) = output_dir {
        let store = JsonDirStore::in_output_dir(dir)?;
        store.put(&flight_id, &analysis.to_record())?;
        info!("record for {} stored in {}", flight_id, store.root().display());
    }
    report_bridge.publish(ReportModel::from_analysis(Some(flight_id), &analysis));
    Ok(())
}

fn run_manifest(
    runner: Arc<Runner>,
    report_bridge: &ReportBridge,
    config: &WorkflowConfig,
    manifest_path: &Path,
    igc_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let igc_dir = igc_dir
        .or_else(|| manifest_path.parent())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let manifest = Manifest::load(manifest_path, &igc_dir)?;
    info!(
        "{} flights listed, {} incomplete entries skipped",
        manifest.jobs.len(),
        manifest.skipped.len()
    );

    let store: Arc<dyn ResultStore> = match &config.output_dir {
        Some(dir) => Arc::new(JsonDirStore::in_output_dir(dir)?),
        None => {
            info!("no output directory given, records stay in memory");
            Arc::new(MemoryStore::new())
        }
    };
    let metrics = Arc::new(BatchMetrics::new());
    let options = BatchOptions {
        workers: config.worker_count(),
        seed: config.seed,
    };

    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating batch runtime")?;
    let finished = runtime.block_on(async {
        tokio::select! {
            outcomes = run_batch(
                runner,
                manifest.jobs.clone(),
                store.clone(),
                metrics.clone(),
                options,
            ) => outcomes.map(Some),
            interrupted = signal::ctrl_c() => {
                interrupted.context("listening for Ctrl+C").map(|()| None)
            }
        }
    })?;

    let Some(outcomes) = finished else {
        warn!(
            "batch interrupted after {} flights; unfinished analyses discarded",
            metrics.snapshot().total()
        );
        runtime.shutdown_background();
        return Ok(());
    };

    let snapshot = metrics.snapshot();
    println!("Batch -> {}", snapshot);
    for outcome in outcomes.iter().filter(|outcome| outcome.status.is_failure()) {
        debug!(
            "{} (wing {}): {:?}",
            outcome.flight_id, outcome.wing_id, outcome.status
        );
    }
    info!(
        "{} records available for aggregation",
        store.flight_ids()?.len()
    );

    let wings = aggregate_wings(&manifest.jobs, store.as_ref())?;
    for (wing_id, summary) in &wings {
        println!(
            "wing {} -> glide ratio {:.2} (+{:.2} / -{:.2}) over {} flights, {} samples",
            wing_id,
            summary.glide_ratio,
            summary.ratio_upper_error,
            summary.ratio_lower_error,
            summary.flight_count,
            summary.sample_count
        );
    }
    if let Some(dir) = &config.output_dir {
        write_status_report(dir, &outcomes)?;
        write_wing_summaries(dir, &wings)?;
    }
    report_bridge.publish_wings(wings);
    report_bridge.publish_status("Batch results ready.");
    Ok(())
}

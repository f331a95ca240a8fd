use crate::report_bridge::model::ReportModel;
use crate::workflow::runner::Runner;
use glidecore::interface::WingSummary;
use log::{error, info, warn};
use serde::Deserialize;
use serde_json::json;
use std::{
    collections::BTreeMap,
    net::SocketAddr,
    sync::{Arc, RwLock},
    thread,
};
use tokio::runtime::Builder;
use warp::{http::StatusCode, Filter};

/// IGC files rarely exceed a few megabytes.
const MAX_INGEST_BYTES: u64 = 16 * 1024 * 1024;

type SharedModel = Arc<RwLock<ReportModel>>;

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub track: String,
    #[serde(default)]
    pub flight_id: Option<String>,
}

/// Holds the latest report and, once served, exposes it over HTTP.
pub struct ReportBridge {
    state: SharedModel,
}

impl ReportBridge {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(ReportModel::default())),
        }
    }

    /// `GET /report` returns the current model; `POST /ingest` analyses a
    /// track and replaces it. Runs on its own thread.
    pub fn serve(&self, runner: Arc<Runner>, addr: SocketAddr) -> thread::JoinHandle<()> {
        let state = self.state.clone();
        let state_filter = warp::any().map(move || state.clone());
        let runner_filter = warp::any().map(move || runner.clone());

        let report_route = warp::path("report")
            .and(warp::path::end())
            .and(warp::get())
            .and(state_filter.clone())
            .map(|state: SharedModel| warp::reply::json(&read_model(&state)));

        let ingest_route = warp::path("ingest")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::content_length_limit(MAX_INGEST_BYTES))
            .and(warp::body::json())
            .and(state_filter)
            .and(runner_filter)
            .map(|request: IngestRequest, state: SharedModel, runner: Arc<Runner>| {
                ingest(&request, &state, &runner)
            });

        info!("report bridge listening on http://{}", addr);
        thread::spawn(move || {
            let routes = report_route.or(ingest_route);
            match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime.block_on(warp::serve(routes).run(addr)),
                Err(err) => error!("report bridge runtime failed to start: {}", err),
            }
        })
    }

    pub fn publish(&self, model: ReportModel) {
        info!(
            "[report] {} steps, glide ratio {}",
            model.series.glide_angles.len(),
            model
                .glide_ratio
                .map_or_else(|| "n/a".to_string(), |ratio| format!("{:.2}", ratio))
        );
        write_model(&self.state, |current| *current = model);
    }

    /// Replaces the wing table, keeping the last track in place.
    pub fn publish_wings(&self, wings: BTreeMap<String, WingSummary>) {
        info!("[report] {} wing summaries", wings.len());
        write_model(&self.state, |current| current.wings = wings);
    }

    pub fn publish_status(&self, message: &str) {
        info!("[report] {}", message);
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> ReportModel {
        read_model(&self.state)
    }
}

impl Default for ReportBridge {
    fn default() -> Self {
        Self::new()
    }
}

fn read_model(state: &SharedModel) -> ReportModel {
    match state.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

fn write_model(state: &SharedModel, update: impl FnOnce(&mut ReportModel)) {
    match state.write() {
        Ok(mut guard) => update(&mut *guard),
        Err(poisoned) => {
            let mut guard = poisoned.into_inner();
            update(&mut *guard)
        }
    }
}

fn ingest(
    request: &IngestRequest,
    state: &SharedModel,
    runner: &Runner,
) -> warp::reply::WithStatus<warp::reply::Json> {
    match runner.execute(&request.track) {
        Ok(analysis) => {
            let mut model = ReportModel::from_analysis(request.flight_id.clone(), &analysis);
            let glide_ratio = model.glide_ratio;
            write_model(state, |current| {
                model.wings = std::mem::take(&mut current.wings);
                *current = model;
            });
            warp::reply::with_status(
                warp::reply::json(&json!({"status": "ok", "glide_ratio": glide_ratio})),
                StatusCode::OK,
            )
        }
        Err(err) => {
            warn!("ingest rejected: {:#}", err);
            warp::reply::with_status(
                warp::reply::json(&json!({"status": "error", "reason": format!("{:#}", err)})),
                StatusCode::UNPROCESSABLE_ENTITY,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::{generate_igc, GeneratorConfig};
    use crate::workflow::config::WorkflowConfig;
    use warp::Reply;

    fn runner() -> Runner {
        Runner::new(&WorkflowConfig::default()).unwrap()
    }

    fn summary() -> WingSummary {
        WingSummary {
            mean_angle: -6.7,
            std_dev: 1.0,
            confidence: 0.1,
            sample_count: 400,
            flight_count: 3,
            glide_ratio: 8.5,
            ratio_upper_error: 0.2,
            ratio_lower_error: 0.2,
        }
    }

    #[test]
    fn publish_replaces_track_and_keeps_wings_separately() {
        let bridge = ReportBridge::new();
        let analysis = runner()
            .execute(&generate_igc(&GeneratorConfig::default()).unwrap())
            .unwrap();
        bridge.publish(ReportModel::from_analysis(Some("77".into()), &analysis));
        bridge.publish_wings(BTreeMap::from([("12".to_string(), summary())]));

        let snapshot = bridge.snapshot();
        assert_eq!(snapshot.flight_id.as_deref(), Some("77"));
        assert!(snapshot.glide_ratio.is_some());
        assert_eq!(snapshot.series.glide_angles.len(), 899);
        assert_eq!(snapshot.wings.len(), 1);
    }

    #[test]
    fn ingest_updates_model_on_success() {
        let bridge = ReportBridge::new();
        bridge.publish_wings(BTreeMap::from([("12".to_string(), summary())]));
        let request = IngestRequest {
            track: generate_igc(&GeneratorConfig::default()).unwrap(),
            flight_id: Some("live".into()),
        };
        let response = ingest(&request, &bridge.state, &runner()).into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let snapshot = bridge.snapshot();
        assert_eq!(snapshot.flight_id.as_deref(), Some("live"));
        assert!(snapshot.glide_ratio.is_some());
        assert_eq!(snapshot.wings.len(), 1);
    }

    #[test]
    fn ingest_rejects_bad_track_and_keeps_model() {
        let bridge = ReportBridge::new();
        let request = IngestRequest {
            track: "B1012305017000N00045000WA0015000150".into(),
            flight_id: None,
        };
        let response = ingest(&request, &bridge.state, &runner()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(bridge.snapshot().flight_id.is_none());
    }
}

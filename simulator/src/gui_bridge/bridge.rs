use crate::generator::profile::{build_query_records_from_config, GeneratorConfig};
use crate::gui_bridge::model::VisualizationFeed;
use crate::workflow::runner::Runner;
use anyhow::Result;
use serde_json::json;
use std::{
    net::SocketAddr,
    sync::{Arc, RwLock},
    thread,
};
use tokio::runtime::Builder;
use warp::{http::StatusCode, Filter};

fn gui_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

#[derive(Debug)]
struct WarpError;

impl warp::reject::Reject for WarpError {}

/// Bridge that hosts the record feed endpoint and processes scenario
/// regeneration requests from the visualizer.
pub struct GuiBridge {
    state: Arc<RwLock<VisualizationFeed>>,
}

impl GuiBridge {
    pub fn new(runner: Arc<Runner>) -> Self {
        let state = Arc::new(RwLock::new(VisualizationFeed::default()));
        let state_for_filter = state.clone();
        let state_filter = warp::any().map(move || state_for_filter.clone());
        let runner_filter = warp::any().map(move || runner.clone());

        let records_route = warp::path("records")
            .and(warp::get())
            .and(state_filter.clone())
            .map(|state: Arc<RwLock<VisualizationFeed>>| {
                warp::reply::json(&*state.read().unwrap())
            });

        let health_route = warp::path("health").and(warp::get()).map(|| {
            warp::reply::json(&json!({
                "status": "healthy",
                "message": "record bridge is running"
            }))
        });

        let generator_route = warp::path("ingest-config")
            .and(warp::post())
            .and(warp::body::json())
            .and(state_filter)
            .and(runner_filter)
            .and_then(
                |config: GeneratorConfig,
                 state: Arc<RwLock<VisualizationFeed>>,
                 runner: Arc<Runner>| async move {
                    match build_query_records_from_config(&config)
                        .and_then(|records| runner.execute(&records).map(|r| (records, r)))
                    {
                        Ok((records, result)) => {
                            let note = format!(
                                "scenario: {} events over {} days, {} buckets",
                                result.event_count, result.day_count, result.bucket_count
                            );
                            let mut guard = state.write().unwrap();
                            *guard = VisualizationFeed::new(records, vec![note]);
                            if let Some(name) = config.scenario.as_ref() {
                                println!(
                                    "[GUI] Scenario {} -> {} buckets",
                                    name, result.bucket_count
                                );
                            }
                            Ok::<_, warp::Rejection>(warp::reply::with_status(
                                warp::reply::json(&json!({
                                    "status": "ok",
                                    "records": guard.record_count,
                                    "buckets": result.bucket_count,
                                    "description": config.description.clone().unwrap_or_default()
                                })),
                                StatusCode::OK,
                            ))
                        }
                        Err(err) => {
                            eprintln!("ingest-config error: {}", err);
                            Err(warp::reject::custom(WarpError))
                        }
                    }
                },
            );

        thread::spawn(move || {
            let routes = records_route.or(health_route).or(generator_route);
            let runtime = Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("failed to build runtime");
            runtime.block_on(async move {
                warp::serve(routes).run(gui_bind_address()).await;
            });
        });

        Self { state }
    }

    pub fn publish(&self, feed: &VisualizationFeed) -> Result<()> {
        let mut guard = self.state.write().unwrap();
        *guard = feed.clone();
        println!(
            "[GUI] serving {} records ({} notes)",
            guard.record_count,
            guard.feed_notes.len()
        );
        Ok(())
    }

    pub fn publish_status(&self, message: &str) {
        println!("[GUI] {}", message);
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> VisualizationFeed {
        self.state.read().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::build_query_records;
    use crate::workflow::config::WorkflowConfig;
    use crate::workflow::runner::Runner;
    use std::sync::Arc;

    #[test]
    fn gui_bridge_updates_state() {
        let cfg = WorkflowConfig::from_args(60, 1, 8);
        let runner = Arc::new(Runner::new(cfg.clone()));
        let gui = GuiBridge::new(runner.clone());
        let records = build_query_records(cfg.days, cfg.records_per_day).unwrap();
        let result = runner.execute(&records).unwrap();
        let feed = VisualizationFeed::new(
            records,
            vec![format!("{} buckets", result.bucket_count)],
        );
        gui.publish(&feed).unwrap();
        assert_eq!(gui.snapshot().record_count, feed.record_count);
    }
}

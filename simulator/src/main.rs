use anyhow::Context;
use clap::Parser;
use generator::profile::build_query_records_from_config;
use gui_bridge::bridge::GuiBridge;
use gui_bridge::model::VisualizationFeed;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod generator;
mod gui_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Rust-facing detection timeline driver")]
struct Args {
    /// Run a single offline aggregation pass and emit a bucket summary
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Bucket width in minutes (must divide a day)
    #[arg(long, default_value_t = 60)]
    period: u32,
    #[arg(long, default_value_t = 3)]
    days: usize,
    #[arg(long, default_value_t = 48)]
    records_per_day: usize,
    /// Keep the record bridge alive for the visualizer
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(args.period, args.days, args.records_per_day)
    };

    let runner = Runner::new(workflow_config.clone());
    let gui_bridge = GuiBridge::new(Arc::new(runner.clone()));
    let records = build_query_records_from_config(&workflow_config.to_generator_config())?;

    let feed = VisualizationFeed::new(
        records.clone(),
        vec![format!(
            "{} synthetic records from node {}",
            records.len(),
            workflow_config.node
        )],
    );
    gui_bridge.publish(&feed)?;

    if args.offline {
        let result = runner.execute(&records)?;

        println!(
            "Offline run -> {} events / {} days, {} buckets, max value {:.2}, {} primitives ({} bars)",
            result.event_count,
            result.day_count,
            result.bucket_count,
            result.max_value,
            result.primitive_count,
            result.bar_count
        );
        gui_bridge.publish_status("Offline aggregation results ready.");

        let report = format!(
            "events={} dropped={} days={} buckets={} max_value={:.3} bars={}\n",
            result.event_count,
            result.dropped_records,
            result.day_count,
            result.bucket_count,
            result.max_value,
            result.bar_count
        );
        let report_path = PathBuf::from("tools/data/offline_buckets.log");
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(report_path)?;
        file.write_all(report.as_bytes())?;
    }
    if args.serve {
        gui_bridge.publish_status("HTTP bridge running (Ctrl+C to stop)...");
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

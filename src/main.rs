use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::signal;
use tracing::info;

use fraudr::api::routes::{create_router, AppState};
use fraudr::config::{Cli, Command, ServeConfig, SynthConfig};
use fraudr::domain::RulePolicy;
use fraudr::model::OnnxScorer;
use fraudr::observability::{init_tracing, MetricsRegistry};
use fraudr::rules::RuleEngine;
use fraudr::scoring::ScoringPipeline;
use fraudr::synth::{
    generate, DatasetManifest, DatasetWriter, LabelSynthesizer, PopulationParams,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(config) => serve(config).await,
        Command::Synth(config) => synth(config),
    }
}

async fn serve(config: ServeConfig) -> anyhow::Result<()> {
    init_tracing(&config.log_level);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting fraudr scoring engine"
    );

    let policy = load_policy(config.policy_path.as_deref())?;
    info!(policy_version = %policy.version, "Policy loaded");

    // Model problems are fatal at startup; the service never runs without
    // a working model.
    let scorer = OnnxScorer::load(&config.model_path, config.onnx_threads)
        .with_context(|| format!("loading model from {}", config.model_path.display()))?;

    let pipeline = ScoringPipeline::new(Arc::new(scorer), RuleEngine::new(policy));

    let state = Arc::new(AppState {
        pipeline: Arc::new(pipeline),
        metrics: Arc::new(MetricsRegistry::new()),
        start_time: Instant::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        latency_budget_ms: config.latency_budget_ms,
    });

    let app = create_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    info!(addr = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    if config.graceful_shutdown {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
    } else {
        axum::serve(listener, app).await?;
    }

    info!("Shutdown complete");
    Ok(())
}

fn synth(config: SynthConfig) -> anyhow::Result<()> {
    init_tracing(&config.log_level);

    let policy = load_policy(config.policy_path.as_deref())?;
    let policy_version = policy.version.clone();

    info!(
        population = config.population,
        users = config.users,
        seed = config.seed,
        policy_version = %policy_version,
        output = %config.output.display(),
        "Synthesizing labeled dataset"
    );

    let mut rng = StdRng::seed_from_u64(config.seed);
    let population = generate(
        PopulationParams {
            size: config.population,
            users: config.users,
        },
        &mut rng,
    );

    let synthesizer = LabelSynthesizer::new(RuleEngine::new(policy));
    let (examples, report) = synthesizer.synthesize(&population, &mut rng);

    let writer = DatasetWriter::new(config.output.clone());
    writer
        .write_examples(&examples)
        .with_context(|| format!("writing dataset to {}", config.output.display()))?;

    let manifest = DatasetManifest::new(&report, &policy_version, config.users, config.seed);
    writer.write_manifest(&manifest)?;

    info!(
        dataset_id = %manifest.dataset_id,
        positives = report.positives_after_floor,
        flips = report.flips_applied,
        manifest = %writer.manifest_path().display(),
        "Dataset written"
    );

    Ok(())
}

fn load_policy(path: Option<&std::path::Path>) -> anyhow::Result<RulePolicy> {
    match path {
        Some(path) => RulePolicy::load(path)
            .with_context(|| format!("loading policy from {}", path.display())),
        None => Ok(RulePolicy::default()),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Received shutdown signal");
}

use clap::Parser;
use greenhouse_monitoring::{
    actors::{ingestor::IngestorHandle, state::StateHandle},
    api::{ApiConfig, ApiState, spawn_api_server},
    config::{Config, read_config_file},
};
use tokio::sync::broadcast;
use tracing::{info, level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Config file (optional; defaults cover a local broker on port 1883)
    #[arg(short)]
    file: Option<String>,
}

fn init() {
    let filter = filter::Targets::new().with_targets(vec![
        ("greenhouse_monitoring", LevelFilter::TRACE),
        ("hub", LevelFilter::TRACE),
    ]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init();

    let args = Args::parse();
    trace!("started with args: {args:?}");

    let config = match &args.file {
        Some(path) => read_config_file(path)?,
        None => Config::default(),
    };

    let (stream_tx, _) = broadcast::channel(config.stream_capacity);

    let state = StateHandle::spawn();
    let ingestor = IngestorHandle::spawn(&config.broker, state.clone(), stream_tx.clone());

    let api_config = ApiConfig {
        bind_addr: ([0, 0, 0, 0], config.port).into(),
        enable_cors: true,
    };
    let addr = spawn_api_server(api_config, ApiState::new(state.clone(), stream_tx)).await?;

    info!(
        "hub relaying {}:{} to dashboards on {addr}",
        config.broker.host, config.broker.port
    );

    tokio::signal::ctrl_c().await?;
    info!("shutting down");

    ingestor.shutdown().await;
    state.shutdown().await;

    Ok(())
}

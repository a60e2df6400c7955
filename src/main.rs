//! OneWire Exporter binary
//!
//! Serves 1-Wire temperature readings over HTTP, or prints a single snapshot.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use onewire_exporter::{
    host_identifier, start_web_server, AppState, DeviceEnumerator, DeviceList, OneWireReader,
    ReadingStore, Sampler, WebConfig, DEFAULT_DEVICE_PATH, DEFAULT_JSON_PATH,
    DEFAULT_LISTEN_ADDRESS, DEFAULT_METRICS_PATH,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, level_filters::LevelFilter, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "onewire_exporter")]
#[command(about = "1-Wire temperature exporter for Prometheus")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = "Reads 1-Wire temperature sensors from an owfs mount and serves them as Prometheus metrics and JSON")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Address and port to expose metrics
    #[arg(long = "web.listen-address", default_value = DEFAULT_LISTEN_ADDRESS)]
    listen_address: String,

    /// Path under which to expose metrics
    #[arg(long = "web.telemetry-path", default_value = DEFAULT_METRICS_PATH)]
    metrics_path: String,

    /// Path under which to expose json metrics
    #[arg(long = "web.json-path", default_value = DEFAULT_JSON_PATH)]
    json_path: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Log as JSON lines on stdout
    #[arg(long)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the exporter (default)
    Serve(ServeArgs),

    /// Read every sensor once, print the readings and exit
    Snapshot(SnapshotArgs),
}

#[derive(Args, Default)]
struct ServeArgs {
    /// Disable CORS headers
    #[arg(long)]
    no_cors: bool,
}

#[derive(Args)]
struct SnapshotArgs {
    /// Output format: json or pretty
    #[arg(short, long, default_value = "pretty")]
    format: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(&cli)?;

    match &cli.command {
        Some(Commands::Serve(args)) => serve_command(&cli, args).await,
        Some(Commands::Snapshot(args)) => snapshot_command(args).await,
        None => serve_command(&cli, &ServeArgs::default()).await,
    }
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    if cli.log_json {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stdout)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(())
}

fn discover_devices() -> anyhow::Result<DeviceList> {
    DeviceEnumerator::new(DEFAULT_DEVICE_PATH)
        .discover()
        .map_err(|e| {
            error!("Error getting Onewire device list: {}", e);
            e
        })
        .context("device discovery failed")
}

async fn serve_command(cli: &Cli, args: &ServeArgs) -> anyhow::Result<()> {
    info!("Started");

    let devices = discover_devices()?;
    let hostname = host_identifier();
    info!(devices = devices.len(), hostname = %hostname, "Discovery complete");

    let store = Arc::new(ReadingStore::new().context("failed to create metrics registry")?);

    let web_config = WebConfig::new(&cli.listen_address)
        .with_metrics_path(&cli.metrics_path)
        .with_json_path(&cli.json_path)
        .with_cors(!args.no_cors);
    let state = AppState::new(Arc::clone(&store), web_config).with_device_count(devices.len());

    let (stop, shutdown) = watch::channel(false);
    let sampler = Sampler::new(OneWireReader::new(DEFAULT_DEVICE_PATH), devices, store, hostname);
    let sampler_task = tokio::spawn(sampler.run(shutdown.clone()));

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown requested");
                let _ = stop.send(true);
            }
            Err(e) => {
                error!("Failed to listen for Ctrl-C: {}", e);
                // keep the sender alive so the sampler never sees a closed channel
                std::future::pending::<()>().await;
            }
        }
    });

    start_web_server(state, shutdown).await?;
    sampler_task.await.context("sampler task failed")?;

    Ok(())
}

async fn snapshot_command(args: &SnapshotArgs) -> anyhow::Result<()> {
    let devices = discover_devices()?;
    let store = Arc::new(ReadingStore::new()?);
    let sampler = Sampler::new(
        OneWireReader::new(DEFAULT_DEVICE_PATH),
        devices,
        Arc::clone(&store),
        host_identifier(),
    );
    let report = sampler.sample_cycle().await;
    let readings = store.current().await;

    match args.format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(readings.as_ref())?);
        }
        "pretty" => {
            println!("🌡️  Temperatures");
            println!("================");
            for reading in readings.iter() {
                println!("  {}: {:.3}°C", reading.device_id, reading.value);
            }
            if report.failed > 0 {
                println!("  ({} device(s) could not be read)", report.failed);
            }
        }
        other => {
            anyhow::bail!("Unsupported format: {}. Use 'json' or 'pretty'", other);
        }
    }

    Ok(())
}

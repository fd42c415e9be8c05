//! Redfish Exporter
//!
//! Prometheus exporter for RAID controller and disk health read from a
//! Redfish BMC.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Redfish Exporter                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐    ┌──────────────┐    ┌──────────────┐       │
//! │  │  Connector   │───▶│     RAID     │───▶│   Exporter   │       │
//! │  │ (live/file)  │    │  Collector   │    │  (/metrics)  │       │
//! │  └──────────────┘    └──────────────┘    └──────────────┘       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, warn, Level};
use tracing_subscriber::{filter::Directive, fmt, prelude::*, EnvFilter};

use redfish_exporter::adapters::{FileRedfishConnector, HttpRedfishConnector, RedfishConfig};
use redfish_exporter::domain::RedfishConnector;
use redfish_exporter::error::{Error, Result};
use redfish_exporter::metrics::{server, Exporter, ExporterConfig, StatusMapping};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Redfish Exporter - RAID controller and disk health for Prometheus
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// BMC base URL
    #[arg(long, env = "REDFISH_URL", default_value = "https://localhost")]
    redfish_url: String,

    /// BMC user
    #[arg(long, env = "REDFISH_USERNAME", default_value = "root")]
    username: String,

    /// BMC password
    #[arg(long, env = "REDFISH_PASSWORD", default_value = "", hide_env_values = true)]
    password: String,

    /// Redfish request timeout in seconds
    #[arg(long, env = "REDFISH_TIMEOUT_SECONDS", default_value = "30")]
    timeout_seconds: u64,

    /// Verify the BMC's TLS certificate
    #[arg(long, env = "REDFISH_VERIFY_TLS")]
    verify_tls: bool,

    /// Serve captured Redfish responses from this directory instead of a BMC
    #[arg(long, env = "EXPORTER_LOCAL_METRICS")]
    local_metrics: Option<PathBuf>,

    /// Prefix for exported metric names
    #[arg(long, env = "METRICS_PREFIX", default_value = "idrac")]
    prefix: String,

    /// Also map "", "KO" and "Disabled" status tokens to 0
    #[arg(long, env = "STRICT_STATUS_MAPPING")]
    strict_status_mapping: bool,

    /// Metrics server bind address
    #[arg(long, env = "METRICS_ADDR", default_value = "0.0.0.0:9348")]
    metrics_addr: String,

    /// Run a single scrape, print it to stdout and exit
    #[arg(long)]
    once: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args)?;

    info!("Starting Redfish exporter");
    info!("  Metric prefix: {}", args.prefix);

    let exporter_config = ExporterConfig {
        prefix: args.prefix.clone(),
        status_mapping: if args.strict_status_mapping {
            StatusMapping::Strict
        } else {
            StatusMapping::Compatible
        },
    };
    exporter_config.validate()?;

    let connector = build_connector(&args).await?;
    let exporter = Exporter::new(exporter_config, connector)?;
    info!("  Status mapping: {}", exporter.config().status_mapping);

    if args.once {
        print!("{}", exporter.scrape().await?);
        return Ok(());
    }

    run_server(&args.metrics_addr, exporter).await?;

    info!("Exporter shutdown complete");
    Ok(())
}

/// Pick the connector explicitly from the CLI; nothing else reads the environment.
async fn build_connector(args: &Args) -> Result<Arc<dyn RedfishConnector>> {
    if let Some(dir) = &args.local_metrics {
        info!("  Data source: local files in {}", dir.display());
        if !dir.is_dir() {
            return Err(Error::Config(format!(
                "Local metrics directory does not exist: {}",
                dir.display()
            )));
        }
        return Ok(Arc::new(FileRedfishConnector::new(dir.clone())));
    }

    let config = RedfishConfig {
        base_url: args.redfish_url.clone(),
        username: args.username.clone(),
        password: args.password.clone(),
        timeout: Duration::from_secs(args.timeout_seconds),
        verify_tls: args.verify_tls,
    };
    info!("  Data source: {}", config.base_url);
    info!("  Request timeout: {}s", args.timeout_seconds);
    info!("  Verify TLS: {}", config.verify_tls);

    let connector = HttpRedfishConnector::new(config)?;

    // Check BMC health
    if let Err(e) = connector.health_check().await {
        error!("Redfish health check failed: {}", e);
        warn!("Continuing anyway - scrapes will report failure until the BMC answers");
    } else {
        info!("Redfish service root reachable");
    }

    Ok(Arc::new(connector))
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) -> Result<()> {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let mut filter = EnvFilter::from_default_env().add_directive(level.into());
    for directive in ["hyper=warn", "reqwest=warn", "rustls=warn"] {
        filter = filter.add_directive(
            directive
                .parse::<Directive>()
                .map_err(|e| Error::Config(format!("Invalid log directive {}: {}", directive, e)))?,
        );
    }

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }
    Ok(())
}

// =============================================================================
// Metrics Server
// =============================================================================

async fn run_server(addr: &str, exporter: Arc<Exporter>) -> Result<()> {
    use std::net::SocketAddr;
    use tokio::net::TcpListener;

    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| Error::Config(format!("Invalid metrics server address: {}", e)))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Internal(format!("Failed to bind metrics server: {}", e)))?;

    info!("Metrics server listening on {}", addr);

    server::serve(listener, exporter, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

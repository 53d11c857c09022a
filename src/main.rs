//! CLI for meshmq
//!
//! Startup: open the radio, build the session, connect to the broker, attach
//! listeners. Runs until Ctrl-C, then disconnects.

use std::sync::Arc;

use clap::Parser;
use meshmq::GatewayError;
use meshmq::bridge;
use meshmq::config::{Settings, load_config, load_config_file};
use meshmq::radio::UdpRadioLink;
use meshmq::session::GatewaySession;
use meshmq::transport::{MqttBrokerClient, QoS};
use meshmq::utils::logging;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "meshmq", about = "Radio mesh to MQTT gateway")]
struct Cli {
    /// Configuration file (default: config/default.toml if present)
    #[arg(long)]
    config: Option<String>,

    /// Log level, overrides the configured one
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => load_config_file(path),
        None => load_config(),
    };
    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            logging::init(cli.log_level.as_deref().unwrap_or("info"));
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    logging::init(cli.log_level.as_deref().unwrap_or(&settings.log.level));

    if let Err(e) = run(settings).await {
        error!("Gateway failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(settings: Settings) -> Result<(), GatewayError> {
    let radio = Arc::new(UdpRadioLink::open(&settings.radio).await?);
    let broker = Arc::new(MqttBrokerClient::new(&settings.broker));

    let session = Arc::new(
        GatewaySession::builder()
            .radio(radio)
            .broker(broker)
            .root_topic(settings.gateway.root_topic.clone())
            .credentials(
                settings.broker.username.clone(),
                settings.broker.password.clone(),
            )
            .qos(QoS::try_from(settings.gateway.qos)?)
            .build()?,
    );

    session.connect().await?;
    if let Err(e) = bridge::attach(&session).await {
        if let Err(cleanup) = session.disconnect().await {
            warn!(error = %cleanup, "Disconnect after failed startup also failed");
        }
        return Err(e);
    }

    info!(base = session.topics().base(), "Gateway running");

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received. Disconnecting.");

    session.disconnect().await
}

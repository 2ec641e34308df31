use clap::Parser;
use miette::{IntoDiagnostic, Result};
use paybutton::application::button::ButtonProps;
use paybutton::config::{Config, Env};
use paybutton::domain::meta::META_MESSAGE;
use paybutton::domain::ports::Ports;
use paybutton::infrastructure::in_memory::{
    InMemoryHttp, InMemoryOrderApi, Journal, LoopbackBridge, RecordingNavigator, StaticPlatform,
};
use paybutton::infrastructure::telemetry::BufferedTelemetry;
use paybutton::interfaces::csv::scenario_reader::ScenarioReader;
use paybutton::interfaces::csv::telemetry_writer::TelemetryWriter;
use paybutton::interfaces::scenario::Simulator;
use serde_json::{Value, json};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Scenario CSV file with one lifecycle event per row
    input: PathBuf,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Deployment environment, overriding the configuration file
    #[arg(long, value_enum)]
    env: Option<Env>,

    /// Use the short test payment deadline
    #[arg(long)]
    test_mode: bool,

    /// Client id used when the payment callback creates orders
    #[arg(long)]
    client_id: Option<String>,

    /// JSON file the meta frame posts back
    #[arg(long)]
    meta_payload: Option<PathBuf>,

    /// Simulate a page running in IE intranet mode
    #[arg(long)]
    ie_intranet: bool,

    /// Simulate a page without cross-domain bridge support
    #[arg(long)]
    no_bridge: bool,

    /// Fixed button session id instead of a random one
    #[arg(long)]
    button_session_id: Option<String>,
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match (&cli.config, cli.env) {
        (Some(path), _) => Config::from_path(path).into_diagnostic()?,
        (None, Some(env)) => Config::for_env(env),
        (None, None) => Config::default(),
    };
    if cli.config.is_some()
        && let Some(env) = cli.env
    {
        config.env = env;
    }
    if cli.test_mode {
        config.test_mode = true;
    }
    if cli.client_id.is_some() {
        config.client_id = cli.client_id.clone();
    }
    Ok(config)
}

fn init_tracing(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(io::stderr),
        )
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_tracing(&config.log_level);

    let payload: Value = match &cli.meta_payload {
        Some(path) => {
            let file = File::open(path).into_diagnostic()?;
            serde_json::from_reader(file).into_diagnostic()?
        }
        None => json!({ "iframeEligible": true, "iframeEligibleReason": "eligible" }),
    };
    let bridge = if cli.no_bridge {
        LoopbackBridge::unsupported()
    } else {
        LoopbackBridge::new().reply(META_MESSAGE, payload)
    };

    let journal = Journal::default();
    let telemetry = Arc::new(BufferedTelemetry::new());
    let ports = Ports {
        platform: Arc::new(StaticPlatform {
            ie_intranet: cli.ie_intranet,
            ..Default::default()
        }),
        telemetry: telemetry.clone(),
        bridge: Arc::new(bridge),
        navigator: Arc::new(RecordingNavigator::new(journal.clone())),
        request: Arc::new(InMemoryHttp::new()),
        orders: Arc::new(InMemoryOrderApi::new()),
    };
    let props = ButtonProps {
        button_session_id: cli.button_session_id.clone(),
        ..Default::default()
    };

    let simulator = Simulator::new(config, ports, props, journal.clone()).into_diagnostic()?;

    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = ScenarioReader::new(file);
    for event in reader.events() {
        match event {
            Ok(event) => {
                if let Err(e) = simulator.process(event).await {
                    eprintln!("Error processing event: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Error reading event: {}", e);
            }
        }
    }

    for entry in journal.entries() {
        eprintln!("{entry}");
    }

    let stdout = io::stdout();
    let mut writer = TelemetryWriter::new(stdout.lock());
    writer
        .write_events(telemetry.flushed_tracks())
        .into_diagnostic()?;

    Ok(())
}

use anyhow::Context;
use clap::{Parser, Subcommand};
use rosistrat_simulator::{
    config::{Config, ValidatedConfig},
    export, Api, Simulator,
};
use rosistrat_types::StrategyId;
use std::{path::PathBuf, sync::Arc};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Overrides the configured log level
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run one simulation and print its summary
    Run {
        #[arg(short, long)]
        strategy: Option<StrategyId>,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(long)]
        spins: Option<usize>,

        #[arg(long)]
        bankroll: Option<f64>,

        /// Also write every spin to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Draw every spin uniformly
        #[arg(long)]
        no_streaks: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse args
    let args = Args::parse();

    // Load config
    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(level) = args.log_level {
        config.log_level = level;
    }
    if let Command::Serve { port: Some(port) } = &args.command {
        config.port = *port;
    }
    let config = config.validate().context("invalid configuration")?;

    // Create logger
    let subscriber = tracing_subscriber::fmt().with_max_level(config.log_level);
    if config.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let simulator =
        Arc::new(Simulator::from_config(&config).context("failed to open history")?);
    match args.command {
        Command::Serve { .. } => serve(&config, simulator).await,
        Command::Run {
            strategy,
            seed,
            spins,
            bankroll,
            csv,
            no_streaks,
        } => {
            let mut settings = config.defaults.clone();
            if let Some(strategy) = strategy {
                settings = settings.for_strategy(strategy);
            }
            settings.seed = seed.or(settings.seed);
            settings.sequence_length = spins.unwrap_or(settings.sequence_length);
            settings.starting_bankroll = bankroll.unwrap_or(settings.starting_bankroll);
            settings.streaks.enabled &= !no_streaks;

            let body = serde_json::to_vec(&settings)?;
            let settings = simulator.resolve(&body)?;
            let report = simulator.simulate(&settings)?;
            if let Some(path) = csv {
                std::fs::write(&path, export::to_csv(&report.run))
                    .with_context(|| format!("failed to write {}", path.display()))?;
                info!("Wrote {} spins to {}", report.run.len(), path.display());
            }
            println!("{}", serde_json::to_string_pretty(&report.summary)?);
            Ok(())
        }
    }
}

async fn serve(config: &ValidatedConfig, simulator: Arc<Simulator>) -> anyhow::Result<()> {
    let api = Api::new(simulator);
    let app = api.router();

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on {}", addr);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .context("axum server error")?;

    Ok(())
}

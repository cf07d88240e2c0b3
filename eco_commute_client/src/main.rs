use std::{fs::OpenOptions, path::PathBuf, time::Duration};

use anyhow::Context;
use clap::{Parser, Subcommand};
use eco_commute_client::{
    ClientConfig, CommuteClient,
    render::{render_impact, render_plan, render_plan_state, render_selection},
    selector::ClickOutcome,
};
use eco_commute_lib::{Coordinate, distance_km, view::format_distance};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "eco-commute")]
#[command(about = "Plan low-emission commutes and track their impact", long_about = None)]
struct Cli {
    /// Base URL of the commute backend
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Base URL of the reverse geocoder
    #[arg(long, global = true)]
    geocoder_url: Option<String>,
    #[arg(long, global = true)]
    user_id: Option<i64>,
    /// Per-request limit in seconds
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,
    /// Also append logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a commute between two "lat,lng" points and log it as a trip
    Plan {
        #[arg(allow_hyphen_values = true)]
        origin: String,
        #[arg(allow_hyphen_values = true)]
        destination: String,
    },
    /// Replay map clicks through the point selector
    Pick {
        #[arg(allow_hyphen_values = true, required = true)]
        clicks: Vec<Coordinate>,
        /// Reset the selection after the clicks
        #[arg(long)]
        reset: bool,
        /// Plan the committed pair
        #[arg(long, conflicts_with = "reset")]
        plan: bool,
    },
    /// Show the latest logged trip and its explanation
    Impact,
    /// Great-circle distance between two points, without touching the network
    Distance {
        #[arg(allow_hyphen_values = true)]
        origin: Coordinate,
        #[arg(allow_hyphen_values = true)]
        destination: Coordinate,
    },
}

impl Cli {
    fn config(&self) -> anyhow::Result<ClientConfig> {
        let mut config = ClientConfig::from_env()?;
        if let Some(url) = &self.api_url {
            config.api_base_url = url.trim_end_matches('/').to_owned();
        }
        if let Some(url) = &self.geocoder_url {
            config.geocoder_url = url.trim_end_matches('/').to_owned();
        }
        if let Some(user_id) = self.user_id {
            config.user_id = user_id;
        }
        if let Some(secs) = self.timeout_secs {
            config.stage_timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    fn connect(&self) -> anyhow::Result<CommuteClient> {
        let config = self.config()?;
        Ok(CommuteClient::start(&config)?)
    }
}

fn init_tracing(log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            Some(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(file))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| format!("{}=info,eco_commute_lib=info", env!("CARGO_CRATE_NAME")).into())
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(())
}

fn print(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_ref())?;

    match &cli.command {
        Commands::Distance { origin, destination } => {
            println!("{}", format_distance(distance_km(*origin, *destination)));
        }
        Commands::Plan { origin, destination } => {
            let client = cli.connect()?;
            if let Err(err) = client.plan(origin, destination).await {
                tracing::debug!("Plan rejected: {err}");
            }
            print(render_plan_state(&client.plan_state().await));
        }
        Commands::Pick { clicks, reset, plan } => {
            let client = cli.connect()?;
            for at in clicks {
                if client.click(*at).await == ClickOutcome::Ignored {
                    println!("Ignored click at {at}, selection is locked");
                }
            }
            print(render_selection(&client.selection().await));

            if *reset {
                if client.reset_selection().await {
                    println!("Selection cleared.");
                } else {
                    println!("Nothing to reset, the selection is not locked.");
                }
            } else if *plan {
                match client.plan_selection().await {
                    Some(plan) => print(render_plan(&plan)),
                    None => println!("Select two points before planning."),
                }
            }
        }
        Commands::Impact => {
            let client = cli.connect()?;
            let refreshed = client.refresh_impact().await;
            print(render_impact(&refreshed.view));
        }
    }

    Ok(())
}

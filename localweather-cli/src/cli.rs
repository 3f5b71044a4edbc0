use anyhow::{Context, anyhow};
use clap::{Args, Parser, Subcommand};
use std::{sync::Arc, time::Duration};

use localweather_core::{
    Config, Coordinates, FusedLocation, LocationError, OpenWeatherClient, Permission, Pipeline,
    PipelineError, Session, WeatherSnapshot, config::API_KEY_ENV, render::Screen,
};

use crate::prompt;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "localweather", version, about = "Current weather where you are")]
pub struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the API key, location access and defaults interactively.
    Configure,

    /// Show the current weather for this machine's location.
    Show(ShowArgs),

    /// Print where the config file lives.
    ConfigPath,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Latitude to use instead of the configured location.
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude to use instead of the configured location.
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Language for the condition text, e.g. "de".
    #[arg(long)]
    pub lang: Option<String>,

    /// Print the snapshot as JSON instead of the screen.
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show(args) => show(args).await,
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
                Ok(())
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;
    prompt::configure(&mut config)?;
    config.validate()?;
    config.save()?;

    let path = Config::config_file_path()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

async fn show(args: ShowArgs) -> anyhow::Result<()> {
    let mut stored = Config::load()?;
    let mut effective = stored.clone();

    if let (Some(lat), Some(lon)) = (args.lat, args.lon) {
        let coords = Coordinates::new(lat, lon)?;
        effective.location.set_fixed_coordinates(Some(coords));
    }
    if args.lang.is_some() {
        effective.lang = args.lang.clone();
    }

    let api_key = effective.api_key().ok_or_else(|| {
        anyhow!(
            "No OpenWeather API key configured.\n\
             Hint: run `localweather configure` or set {API_KEY_ENV}."
        )
    })?;

    let permission = prompt::resolve_permission(effective.location.permission)?;

    loop {
        let pipeline = build_pipeline(&effective, &api_key, permission)?;

        let mut session = Session::init(pipeline);
        session.activate();
        let delivery = session.next_delivery().await;
        let screen = session.screen().clone();
        session.teardown().await;

        let delivery =
            delivery.ok_or_else(|| anyhow!("Weather activation produced no result"))?;

        match delivery.result {
            Ok(snapshot) => return print_weather(&screen, &snapshot, args.json),
            Err(PipelineError::Location(LocationError::ServiceDisabled)) => {
                if !prompt::location_off()? {
                    return Ok(());
                }

                turn_on_location(&mut stored);
                turn_on_location(&mut effective);
                stored.save()?;
                tracing::info!("location turned on, re-running activation");
            }
            Err(e) => return report_failure(e),
        }
    }
}

/// A denied permission prints its notice and exits cleanly; anything else
/// becomes an error carrying the user-facing message.
fn report_failure(e: PipelineError) -> anyhow::Result<()> {
    if let PipelineError::Location(LocationError::PermissionDenied) = e {
        eprintln!("{}", e.user_message());
        return Ok(());
    }

    let message = e.user_message();
    Err(anyhow::Error::new(e).context(message))
}

fn build_pipeline(
    config: &Config,
    api_key: &str,
    permission: Permission,
) -> anyhow::Result<Pipeline> {
    let timeout = Duration::from_secs(config.openweather.timeout_secs);

    let location = FusedLocation::from_config(&config.location, permission, timeout)
        .context("Failed to set up location service")?;
    let weather = OpenWeatherClient::from_config(api_key.to_owned(), &config.openweather)
        .context("Failed to set up weather client")?;

    Ok(Pipeline::new(Arc::new(location), Arc::new(weather), config.language()))
}

fn turn_on_location(config: &mut Config) {
    config.location.enabled = true;
    if config.location.fixed_coordinates().is_none() {
        config.location.network_lookup = true;
    }
}

fn print_weather(screen: &Screen, snapshot: &WeatherSnapshot, json: bool) -> anyhow::Result<()> {
    if json {
        let out = serde_json::to_string_pretty(snapshot)
            .context("Failed to serialize weather")?;
        println!("{out}");
        return Ok(());
    }

    for line in screen.lines() {
        println!("{line}");
    }
    Ok(())
}

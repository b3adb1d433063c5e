use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use weather_insights::config::LoggingConfig;
use weather_insights::geolocation::parse_coordinates;
use weather_insights::render::InsightsReport;
use weather_insights::web::{self, AppState};
use weather_insights::{
    Coordinates, CycleState, DeviceLocator, FixedGeolocator, Geolocator, InsightsConfig,
    InsightsSession, IpGeolocator, LivePipeline, LocationRequest, LocationResolver, MapStyle,
};

#[derive(Debug, Parser)]
#[command(name = "weather-insights")]
#[command(version, about = "Current weather, forecast and location details for any place")]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true, env = "WEATHER_INSIGHTS_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search for a place by name
    Search {
        /// Place name, e.g. "Paris" or "Springfield, IL"
        query: Vec<String>,
    },
    /// Insights for the current position
    Here {
        /// Use this position instead of a lookup, e.g. "48.8566,2.3522"
        #[arg(long, conflicts_with = "ip", allow_hyphen_values = true)]
        at: Option<String>,
        /// Approximate the position from the public IP address
        #[arg(long)]
        ip: bool,
    },
    /// List the quick-search presets
    Presets,
    /// Search repeatedly from a prompt
    Interactive {
        /// Approximate "here" from the public IP address
        #[arg(long)]
        ip: bool,
    },
    /// Serve the JSON API
    Serve {
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
}

fn init_logging(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { config.level.as_str() };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("Invalid log filter")?;

    // stdout is reserved for the report
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    if config.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

struct App {
    pipeline: LivePipeline,
    fallback: Coordinates,
}

impl App {
    fn new(config: &InsightsConfig) -> Result<Self> {
        Ok(Self {
            pipeline: LivePipeline::from_config(config)?,
            fallback: config.fallback_coordinates(),
        })
    }

    /// One full cycle; returns whether it produced insights
    async fn run_cycle<L: Geolocator + Sync>(
        &self,
        session: &mut InsightsSession,
        request: LocationRequest,
        locator: &L,
    ) -> bool {
        let generation = session.begin();
        let resolver = LocationResolver::new(self.pipeline.geocoder(), self.fallback);

        let outcome = match resolver.resolve(&request, locator).await {
            Ok(mut resolution) => {
                if let Some(notice) = resolution.notice.take() {
                    session.notify(generation, notice);
                }
                self.pipeline.run(resolution).await
            }
            Err(e) => Err(e),
        };

        session.complete(generation, outcome);
        print_session(session)
    }
}

fn print_session(session: &InsightsSession) -> bool {
    if let Some(notice) = session.notice() {
        eprintln!("⚠️  {}", notice.user_message());
    }

    match session.state() {
        CycleState::Ready(insights) => {
            if let Some(chart) = session.chart() {
                let report = InsightsReport {
                    insights,
                    chart,
                    map: session.map(),
                    now: Utc::now().timestamp(),
                };
                println!("{report}");
            }
            true
        }
        CycleState::Failed(e) => {
            tracing::debug!("Cycle failed: {:?}", e);
            eprintln!("❌ {}", e.user_message());
            false
        }
        CycleState::Idle | CycleState::Loading => false,
    }
}

fn print_presets(presets: &[String]) {
    println!("Popular cities:");
    for (index, name) in presets.iter().enumerate() {
        println!("  {}. {}", index + 1, name);
    }
}

fn device_locator(config: &InsightsConfig, at: Option<&str>, ip: bool) -> Result<DeviceLocator> {
    if let Some(at) = at {
        return Ok(DeviceLocator::Fixed(FixedGeolocator::at(parse_coordinates(at)?)));
    }
    if ip {
        return Ok(DeviceLocator::Ip(IpGeolocator::new(config)?));
    }
    Ok(DeviceLocator::Fixed(FixedGeolocator::unsupported()))
}

/// One line typed at the interactive prompt
#[derive(Debug, PartialEq)]
enum Prompt {
    Quit,
    Here,
    MapStyle(Result<MapStyle, String>),
    Search(String),
}

/// Interpret a prompt line; a preset number expands to its query
fn parse_prompt(line: &str, presets: &[String]) -> Prompt {
    let input = line.trim();
    let (command, rest) = input.split_once(char::is_whitespace).unwrap_or((input, ""));

    match command {
        "quit" | "exit" if rest.is_empty() => Prompt::Quit,
        "here" if rest.is_empty() => Prompt::Here,
        "map" => Prompt::MapStyle(rest.parse()),
        _ => {
            let query = input
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|index| presets.get(index))
                .map_or(input, String::as_str);
            Prompt::Search(query.to_string())
        }
    }
}

async fn interactive(app: &App, config: &InsightsConfig, locator: &DeviceLocator) -> Result<()> {
    let presets = &config.defaults.preset_queries;
    let mut session = InsightsSession::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print_presets(presets);
    println!("Type a place, a preset number, 'here', 'map standard|satellite' or 'quit'.");

    loop {
        print!("🔍 ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match parse_prompt(&line, presets) {
            Prompt::Quit => break,
            Prompt::Here => {
                app.run_cycle(&mut session, LocationRequest::Device, locator)
                    .await;
            }
            Prompt::MapStyle(Ok(style)) => {
                session.set_map_style(style);
                println!("🗺️  Map style: {}", style);
                if let Some(url) = session.map().center_tile_url() {
                    println!("   Tile: {url}");
                }
            }
            Prompt::MapStyle(Err(e)) => eprintln!("{e}"),
            Prompt::Search(query) => {
                app.run_cycle(&mut session, LocationRequest::Search(query), locator)
                    .await;
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = InsightsConfig::load_from_path(cli.config.clone())?;
    init_logging(&config.logging, cli.verbose)?;

    tracing::debug!("weather-insights {}", weather_insights::VERSION);

    match cli.command {
        Commands::Search { query } => {
            let app = App::new(&config)?;
            let mut session = InsightsSession::new();
            let ok = app
                .run_cycle(
                    &mut session,
                    LocationRequest::Search(query.join(" ")),
                    &FixedGeolocator::unsupported(),
                )
                .await;
            return Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE });
        }
        Commands::Here { at, ip } => {
            let app = App::new(&config)?;
            let locator = device_locator(&config, at.as_deref(), ip)?;
            let mut session = InsightsSession::new();
            let ok = app
                .run_cycle(&mut session, LocationRequest::Device, &locator)
                .await;
            return Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE });
        }
        Commands::Presets => print_presets(&config.defaults.preset_queries),
        Commands::Interactive { ip } => {
            let app = App::new(&config)?;
            let locator = device_locator(&config, None, ip)?;
            interactive(&app, &config, &locator).await?;
        }
        Commands::Serve { port } => {
            let state = AppState {
                pipeline: Arc::new(LivePipeline::from_config(&config)?),
                fallback: config.fallback_coordinates(),
                presets: Arc::new(config.defaults.preset_queries.clone()),
            };
            web::run(state, port).await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn presets() -> Vec<String> {
        vec!["London".to_string(), "Paris".to_string()]
    }

    #[rstest]
    #[case("quit", Prompt::Quit)]
    #[case("  exit ", Prompt::Quit)]
    #[case("here", Prompt::Here)]
    #[case("map satellite", Prompt::MapStyle(Ok(MapStyle::Satellite)))]
    #[case("map  standard", Prompt::MapStyle(Ok(MapStyle::Standard)))]
    #[case("2", Prompt::Search("Paris".to_string()))]
    #[case("7", Prompt::Search("7".to_string()))]
    #[case("Maputo", Prompt::Search("Maputo".to_string()))]
    #[case("maputo", Prompt::Search("maputo".to_string()))]
    #[case("maple ridge", Prompt::Search("maple ridge".to_string()))]
    #[case("here and there", Prompt::Search("here and there".to_string()))]
    fn test_parse_prompt(#[case] line: &str, #[case] expected: Prompt) {
        assert_eq!(parse_prompt(line, &presets()), expected);
    }

    #[test]
    fn test_unknown_map_style_is_reported() {
        assert!(matches!(
            parse_prompt("map terrain", &presets()),
            Prompt::MapStyle(Err(e)) if e.contains("terrain")
        ));
        assert!(matches!(parse_prompt("map", &presets()), Prompt::MapStyle(Err(_))));
    }
}

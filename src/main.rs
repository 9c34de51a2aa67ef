mod error_mapping;
mod render;

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use skycast_core::{AppError, Config, FavoritesError};
use skycast_weather::{
    Coordinates, Dashboard, FavoritesStore, GeocodeCredentials, GeocodeEndpoints,
    LocationNameChain, TemperatureUnit, WeatherProvider,
};

#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Current weather and 5-day forecasts")]
struct Cli {
    /// Temperature unit (defaults to the configured preference)
    #[arg(long, value_enum, global = true)]
    unit: Option<UnitArg>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Look up a city by name (defaults to the configured city)
    Search { city: Option<String> },
    /// Look up weather at a GPS position
    Locate {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },
    /// Manage favorite cities
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
}

#[derive(Debug, Subcommand)]
enum FavoritesAction {
    /// List favorites with current conditions
    List,
    Add {
        name: String,
        country: String,
        #[arg(long)]
        state: Option<String>,
    },
    Remove { id: String },
    Clear,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum UnitArg {
    Celsius,
    Fahrenheit,
}

impl From<UnitArg> for TemperatureUnit {
    fn from(unit: UnitArg) -> Self {
        match unit {
            UnitArg::Celsius => TemperatureUnit::Celsius,
            UnitArg::Fahrenheit => TemperatureUnit::Fahrenheit,
        }
    }
}

fn configured_unit(unit: skycast_core::TemperatureUnit) -> TemperatureUnit {
    match unit {
        skycast_core::TemperatureUnit::Celsius => TemperatureUnit::Celsius,
        skycast_core::TemperatureUnit::Fahrenheit => TemperatureUnit::Fahrenheit,
    }
}

fn build_dashboard(config: &Config, unit: TemperatureUnit) -> Result<Dashboard, AppError> {
    let weather = &config.weather;
    let weather_key = weather.resolved_api_key();
    let provider = WeatherProvider::with_base_url(
        weather_key.clone(),
        &weather.base_url,
        Duration::from_secs(weather.timeout_secs),
    )
    .map_err(error_mapping::weather)?;

    let names = LocationNameChain::with_client(
        provider.client(),
        GeocodeCredentials {
            google_api_key: config.geocoding.resolved_google_api_key(),
            openweather_api_key: weather_key,
        },
        GeocodeEndpoints {
            google_primary: config.geocoding.google_primary_url.clone(),
            google_legacy: config.geocoding.google_legacy_url.clone(),
            openweather_base: weather.base_url.clone(),
        },
    );
    tracing::debug!("Reverse geocoding via {:?}", names.available_steps());

    let favorites = FavoritesStore::open(config.favorites_path());
    Ok(Dashboard::new(provider, names, favorites, unit))
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let (config, _) = Config::load_validated()?;
    let unit = cli
        .unit
        .map(TemperatureUnit::from)
        .unwrap_or_else(|| configured_unit(config.weather.temperature_unit));
    tracing::debug!("Showing temperatures in {}", render::unit_name(unit));

    let mut dashboard = build_dashboard(&config, unit)?;

    let command = cli.command.unwrap_or(Command::Search { city: None });
    match command {
        Command::Search { city } => {
            let city = city.unwrap_or_else(|| config.weather.default_city.clone());
            let view = dashboard.search(&city).await.map_err(error_mapping::weather)?;
            print!("{}", render::view(&view, view.is_favorite(dashboard.favorites())));
        }
        Command::Locate { lat, lon } => {
            let coords = Coordinates::new(lat, lon)
                .map_err(|e| error_mapping::locate(e.into()))?;
            let view = dashboard.locate(coords).await.map_err(error_mapping::locate)?;
            print!("{}", render::view(&view, view.is_favorite(dashboard.favorites())));
        }
        Command::Favorites { action } => match action {
            FavoritesAction::List => {
                print!("{}", render::favorites(dashboard.favorites().list()));
                for (id, tile) in dashboard.favorite_tiles().await {
                    match tile {
                        Ok(current) => println!(
                            "  {} {} {}  💧 {}%  [{}]",
                            current.condition.icon(),
                            unit.format(current.temperature),
                            current.description,
                            current.humidity,
                            id
                        ),
                        Err(e) => println!("  ❌ unavailable ({})  [{}]", e, id),
                    }
                }
            }
            FavoritesAction::Add {
                name,
                country,
                state,
            } => {
                let favorites = dashboard
                    .favorites_mut()
                    .add(&name, &country, state.as_deref())
                    .map_err(error_mapping::favorites)?;
                print!("{}", render::favorites(favorites));
            }
            FavoritesAction::Remove { id } => {
                let removed = dashboard
                    .favorites_mut()
                    .remove(&id)
                    .map_err(error_mapping::favorites)?;
                if !removed {
                    return Err(FavoritesError::NotFound(id).into());
                }
                print!("{}", render::favorites(dashboard.favorites().list()));
            }
            FavoritesAction::Clear => {
                dashboard
                    .favorites_mut()
                    .clear()
                    .map_err(error_mapping::favorites)?;
                println!("Favorites cleared.");
            }
        },
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    skycast_core::init()?;

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        tracing::error!("{}", e);
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }

    Ok(())
}

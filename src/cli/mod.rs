use crate::{
    types::{date_range, DateKey, Itinerary, Place},
    PhotoLookup, PlannerConfig, PlannerError, RecommendationMode, TripPlanner,
};
use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::{path::Path, time::Duration};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn build_command() -> Command {
    Command::new("trip-planner")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Place recommendations, day-by-day itineraries and destination photos")
        .subcommand_required(true)
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("MODEL")
                .global(true)
                .help("Chat model to use (or set OPENAI_MODEL)"),
        )
        .arg(
            Arg::new("api-key")
                .short('k')
                .long("api-key")
                .value_name("KEY")
                .global(true)
                .help("OpenAI API key (or set OPENAI_API_KEY env var)"),
        )
        .arg(
            Arg::new("base-url")
                .short('u')
                .long("base-url")
                .value_name("URL")
                .global(true)
                .help("Chat completion base URL (or set OPENAI_BASE_URL)"),
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .value_name("SECONDS")
                .global(true)
                .value_parser(clap::value_parser!(u64))
                .help("Request timeout in seconds"),
        )
        .subcommand(
            Command::new("recommend")
                .about("Ask for five places to visit")
                .arg(destination_arg())
                .arg(list_arg("current", "Places already on the itinerary"))
                .arg(list_arg("past", "Places visited on a previous trip"))
                .arg(
                    Arg::new("mode")
                        .long("mode")
                        .value_name("MODE")
                        .value_parser(["new", "old", "mix"])
                        .default_value("new")
                        .help("Favour new places, revisits or a mix"),
                ),
        )
        .subcommand(
            Command::new("distribute")
                .about("Spread places over trip days and merge into an itinerary")
                .arg(destination_arg())
                .arg(
                    Arg::new("places")
                        .long("places")
                        .value_name("FILE")
                        .required(true)
                        .help("JSON array of places ({name, desc?, image?, geometry?})"),
                )
                .arg(list_arg("dates", "Trip dates as DD-MM-YYYY"))
                .arg(
                    Arg::new("start")
                        .long("start")
                        .value_name("YYYY-MM-DD")
                        .requires("end")
                        .conflicts_with("dates")
                        .help("First trip day"),
                )
                .arg(
                    Arg::new("end")
                        .long("end")
                        .value_name("YYYY-MM-DD")
                        .requires("start")
                        .help("Last trip day"),
                )
                .arg(
                    Arg::new("itinerary")
                        .long("itinerary")
                        .value_name("FILE")
                        .help("Existing itinerary JSON to merge into"),
                ),
        )
        .subcommand(
            Command::new("photo")
                .about("Find a photo URL for a place or trip")
                .arg(
                    Arg::new("query")
                        .help("Free-text search query")
                        .required(true)
                        .action(ArgAction::Set)
                        .index(1),
                ),
        )
}

fn destination_arg() -> Arg {
    Arg::new("destination")
        .short('d')
        .long("destination")
        .value_name("NAME")
        .required(true)
        .help("Trip destination")
}

fn list_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_name("A,B,...")
        .value_delimiter(',')
        .action(ArgAction::Append)
        .help(help)
}

fn list_values(matches: &ArgMatches, name: &str) -> Vec<String> {
    matches
        .get_many::<String>(name)
        .map(|values| {
            values
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn resolve_config(matches: &ArgMatches) -> Result<PlannerConfig, PlannerError> {
    let mut config = PlannerConfig::from_env()?;

    if let Some(key) = matches.get_one::<String>("api-key") {
        config.openai_api_key = Some(key.clone());
    }
    if let Some(model) = matches.get_one::<String>("model") {
        config.model = model.clone();
    }
    if let Some(base_url) = matches.get_one::<String>("base-url") {
        config.openai_base_url = base_url.clone();
    }
    if let Some(seconds) = matches.get_one::<u64>("timeout") {
        config.timeout = Duration::from_secs(*seconds);
    }

    config.validate()?;
    Ok(config)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn parse_day(raw: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("`{raw}` is not a YYYY-MM-DD date"))
}

fn resolve_dates(matches: &ArgMatches) -> anyhow::Result<Vec<DateKey>> {
    if let (Some(start), Some(end)) = (
        matches.get_one::<String>("start"),
        matches.get_one::<String>("end"),
    ) {
        let dates = date_range(parse_day(start)?, parse_day(end)?);
        if dates.is_empty() {
            bail!("--end must not be before --start");
        }
        return Ok(dates);
    }

    let dates: Vec<DateKey> = list_values(matches, "dates")
        .into_iter()
        .map(DateKey::from)
        .collect();
    if dates.is_empty() {
        bail!("provide --dates or --start/--end");
    }
    Ok(dates)
}

async fn run_recommend(planner: &TripPlanner, matches: &ArgMatches) -> anyhow::Result<()> {
    let destination = matches
        .get_one::<String>("destination")
        .context("missing --destination")?;
    let mode: RecommendationMode = matches
        .get_one::<String>("mode")
        .map(String::as_str)
        .unwrap_or("new")
        .parse()?;

    info!("Requesting {} recommendations for {}", mode, destination);
    let recommendations = planner
        .get_recommendations(
            destination,
            &list_values(matches, "current"),
            &list_values(matches, "past"),
            mode,
        )
        .await?;

    println!("{}", serde_json::to_string_pretty(&recommendations)?);
    Ok(())
}

async fn run_distribute(planner: &TripPlanner, matches: &ArgMatches) -> anyhow::Result<()> {
    let destination = matches
        .get_one::<String>("destination")
        .context("missing --destination")?;
    let places_path = matches
        .get_one::<String>("places")
        .context("missing --places")?;
    let places: Vec<Place> = read_json(Path::new(places_path))?;
    let dates = resolve_dates(matches)?;
    let existing: Itinerary = match matches.get_one::<String>("itinerary") {
        Some(path) => read_json(Path::new(path))?,
        None => Itinerary::new(),
    };

    info!(
        "Distributing {} places over {} days in {}",
        places.len(),
        dates.len(),
        destination
    );
    let itinerary = planner
        .distribute(&places, &dates, destination, &existing)
        .await?;

    println!("{}", serde_json::to_string_pretty(&itinerary)?);
    Ok(())
}

async fn run_photo(photos: &PhotoLookup, matches: &ArgMatches) -> anyhow::Result<()> {
    let query = matches
        .get_one::<String>("query")
        .context("missing query")?;

    match photos.lookup_photo(query).await {
        Some(url) => {
            println!("{}", url);
            Ok(())
        }
        None => bail!("no photo found for `{query}`"),
    }
}

async fn dispatch(config: &PlannerConfig, matches: &ArgMatches) -> anyhow::Result<()> {
    match matches.subcommand() {
        Some(("recommend", sub)) => run_recommend(&TripPlanner::from_config(config)?, sub).await,
        Some(("distribute", sub)) => {
            run_distribute(&TripPlanner::from_config(config)?, sub).await
        }
        // Photo search only needs the photo key.
        Some(("photo", sub)) => run_photo(&PhotoLookup::from_config(config)?, sub).await,
        _ => bail!("unknown subcommand"),
    }
}

/// CLI entry point for the trip-planner tool
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let matches = build_command().get_matches();
    let config = resolve_config(&matches)?;

    let outcome = dispatch(&config, &matches).await;

    if let Err(e) = outcome {
        error!("trip-planner failed: {:#}", e);
        return Err(e.into());
    }

    Ok(())
}

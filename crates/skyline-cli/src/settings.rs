//! Command-line arguments and layered settings.
//!
//! Precedence, lowest first: built-in defaults, the TOML config file,
//! `SKYLINE_*` environment variables, command-line flags.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use serde::Deserialize;

/// Config file read when `--config` is not given. Optional.
const DEFAULT_CONFIG_FILE: &str = "skyline.toml";

#[derive(Parser, Debug, Default)]
#[command(name = "skyline", about = "Browse flights, airports and passengers in the terminal")]
pub struct Cli {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE")]
  pub config: Option<PathBuf>,

  /// Directory holding the schema database files.
  #[arg(long, value_name = "DIR")]
  pub data_dir: Option<PathBuf>,

  /// Schema (database) name.
  #[arg(long)]
  pub schema: Option<String>,

  /// Airport import file, read only when seeding a fresh schema.
  #[arg(long, value_name = "FILE")]
  pub airports: Option<PathBuf>,

  /// Flight import file, read only when seeding a fresh schema.
  #[arg(long, value_name = "FILE")]
  pub flights: Option<PathBuf>,

  /// Base URL of the random name service.
  #[arg(long)]
  pub names_url: Option<String>,

  /// Use built-in names instead of the name service.
  #[arg(long)]
  pub offline: bool,

  /// Seed for flight shuffling and passenger generation.
  #[arg(long)]
  pub seed: Option<u64>,

  /// Log file; the terminal is owned by the UI.
  #[arg(long, value_name = "FILE")]
  pub log_file: Option<PathBuf>,
}

/// Resolved runtime settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  pub data_dir:     PathBuf,
  pub schema:       String,
  pub airports_csv: PathBuf,
  pub flights_csv:  PathBuf,
  pub csv_headers:  bool,
  pub names_url:    String,
  pub offline:      bool,
  pub seed:         Option<u64>,
  pub log_file:     PathBuf,
}

impl Settings {
  pub fn load(cli: &Cli) -> anyhow::Result<Self> {
    let file = match &cli.config {
      Some(path) => config::File::from(path.clone()).required(true),
      None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let path_str = |p: &Option<PathBuf>| p.as_ref().map(|p| p.display().to_string());

    let settings = config::Config::builder()
      .set_default("data_dir", ".")?
      .set_default("schema", "flights")?
      .set_default("airports_csv", "iata_codes.csv")?
      .set_default("flights_csv", "flights.csv")?
      .set_default("csv_headers", true)?
      .set_default("names_url", "https://random-data-api.com")?
      .set_default("offline", false)?
      .set_default("log_file", "skyline.log")?
      .add_source(file)
      .add_source(config::Environment::with_prefix("SKYLINE"))
      .set_override_option("data_dir", path_str(&cli.data_dir))?
      .set_override_option("schema", cli.schema.clone())?
      .set_override_option("airports_csv", path_str(&cli.airports))?
      .set_override_option("flights_csv", path_str(&cli.flights))?
      .set_override_option("names_url", cli.names_url.clone())?
      .set_override_option("offline", cli.offline.then_some(true))?
      .set_override_option("seed", cli.seed)?
      .set_override_option("log_file", path_str(&cli.log_file))?
      .build()
      .context("failed to read configuration")?;

    settings
      .try_deserialize()
      .context("failed to deserialise settings")
  }
}

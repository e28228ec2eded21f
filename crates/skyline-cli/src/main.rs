//! `skyline`: terminal browser for flights, airports and passengers.
//!
//! # Usage
//!
//! ```
//! skyline --airports iata_codes.csv --flights flights.csv
//! skyline --config skyline.toml --offline --seed 7
//! ```

mod app;
mod names;
mod nav;
mod settings;
mod ui;

use std::{fs::OpenOptions, io, sync::Mutex, time::Duration};

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use names::{Names, OfflineNames, RandomDataApi};
use rand::{SeedableRng, rngs::StdRng};
use ratatui::{Terminal, backend::CrosstermBackend};
use settings::{Cli, Settings};
use skyline_core::model::SeedData;
use skyline_import::{ImportOptions, load_seed_data};
use skyline_store_sqlite::{Bootstrap, SqliteStore, ensure_ready};
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();
  let settings = Settings::load(&cli)?;

  init_tracing(&settings)?;

  let store = SqliteStore::open(&settings.data_dir, &settings.schema)
    .await
    .with_context(|| {
      format!("opening schema {:?} in {}", settings.schema, settings.data_dir.display())
    })?;

  bootstrap(&store, &settings).await?;

  let mut app = App::new(store.clone());

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // Run the event loop; restore terminal even on error.
  let run_result = match app.load().await {
    Ok(()) => run_event_loop(&mut terminal, &mut app).await,
    Err(e) => Err(e),
  };

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  drop(app);
  if let Err(e) = store.close().await {
    tracing::warn!(error = %e, "closing store failed");
  }
  tracing::info!("shut down");

  run_result
}

/// Log to a file; stdout belongs to the terminal UI.
fn init_tracing(settings: &Settings) -> Result<()> {
  let file = OpenOptions::new()
    .create(true)
    .append(true)
    .open(&settings.log_file)
    .with_context(|| format!("opening log file {}", settings.log_file.display()))?;

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(Mutex::new(file))
    .with_ansi(false)
    .init();
  Ok(())
}

// ─── Bootstrap ────────────────────────────────────────────────────────────────

async fn bootstrap(store: &SqliteStore, settings: &Settings) -> Result<()> {
  // Import files are only required when there is something to seed.
  let seed = if store.is_ready().await? {
    SeedData::default()
  } else {
    load_seed_data(
      &settings.airports_csv,
      &settings.flights_csv,
      ImportOptions { has_headers: settings.csv_headers },
    )
    .context("reading seed data")?
  };

  let names = if settings.offline {
    Names::Offline(settings.seed.map_or_else(OfflineNames::new, OfflineNames::seeded))
  } else {
    Names::Api(RandomDataApi::new(&settings.names_url).context("building name client")?)
  };

  let mut rng = match settings.seed {
    Some(seed) => StdRng::seed_from_u64(seed),
    None => StdRng::from_entropy(),
  };

  match ensure_ready(store, &seed, &names, &mut rng).await? {
    Bootstrap::AlreadyReady => tracing::info!(schema = store.schema(), "schema already seeded"),
    Bootstrap::Seeded(report) if report.total_failures() > 0 => tracing::warn!(
      schema = store.schema(),
      failures = report.total_failures(),
      "schema seeded with skipped rows"
    ),
    Bootstrap::Seeded(_) => {}
  }
  Ok(())
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    match maybe_event {
      Some(Event::Key(key)) if key.kind == KeyEventKind::Press => {
        if !app.handle_key(key).await {
          break;
        }
      }
      // Resize and the rest redraw on the next iteration.
      _ => {}
    }
  }

  Ok(())
}

//! One-time creation and seeding of a schema.
//!
//! A schema counts as present once `PRAGMA user_version` carries the ready
//! marker, which is written only after every seeding phase has committed.
//! Against a present schema [`ensure_ready`] reads nothing and writes
//! nothing. A schema left half-seeded by an interrupted run is resumed: the
//! DDL is idempotent and each phase only runs if its table is still empty.
//!
//! Seeding is best effort per row. A failed insert is logged and recorded in
//! the phase's [`PhaseReport`], the remaining rows are still attempted, and
//! the phase commits.

use std::fmt;

use rand::{Rng, seq::SliceRandom};
use skyline_core::{
  model::{AirportRecord, FlightRecord, PersonName, SeedData},
  names::NameSource,
};

use crate::{
  Result, SqliteStore,
  schema::{READY_VERSION, SCHEMA},
};

/// Names requested from the name source per flight.
pub const NAME_BATCH: usize = 10;
/// Passengers per flight are drawn uniformly from `1..=MAX_PASSENGERS_PER_FLIGHT`.
pub const MAX_PASSENGERS_PER_FLIGHT: usize = 10;
pub const PHONE_DIGITS: usize = 10;

// ─── Reports ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  Airports,
  Flights,
  Passengers,
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Phase::Airports => "iata_codes",
      Phase::Flights => "flights",
      Phase::Passengers => "passengers",
    })
  }
}

/// A row that could not be seeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFailure {
  /// Human-readable identification of the row, e.g. `JFK` or `flight 12`.
  pub row:    String,
  pub reason: String,
}

/// Outcome of one seeding phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseReport {
  pub phase:    Phase,
  pub inserted: usize,
  pub failures: Vec<RowFailure>,
}

impl PhaseReport {
  fn new(phase: Phase) -> Self { Self { phase, inserted: 0, failures: Vec::new() } }

  fn fail(&mut self, row: impl Into<String>, reason: impl fmt::Display) {
    self.failures.push(RowFailure { row: row.into(), reason: reason.to_string() });
  }

  fn log(&self) {
    for failure in &self.failures {
      tracing::warn!(
        phase = %self.phase,
        row = %failure.row,
        reason = %failure.reason,
        "seed row skipped"
      );
    }
    tracing::info!(
      phase = %self.phase,
      inserted = self.inserted,
      failed = self.failures.len(),
      "seed phase committed"
    );
  }
}

/// Per-phase outcome of a seeding run. `None` means the phase was skipped
/// because its table already held rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
  pub airports:   Option<PhaseReport>,
  pub flights:    Option<PhaseReport>,
  pub passengers: Option<PhaseReport>,
}

impl SeedReport {
  pub fn total_failures(&self) -> usize {
    [&self.airports, &self.flights, &self.passengers]
      .into_iter()
      .flatten()
      .map(|p| p.failures.len())
      .sum()
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bootstrap {
  /// The schema was already present; nothing was touched.
  AlreadyReady,
  Seeded(SeedReport),
}

// ─── Readiness ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
struct RowCounts {
  airports:   i64,
  flights:    i64,
  passengers: i64,
}

impl SqliteStore {
  /// Whether the schema carries the ready marker.
  pub async fn is_ready(&self) -> Result<bool> {
    let version: i64 = self
      .conn()
      .call(|conn| Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?))
      .await?;
    Ok(version >= READY_VERSION)
  }

  async fn row_counts(&self) -> Result<RowCounts> {
    let counts = self
      .conn()
      .call(|conn| {
        let count = |table: &str| -> rusqlite::Result<i64> {
          conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        };
        Ok(RowCounts {
          airports:   count("iata_codes")?,
          flights:    count("flights")?,
          passengers: count("passengers")?,
        })
      })
      .await?;
    Ok(counts)
  }

  async fn flight_ids(&self) -> Result<Vec<i64>> {
    let ids = self
      .conn()
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT id FROM flights ORDER BY id")?;
        let ids = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
      })
      .await?;
    Ok(ids)
  }
}

// ─── Entry point ─────────────────────────────────────────────────────────────

/// Bring the store's schema to a seeded, queryable state.
///
/// `seed` is only read when seeding is needed. Flights are inserted in an
/// order shuffled with `rng`, which also drives passenger generation.
pub async fn ensure_ready<N, R>(
  store: &SqliteStore,
  seed: &SeedData,
  names: &N,
  rng: &mut R,
) -> Result<Bootstrap>
where
  N: NameSource,
  R: Rng + Send,
{
  if store.is_ready().await? {
    tracing::info!(schema = store.schema(), "schema present, skipping bootstrap");
    return Ok(Bootstrap::AlreadyReady);
  }

  tracing::info!(schema = store.schema(), "creating schema");
  store
    .conn()
    .call(|conn| {
      conn.execute_batch(SCHEMA)?;
      Ok(())
    })
    .await?;

  let counts = store.row_counts().await?;
  let mut report = SeedReport::default();

  if counts.airports == 0 {
    tracing::info!("populating iata_codes table");
    report.airports = Some(seed_airports(store, &seed.airports).await?);
  }

  let mut seeded_flights = None;
  if counts.flights == 0 {
    tracing::info!("populating flights table");
    let mut records = seed.flights.clone();
    records.shuffle(rng);
    let (phase, ids) = seed_flights(store, records).await?;
    report.flights = Some(phase);
    seeded_flights = Some(ids);
  }

  if counts.passengers == 0 {
    tracing::info!("populating passengers table");
    let flight_ids = match seeded_flights {
      Some(ids) => ids,
      None => store.flight_ids().await?,
    };
    report.passengers = Some(seed_passengers(store, &flight_ids, names, rng).await?);
  }

  store
    .conn()
    .call(|conn| {
      conn.pragma_update(None, "user_version", READY_VERSION)?;
      Ok(())
    })
    .await?;

  tracing::info!(
    schema = store.schema(),
    failures = report.total_failures(),
    "bootstrap complete"
  );
  Ok(Bootstrap::Seeded(report))
}

// ─── Phases ──────────────────────────────────────────────────────────────────

async fn seed_airports(store: &SqliteStore, records: &[AirportRecord]) -> Result<PhaseReport> {
  let records = records.to_vec();
  let report = store
    .conn()
    .call(move |conn| {
      let tx = conn.transaction()?;
      let mut report = PhaseReport::new(Phase::Airports);
      {
        let mut stmt =
          tx.prepare("INSERT INTO iata_codes (code, city, country) VALUES (?1, ?2, ?3)")?;
        for r in &records {
          let country = (!r.country.is_empty()).then_some(r.country.as_str());
          match stmt.execute(rusqlite::params![r.code, r.city, country]) {
            Ok(_) => report.inserted += 1,
            Err(e) => report.fail(r.code.as_str(), e),
          }
        }
      }
      tx.commit()?;
      Ok(report)
    })
    .await?;

  report.log();
  Ok(report)
}

/// Returns the phase report and the ids assigned to the inserted flights.
async fn seed_flights(
  store: &SqliteStore,
  records: Vec<FlightRecord>,
) -> Result<(PhaseReport, Vec<i64>)> {
  let (report, ids) = store
    .conn()
    .call(move |conn| {
      let tx = conn.transaction()?;
      let mut report = PhaseReport::new(Phase::Flights);
      let mut ids = Vec::with_capacity(records.len());
      {
        let mut stmt = tx.prepare(
          "INSERT INTO flights (iata_departure, iata_arrival, price, distance)
           VALUES (?1, ?2, ?3, ?4)",
        )?;
        for r in &records {
          match stmt.execute(rusqlite::params![
            r.iata_departure,
            r.iata_arrival,
            r.price,
            r.distance
          ]) {
            Ok(_) => {
              report.inserted += 1;
              ids.push(tx.last_insert_rowid());
            }
            Err(e) => report.fail(
              format!("{}->{} (import id {})", r.iata_departure, r.iata_arrival, r.id),
              e,
            ),
          }
        }
      }
      tx.commit()?;
      Ok((report, ids))
    })
    .await?;

  report.log();
  Ok((report, ids))
}

struct NewPassenger {
  flight_id:  i64,
  first_name: String,
  last_name:  String,
  phone:      String,
}

async fn seed_passengers<N, R>(
  store: &SqliteStore,
  flight_ids: &[i64],
  names: &N,
  rng: &mut R,
) -> Result<PhaseReport>
where
  N: NameSource,
  R: Rng + Send,
{
  let mut report = PhaseReport::new(Phase::Passengers);
  let mut pending = Vec::new();

  for &flight_id in flight_ids {
    let batch = match names.fetch_names(NAME_BATCH).await {
      Ok(batch) if !batch.is_empty() => batch,
      Ok(_) => {
        report.fail(format!("flight {flight_id}"), "name source returned no names");
        continue;
      }
      Err(e) => {
        report.fail(format!("flight {flight_id}"), format_args!("name source: {e}"));
        continue;
      }
    };

    let count = rng.gen_range(1..=MAX_PASSENGERS_PER_FLIGHT);
    for _ in 0..count {
      pending.push(generate_passenger(flight_id, &batch, rng));
    }
  }

  let (inserted, failures) = store
    .conn()
    .call(move |conn| {
      let tx = conn.transaction()?;
      let mut inserted = 0usize;
      let mut failures = Vec::new();
      {
        let mut stmt = tx.prepare(
          "INSERT INTO passengers (first_name, last_name, phone, flight_id)
           VALUES (?1, ?2, ?3, ?4)",
        )?;
        for p in &pending {
          match stmt.execute(rusqlite::params![p.first_name, p.last_name, p.phone, p.flight_id]) {
            Ok(_) => inserted += 1,
            Err(e) => failures.push(RowFailure {
              row:    format!("{} {} (flight {})", p.first_name, p.last_name, p.flight_id),
              reason: e.to_string(),
            }),
          }
        }
      }
      tx.commit()?;
      Ok((inserted, failures))
    })
    .await?;

  report.inserted = inserted;
  report.failures.extend(failures);
  report.log();
  Ok(report)
}

/// First and last name are drawn independently from the batch.
fn generate_passenger<R: Rng>(flight_id: i64, batch: &[PersonName], rng: &mut R) -> NewPassenger {
  let first = &batch[rng.gen_range(0..batch.len())];
  let last = &batch[rng.gen_range(0..batch.len())];
  NewPassenger {
    flight_id,
    first_name: first.first_name.clone(),
    last_name: last.last_name.clone(),
    phone: random_phone(rng),
  }
}

pub fn random_phone<R: Rng>(rng: &mut R) -> String {
  (0..PHONE_DIGITS)
    .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
    .collect()
}

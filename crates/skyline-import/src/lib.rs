//! CSV import of the airport and flight records used to seed a schema.
//!
//! Both files are read positionally, so header names do not matter:
//!
//! - `iata_codes.csv`: `code,city,country`
//! - `flights.csv`: `id,iata_departure,iata_arrival,price,distance`

pub mod error;

use std::{fs::File, io::Read, path::Path};

use serde::de::DeserializeOwned;
use skyline_core::model::{AirportRecord, FlightRecord, SeedData};

pub use error::{Error, Result};

/// Options shared by both files.
#[derive(Debug, Clone, Copy)]
pub struct ImportOptions {
  /// Skip the first line of each file.
  pub has_headers: bool,
}

impl Default for ImportOptions {
  fn default() -> Self { Self { has_headers: true } }
}

/// Read airport records from `reader`. `origin` names the input in errors.
pub fn read_airports<R: Read>(
  reader: R,
  origin: &str,
  opts: ImportOptions,
) -> Result<Vec<AirportRecord>> {
  read_records(reader, origin, opts)
}

/// Read flight records from `reader`. `origin` names the input in errors.
pub fn read_flights<R: Read>(
  reader: R,
  origin: &str,
  opts: ImportOptions,
) -> Result<Vec<FlightRecord>> {
  read_records(reader, origin, opts)
}

/// Load both files into the bootstrapper's input.
pub fn load_seed_data(
  airports: impl AsRef<Path>,
  flights: impl AsRef<Path>,
  opts: ImportOptions,
) -> Result<SeedData> {
  let airports = read_airports(open(airports.as_ref())?, &origin(airports.as_ref()), opts)?;
  let flights = read_flights(open(flights.as_ref())?, &origin(flights.as_ref()), opts)?;
  tracing::info!(
    airports = airports.len(),
    flights = flights.len(),
    "import loaded"
  );
  Ok(SeedData { airports, flights })
}

fn open(path: &Path) -> Result<File> {
  File::open(path).map_err(|source| Error::Io { path: path.to_path_buf(), source })
}

fn origin(path: &Path) -> String { path.display().to_string() }

fn read_records<T, R>(reader: R, origin: &str, opts: ImportOptions) -> Result<Vec<T>>
where
  T: DeserializeOwned,
  R: Read,
{
  let csv_err = |source: csv::Error| Error::Csv { origin: origin.to_owned(), source };

  let mut rdr = csv::ReaderBuilder::new()
    .has_headers(opts.has_headers)
    .trim(csv::Trim::All)
    .from_reader(reader);

  let mut out = Vec::new();
  for record in rdr.records() {
    let record = record.map_err(csv_err)?;
    if record.iter().all(str::is_empty) {
      continue;
    }
    out.push(record.deserialize(None).map_err(csv_err)?);
  }
  Ok(out)
}

//! [`SqliteStore`]: the SQLite implementation of [`FlightQueries`].

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use rusqlite::OptionalExtension as _;
use skyline_core::{
  model::Flight,
  query::{BucketAverage, FlightQueries, GroupAverage, PassengerFare, Predicate},
  table::{Column, Table, TableDescriptor, validate_identifier},
  value::Row,
};

use crate::{
  Error, Result,
  encode::{column_list, decode_value, encode_predicate, read_values},
  schema::CONNECTION_PRAGMAS,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A handle to one schema, stored as `<data_dir>/<schema>.sqlite3`.
///
/// Cloning is cheap: clones share the same connection, and every call on it
/// runs to completion before the next one starts.
#[derive(Clone)]
pub struct SqliteStore {
  conn:   tokio_rusqlite::Connection,
  schema: Arc<str>,
}

impl SqliteStore {
  /// Connect to the schema named `schema` inside `data_dir`.
  ///
  /// The file is created if missing, but its tables are not: that is the
  /// bootstrapper's job.
  pub async fn open(data_dir: impl AsRef<Path>, schema: &str) -> Result<Self> {
    validate_identifier(schema)?;
    let path = data_dir.as_ref().join(format!("{schema}.sqlite3"));
    let conn = tokio_rusqlite::Connection::open(path.clone())
      .await
      .map_err(|source| Error::ConnectionFailure { path: path.clone(), source })?;
    Self::init(conn, schema, path).await
  }

  /// Open a throwaway in-memory schema, for tests.
  pub async fn open_in_memory(schema: &str) -> Result<Self> {
    validate_identifier(schema)?;
    let path = PathBuf::from(":memory:");
    let conn = tokio_rusqlite::Connection::open_in_memory()
      .await
      .map_err(|source| Error::ConnectionFailure { path: path.clone(), source })?;
    Self::init(conn, schema, path).await
  }

  async fn init(conn: tokio_rusqlite::Connection, schema: &str, path: PathBuf) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(CONNECTION_PRAGMAS)?;
        Ok(())
      })
      .await
      .map_err(|source| Error::ConnectionFailure { path: path.clone(), source })?;

    tracing::debug!(schema, path = %path.display(), "store connected");
    Ok(Self { conn, schema: Arc::from(schema) })
  }

  pub fn schema(&self) -> &str { &self.schema }

  pub(crate) fn conn(&self) -> &tokio_rusqlite::Connection { &self.conn }

  /// Close the connection. Queries on remaining clones fail with
  /// [`Error::StoreUnavailable`].
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    tracing::debug!(schema = %self.schema, "store closed");
    Ok(())
  }
}

// ─── FlightQueries impl ──────────────────────────────────────────────────────

impl FlightQueries for SqliteStore {
  type Error = Error;

  async fn list_tables(&self) -> Result<Vec<TableDescriptor>> {
    let names: Vec<String> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT name FROM sqlite_master
           WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
           ORDER BY name",
        )?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(
      names
        .iter()
        .filter_map(|name| match name.parse::<Table>() {
          Ok(table) => Some(TableDescriptor::new(table)),
          Err(_) => {
            tracing::debug!(table = %name, "ignoring unknown table");
            None
          }
        })
        .collect(),
    )
  }

  async fn select_all(&self, table: Table) -> Result<Vec<Row>> {
    let columns = table.columns();
    let width = columns.len();
    let sql = format!(
      "SELECT {} FROM {table} ORDER BY rowid",
      column_list(columns)
    );

    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], |row| read_values(row, width))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(
      raws
        .into_iter()
        .map(|values| Row(values.into_iter().map(decode_value).collect()))
        .collect(),
    )
  }

  async fn flights_joined_with_airports(&self) -> Result<Vec<Flight>> {
    let flights = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT
             f.iata_departure, dep.city,
             f.iata_arrival,   arr.city,
             f.price, f.distance
           FROM flights f
           INNER JOIN iata_codes dep ON dep.code = f.iata_departure
           INNER JOIN iata_codes arr ON arr.code = f.iata_arrival
           ORDER BY f.price DESC, f.id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(Flight {
              departure_code: row.get(0)?,
              departure_city: row.get(1)?,
              arrival_code:   row.get(2)?,
              arrival_city:   row.get(3)?,
              price:          row.get(4)?,
              distance:       row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(flights)
  }

  async fn passengers_joined_with_flights(&self) -> Result<Vec<PassengerFare>> {
    let fares = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT
             p.first_name, p.last_name,
             f.iata_departure, f.iata_arrival, f.price
           FROM passengers p
           INNER JOIN flights f ON f.id = p.flight_id
           ORDER BY p.id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(PassengerFare {
              first_name:     row.get(0)?,
              last_name:      row.get(1)?,
              departure_code: row.get(2)?,
              arrival_code:   row.get(3)?,
              price:          row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(fares)
  }

  async fn average_by(
    &self,
    group: Column,
    aggregate: Column,
    table: Table,
  ) -> Result<Vec<GroupAverage>> {
    table.check_columns(&[group, aggregate])?;
    let sql = format!(
      "SELECT {group}, AVG({aggregate}) FROM {table} GROUP BY {group} ORDER BY {group}"
    );

    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], |row| {
            Ok((row.get::<_, rusqlite::types::Value>(0)?, row.get::<_, Option<f64>>(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(
      raws
        .into_iter()
        .map(|(group, average)| GroupAverage { group: decode_value(group), average })
        .collect(),
    )
  }

  async fn average_bucketed(
    &self,
    column: Column,
    bucket_width: u32,
    aggregate: Column,
    table: Table,
  ) -> Result<Vec<BucketAverage>> {
    if bucket_width == 0 {
      return Err(skyline_core::Error::InvalidBucketWidth.into());
    }
    table.check_columns(&[column, aggregate])?;

    // Integer division; inputs are assumed non-negative so it equals floor.
    let sql = format!(
      "SELECT CAST({column} / ?1 AS INTEGER) AS bucket, AVG({aggregate})
       FROM {table}
       WHERE {column} IS NOT NULL
       GROUP BY bucket
       ORDER BY bucket"
    );
    let width = i64::from(bucket_width);

    let buckets = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![width], |row| {
            Ok(BucketAverage { bucket: row.get(0)?, average: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(buckets)
  }

  async fn flight_by_id(&self, id: i64) -> Result<Option<Row>> {
    let width = Table::Flights.columns().len();
    let sql = format!(
      "SELECT {} FROM flights WHERE id = ?1",
      column_list(Table::Flights.columns())
    );

    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id], |row| read_values(row, width))
            .optional()?,
        )
      })
      .await?;

    Ok(raw.map(|values| Row(values.into_iter().map(decode_value).collect())))
  }

  async fn conditional_average<'a>(
    &'a self,
    table: Table,
    aggregate: Column,
    predicate: &'a Predicate,
  ) -> Result<Option<f64>> {
    let mut referenced = predicate.columns();
    referenced.push(aggregate);
    table.check_columns(&referenced)?;

    let mut params = Vec::new();
    let condition = encode_predicate(predicate, &mut params);
    let sql = format!("SELECT AVG({aggregate}) FROM {table} WHERE {condition}");

    let average = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&sql, rusqlite::params_from_iter(params), |row| {
          row.get::<_, Option<f64>>(0)
        })?)
      })
      .await?;
    Ok(average)
  }
}

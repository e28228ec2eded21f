//! The `FlightQueries` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `skyline-store-sqlite`).
//! The navigation layer depends on this abstraction, not on a concrete
//! backend.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
  model::Flight,
  table::{Column, Table, TableDescriptor},
  value::{Row, Value},
};

// ─── Predicates ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
  Eq,
  Ne,
  Lt,
  Le,
  Gt,
  Ge,
}

impl Comparison {
  pub fn operator(self) -> &'static str {
    match self {
      Comparison::Eq => "=",
      Comparison::Ne => "<>",
      Comparison::Lt => "<",
      Comparison::Le => "<=",
      Comparison::Gt => ">",
      Comparison::Ge => ">=",
    }
  }
}

/// A boolean filter over one table's columns. Values are bound, never
/// interpolated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
  Compare { column: Column, op: Comparison, value: Value },
  And(Vec<Predicate>),
}

impl Predicate {
  pub fn eq(column: Column, value: impl Into<Value>) -> Self {
    Predicate::Compare { column, op: Comparison::Eq, value: value.into() }
  }

  pub fn compare(column: Column, op: Comparison, value: impl Into<Value>) -> Self {
    Predicate::Compare { column, op, value: value.into() }
  }

  pub fn and(self, other: Predicate) -> Self {
    match self {
      Predicate::And(mut parts) => {
        parts.push(other);
        Predicate::And(parts)
      }
      first => Predicate::And(vec![first, other]),
    }
  }

  /// Every column referenced anywhere in the predicate.
  pub fn columns(&self) -> Vec<Column> {
    match self {
      Predicate::Compare { column, .. } => vec![*column],
      Predicate::And(parts) => parts.iter().flat_map(Predicate::columns).collect(),
    }
  }
}

// ─── Result rows ─────────────────────────────────────────────────────────────

/// One row of [`FlightQueries::passengers_joined_with_flights`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassengerFare {
  pub first_name:     String,
  pub last_name:      String,
  pub departure_code: String,
  pub arrival_code:   String,
  pub price:          i64,
}

/// One group of [`FlightQueries::average_by`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupAverage {
  pub group:   Value,
  pub average: Option<f64>,
}

/// One bucket of [`FlightQueries::average_bucketed`].
///
/// Bucket `k` covers the half-open range `[k * width, (k + 1) * width)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketAverage {
  pub bucket:  i64,
  pub average: Option<f64>,
}

impl BucketAverage {
  /// Inclusive lower bound of the bucket's range.
  pub fn lower_bound(&self, width: u32) -> i64 { self.bucket * i64::from(width) }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// The read-only query layer over the three tables.
///
/// Each method is a single parametrised query. Nothing is cached between
/// calls.
pub trait FlightQueries: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The physical tables present in the schema, ordered by name.
  fn list_tables(
    &self,
  ) -> impl Future<Output = Result<Vec<TableDescriptor>, Self::Error>> + Send + '_;

  /// Every row of `table` in insertion order.
  fn select_all(
    &self,
    table: Table,
  ) -> impl Future<Output = Result<Vec<Row>, Self::Error>> + Send + '_;

  /// Flights joined with the airports table on both ends, most expensive
  /// first.
  fn flights_joined_with_airports(
    &self,
  ) -> impl Future<Output = Result<Vec<Flight>, Self::Error>> + Send + '_;

  /// Passengers joined with the route and price of their flight.
  fn passengers_joined_with_flights(
    &self,
  ) -> impl Future<Output = Result<Vec<PassengerFare>, Self::Error>> + Send + '_;

  /// `AVG(aggregate)` per distinct value of `group`.
  fn average_by(
    &self,
    group: Column,
    aggregate: Column,
    table: Table,
  ) -> impl Future<Output = Result<Vec<GroupAverage>, Self::Error>> + Send + '_;

  /// `AVG(aggregate)` per bucket `column / bucket_width`, ascending.
  fn average_bucketed(
    &self,
    column: Column,
    bucket_width: u32,
    aggregate: Column,
    table: Table,
  ) -> impl Future<Output = Result<Vec<BucketAverage>, Self::Error>> + Send + '_;

  /// Point lookup of a raw `flights` row. `None` if absent.
  fn flight_by_id(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Row>, Self::Error>> + Send + '_;

  /// `AVG(aggregate)` over the rows matching `predicate`; `None` if no row
  /// matches.
  fn conditional_average<'a>(
    &'a self,
    table: Table,
    aggregate: Column,
    predicate: &'a Predicate,
  ) -> impl Future<Output = Result<Option<f64>, Self::Error>> + Send + 'a;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn and_flattens_and_collects_columns() {
    let p = Predicate::eq(Column::IataDeparture, "JFK")
      .and(Predicate::compare(Column::Price, Comparison::Ge, 100_i64))
      .and(Predicate::compare(Column::Distance, Comparison::Lt, 500_i64));
    let Predicate::And(parts) = &p else { panic!("expected And") };
    assert_eq!(parts.len(), 3);
    assert_eq!(
      p.columns(),
      vec![Column::IataDeparture, Column::Price, Column::Distance]
    );
  }

  #[test]
  fn bucket_lower_bound() {
    let b = BucketAverage { bucket: 2, average: Some(1.0) };
    assert_eq!(b.lower_bound(100), 200);
  }
}

//! Error types for `skyline-core`.

use thiserror::Error;

use crate::table::{Column, Table};

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid identifier: {0:?}")]
  InvalidIdentifier(String),

  #[error("unknown table: {0:?}")]
  UnknownTable(String),

  #[error("column {column} does not belong to table {table}")]
  ColumnNotInTable { column: Column, table: Table },

  #[error("bucket width must be positive")]
  InvalidBucketWidth,

  /// A raw row did not hold the expected kind of value at `index`.
  #[error("unexpected value at column {index}: expected {expected}")]
  UnexpectedValue { index: usize, expected: &'static str },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

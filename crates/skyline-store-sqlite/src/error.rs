//! Error type for `skyline-store-sqlite`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] skyline_core::Error),

  /// The store could not be opened or configured. Fatal at startup.
  #[error("cannot connect to store at {}: {source}", path.display())]
  ConnectionFailure {
    path:   PathBuf,
    #[source]
    source: tokio_rusqlite::Error,
  },

  /// The connection was closed underneath a query.
  #[error("store unavailable: connection closed")]
  StoreUnavailable,

  #[error("query failed: {0}")]
  Query(tokio_rusqlite::Error),
}

impl From<tokio_rusqlite::Error> for Error {
  fn from(e: tokio_rusqlite::Error) -> Self {
    match e {
      tokio_rusqlite::Error::ConnectionClosed => Error::StoreUnavailable,
      other => Error::Query(other),
    }
  }
}

impl From<rusqlite::Error> for Error {
  fn from(e: rusqlite::Error) -> Self { Error::Query(tokio_rusqlite::Error::Rusqlite(e)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

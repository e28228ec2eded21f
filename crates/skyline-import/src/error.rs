//! Error type for `skyline-import`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("cannot read {}: {source}", path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// A malformed record; `source` carries the record position.
  #[error("{origin}: {source}")]
  Csv {
    origin: String,
    #[source]
    source: csv::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

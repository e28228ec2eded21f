//! SQLite backend for the Skyline flight browser.
//!
//! Wraps [`tokio_rusqlite`] so the one connection lives on its own thread and
//! every query is serialised through it. Provides the query layer
//! ([`SqliteStore`] implements [`skyline_core::query::FlightQueries`]) and the
//! one-time [`bootstrap`] of a fresh schema.

mod encode;
mod schema;
mod store;

pub mod bootstrap;
pub mod error;

pub use bootstrap::{Bootstrap, PhaseReport, RowFailure, SeedReport, ensure_ready};
pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;

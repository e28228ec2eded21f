//! Core types and trait definitions for the Skyline flight browser.
//!
//! This crate is free of database, terminal and HTTP dependencies. The store
//! backend implements [`query::FlightQueries`]; the navigation layer consumes
//! it.

// Native `async fn` in traits; the returned futures are declared `Send`
// explicitly where it matters.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod item;
pub mod model;
pub mod names;
pub mod query;
pub mod table;
pub mod value;

pub use error::{Error, Result};

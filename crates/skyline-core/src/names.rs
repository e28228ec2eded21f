//! The name-generation boundary used while seeding passengers.

use std::future::Future;

use crate::model::PersonName;

/// A source of random first/last name pairs.
pub trait NameSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Return a batch of up to `count` names. An empty batch is treated as a
  /// failure by callers.
  fn fetch_names(
    &self,
    count: usize,
  ) -> impl Future<Output = Result<Vec<PersonName>, Self::Error>> + Send + '_;
}

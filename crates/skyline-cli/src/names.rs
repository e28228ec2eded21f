//! Name sources for passenger seeding.

use std::{
  sync::{Mutex, PoisonError},
  time::Duration,
};

use rand::{Rng, SeedableRng, rngs::StdRng};
use reqwest::{Client, StatusCode};
use skyline_core::{model::PersonName, names::NameSource};

#[derive(Debug, thiserror::Error)]
pub enum NamesError {
  #[error("name request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("name service returned {0}")]
  Status(StatusCode),
}

// ─── HTTP ─────────────────────────────────────────────────────────────────────

/// Client for the random-data-api.com name endpoint.
#[derive(Clone)]
pub struct RandomDataApi {
  client:   Client,
  base_url: String,
}

impl RandomDataApi {
  pub fn new(base_url: &str) -> Result<Self, NamesError> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self { client, base_url: base_url.trim_end_matches('/').to_owned() })
  }
}

impl NameSource for RandomDataApi {
  type Error = NamesError;

  /// `GET {base}/api/name/random_name?size=<count>`
  async fn fetch_names(&self, count: usize) -> Result<Vec<PersonName>, NamesError> {
    let resp = self
      .client
      .get(format!("{}/api/name/random_name", self.base_url))
      .query(&[("size", count)])
      .send()
      .await?;

    if !resp.status().is_success() {
      return Err(NamesError::Status(resp.status()));
    }
    Ok(resp.json().await?)
  }
}

// ─── Offline ──────────────────────────────────────────────────────────────────

const FIRST_NAMES: &[&str] = &[
  "Ada", "Alan", "Barbara", "Claude", "Dennis", "Edsger", "Frances", "Grace", "Hedy", "John",
  "Katherine", "Ken", "Linus", "Margaret", "Niklaus", "Radia", "Shafi", "Tim", "Whitfield",
  "Yukihiro",
];

const LAST_NAMES: &[&str] = &[
  "Allen", "Backus", "Cerf", "Dijkstra", "Engelbart", "Goldwasser", "Hamilton", "Hopper",
  "Johnson", "Kay", "Knuth", "Lamarr", "Liskov", "Lovelace", "McCarthy", "Perlman", "Ritchie",
  "Shannon", "Thompson", "Turing",
];

/// Draws names from built-in lists. Never fails.
pub struct OfflineNames {
  rng: Mutex<StdRng>,
}

impl OfflineNames {
  pub fn new() -> Self { Self { rng: Mutex::new(StdRng::from_entropy()) } }

  pub fn seeded(seed: u64) -> Self { Self { rng: Mutex::new(StdRng::seed_from_u64(seed)) } }
}

impl Default for OfflineNames {
  fn default() -> Self { Self::new() }
}

impl NameSource for OfflineNames {
  type Error = NamesError;

  async fn fetch_names(&self, count: usize) -> Result<Vec<PersonName>, NamesError> {
    let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
    Ok(
      (0..count)
        .map(|_| PersonName {
          first_name: FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())].to_owned(),
          last_name:  LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())].to_owned(),
        })
        .collect(),
    )
  }
}

// ─── Selection ────────────────────────────────────────────────────────────────

/// The name source picked by configuration.
pub enum Names {
  Api(RandomDataApi),
  Offline(OfflineNames),
}

impl NameSource for Names {
  type Error = NamesError;

  async fn fetch_names(&self, count: usize) -> Result<Vec<PersonName>, NamesError> {
    match self {
      Names::Api(api) => api.fetch_names(count).await,
      Names::Offline(offline) => offline.fetch_names(count).await,
    }
  }
}

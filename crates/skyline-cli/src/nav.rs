//! The three-level selection state machine.
//!
//! Root list (tables) → item list → detail. Every selection decides which
//! queries run and rebuilds the lists below it; nothing is cached between
//! selections.

use std::fmt::Write as _;

use skyline_core::{
  item::{Item, NOT_AVAILABLE},
  model::{Airport, Passenger, Route},
  query::{BucketAverage, FlightQueries, Predicate},
  table::{Column, Table, TableDescriptor},
};

/// Distance bucket width for the flight summary.
pub const DISTANCE_BUCKET_WIDTH: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
  RootList,
  ItemList,
  DetailView,
}

#[derive(Debug, thiserror::Error)]
pub enum NavError<E: std::error::Error + 'static> {
  #[error(transparent)]
  Query(E),

  #[error("malformed row: {0}")]
  Row(#[from] skyline_core::Error),
}

pub type NavResult<T, E> = std::result::Result<T, NavError<E>>;

// ─── Navigator ───────────────────────────────────────────────────────────────

/// Owns the transient display lists; the only caller of the query layer.
pub struct Navigator<Q> {
  queries: Q,
  level:   Level,
  tables:  Vec<TableDescriptor>,
  /// Table whose items are currently listed.
  current: Option<TableDescriptor>,
  items:   Vec<Item>,
  summary: String,
  detail:  Option<String>,
}

impl<Q: FlightQueries> Navigator<Q> {
  pub fn new(queries: Q) -> Self {
    Self {
      queries,
      level: Level::RootList,
      tables: Vec::new(),
      current: None,
      items: Vec::new(),
      summary: String::new(),
      detail: None,
    }
  }

  pub fn level(&self) -> Level { self.level }

  pub fn tables(&self) -> &[TableDescriptor] { &self.tables }

  pub fn current_table(&self) -> Option<TableDescriptor> { self.current }

  pub fn items(&self) -> &[Item] { &self.items }

  pub fn summary(&self) -> &str { &self.summary }

  pub fn detail(&self) -> Option<&str> { self.detail.as_deref() }

  /// Fill the root list with the schema's tables.
  pub async fn populate_root(&mut self) -> NavResult<(), Q::Error> {
    self.tables = self.queries.list_tables().await.map_err(NavError::Query)?;
    self.level = Level::RootList;
    self.current = None;
    self.items.clear();
    self.summary.clear();
    self.detail = None;
    Ok(())
  }

  /// Root list selection: rebuild the item list and summary for `table`.
  ///
  /// On failure the item list is left empty, the summary carries the error,
  /// and the error is returned for display.
  pub async fn select_table(&mut self, table: TableDescriptor) -> NavResult<(), Q::Error> {
    self.level = Level::ItemList;
    self.current = Some(table);
    self.detail = None;

    match self.load_items(table.table).await {
      Ok((items, summary)) => {
        self.items = items;
        self.summary = summary;
        Ok(())
      }
      Err(e) => {
        tracing::warn!(table = %table.table, error = %e, "loading items failed");
        self.items.clear();
        self.summary = format!("Error: {e}");
        Err(e)
      }
    }
  }

  /// Item list selection: render the detail text of item `index`.
  ///
  /// Returns `None` (and changes nothing) when `index` is out of range.
  pub fn select_item(&mut self, index: usize) -> Option<&str> {
    let text = self.items.get(index)?.render_detail();
    self.level = Level::DetailView;
    self.detail = Some(text);
    self.detail.as_deref()
  }

  async fn load_items(&self, table: Table) -> NavResult<(Vec<Item>, String), Q::Error> {
    match table {
      Table::Flights => self.load_flights().await,
      Table::Passengers => self.load_passengers().await,
      Table::IataCodes => self.load_airports().await,
    }
  }

  async fn load_flights(&self) -> NavResult<(Vec<Item>, String), Q::Error> {
    let flights = self
      .queries
      .flights_joined_with_airports()
      .await
      .map_err(NavError::Query)?;
    let buckets = self
      .queries
      .average_bucketed(
        Column::Distance,
        DISTANCE_BUCKET_WIDTH,
        Column::Price,
        Table::Flights,
      )
      .await
      .map_err(NavError::Query)?;

    let summary = flights_summary(flights.len(), &buckets);
    Ok((flights.into_iter().map(Item::Flight).collect(), summary))
  }

  async fn load_passengers(&self) -> NavResult<(Vec<Item>, String), Q::Error> {
    let rows = self
      .queries
      .select_all(Table::Passengers)
      .await
      .map_err(NavError::Query)?;

    let mut items = Vec::with_capacity(rows.len());
    for row in &rows {
      let flight_id = row.integer(4)?;
      let route = match self
        .queries
        .flight_by_id(flight_id)
        .await
        .map_err(NavError::Query)?
      {
        Some(flight) => Some(Route::from_flight_row(&flight)?),
        None => None,
      };
      items.push(Item::Passenger(Passenger::from_row(row, route)?));
    }

    let summary = format!("Total passengers: {}", items.len());
    Ok((items, summary))
  }

  async fn load_airports(&self) -> NavResult<(Vec<Item>, String), Q::Error> {
    let rows = self
      .queries
      .select_all(Table::IataCodes)
      .await
      .map_err(NavError::Query)?;

    let mut items = Vec::with_capacity(rows.len());
    for row in &rows {
      let departs_here = Predicate::eq(Column::IataDeparture, row.text(0)?);
      let avg_price = self
        .queries
        .conditional_average(Table::Flights, Column::Price, &departs_here)
        .await
        .map_err(NavError::Query)?;
      let avg_distance = self
        .queries
        .conditional_average(Table::Flights, Column::Distance, &departs_here)
        .await
        .map_err(NavError::Query)?;
      items.push(Item::Airport(Airport::from_row(row, avg_price, avg_distance)?));
    }

    let summary = format!("Total airports: {}", items.len());
    Ok((items, summary))
  }
}

/// `Total number of flights: N` followed by one `≥{lower} ${avg}` line per
/// distance bucket. Averages are truncated to whole currency units.
pub fn flights_summary(count: usize, buckets: &[BucketAverage]) -> String {
  let mut s = format!("Total number of flights: {count}\n");
  for b in buckets {
    let avg = match b.average {
      Some(avg) => (avg.trunc() as i64).to_string(),
      None => NOT_AVAILABLE.to_owned(),
    };
    let _ = writeln!(s, "≥{} ${avg}", b.lower_bound(DISTANCE_BUCKET_WIDTH));
  }
  s
}

#[cfg(test)]
mod tests {
  use rand::{SeedableRng, rngs::StdRng};
  use skyline_core::model::{AirportRecord, FlightRecord, SeedData};
  use skyline_store_sqlite::{SqliteStore, ensure_ready};

  use super::*;
  use crate::names::OfflineNames;

  fn seed_data() -> SeedData {
    let airport = |code: &str, city: &str| AirportRecord {
      code:    code.into(),
      city:    city.into(),
      country: "Somewhere".into(),
    };
    let flight = |dep: &str, arr: &str, price, distance| FlightRecord {
      id: String::new(),
      iata_departure: dep.into(),
      iata_arrival: arr.into(),
      price,
      distance,
    };
    SeedData {
      airports: vec![
        airport("JFK", "New York"),
        airport("LAX", "Los Angeles"),
        airport("SFO", "San Francisco"),
      ],
      flights:  vec![
        flight("JFK", "LAX", 100, 250),
        flight("JFK", "SFO", 300, 199),
        flight("LAX", "JFK", 220, 260),
      ],
    }
  }

  async fn navigator() -> Navigator<SqliteStore> {
    let store = SqliteStore::open_in_memory("flights").await.unwrap();
    let mut rng = StdRng::seed_from_u64(42);
    ensure_ready(&store, &seed_data(), &OfflineNames::seeded(42), &mut rng)
      .await
      .unwrap();
    let mut nav = Navigator::new(store);
    nav.populate_root().await.unwrap();
    nav
  }

  fn table(t: Table) -> TableDescriptor { TableDescriptor::new(t) }

  #[test]
  fn summary_lists_buckets_in_order() {
    let buckets = [
      BucketAverage { bucket: 1, average: Some(300.0) },
      BucketAverage { bucket: 2, average: Some(160.5) },
      BucketAverage { bucket: 3, average: None },
    ];
    assert_eq!(
      flights_summary(3, &buckets),
      "Total number of flights: 3\n≥100 $300\n≥200 $160\n≥300 $N/A\n"
    );
  }

  #[tokio::test]
  async fn root_list_holds_the_three_tables() {
    let nav = navigator().await;
    assert_eq!(nav.level(), Level::RootList);
    let names: Vec<_> = nav.tables().iter().map(|t| t.name()).collect();
    assert_eq!(names, ["flights", "iata_codes", "passengers"]);
  }

  #[tokio::test]
  async fn selecting_flights_lists_joined_flights_with_summary() {
    let mut nav = navigator().await;
    nav.select_table(table(Table::Flights)).await.unwrap();

    assert_eq!(nav.level(), Level::ItemList);
    let labels: Vec<_> = nav.items().iter().map(Item::label).collect();
    assert_eq!(labels, ["JFK -> SFO", "LAX -> JFK", "JFK -> LAX"]);
    assert_eq!(
      nav.summary(),
      "Total number of flights: 3\n≥100 $300\n≥200 $160\n"
    );
  }

  #[tokio::test]
  async fn selecting_airports_attaches_outbound_averages() {
    let mut nav = navigator().await;
    nav.select_table(table(Table::IataCodes)).await.unwrap();
    assert_eq!(nav.summary(), "Total airports: 3");

    let detail = nav.select_item(0).unwrap().to_owned();
    assert!(detail.starts_with("Code: JFK\n"));
    assert!(detail.contains("Average price to destinations: $200\n"));

    let sfo = nav.select_item(2).unwrap();
    assert!(sfo.contains("Average price to destinations: $N/A\n"));
    assert!(sfo.contains("Average distance to destinations: N/Akm\n"));
  }

  #[tokio::test]
  async fn selecting_passengers_resolves_flight_routes() {
    let mut nav = navigator().await;
    nav.select_table(table(Table::Passengers)).await.unwrap();

    let count = nav.items().len();
    assert!((3..=30).contains(&count));
    assert_eq!(nav.summary(), format!("Total passengers: {count}"));

    let routes = ["JFK->LAX", "JFK->SFO", "LAX->JFK"];
    for i in 0..count {
      let detail = nav.select_item(i).unwrap();
      let flight_line = detail.lines().last().unwrap();
      let route = flight_line.strip_prefix("Flight: ").unwrap();
      assert!(routes.contains(&route), "unexpected route {route}");
    }
  }

  #[tokio::test]
  async fn reselecting_an_item_renders_identical_text() {
    let mut nav = navigator().await;
    nav.select_table(table(Table::Flights)).await.unwrap();

    let first = nav.select_item(1).unwrap().to_owned();
    nav.select_item(0);
    let again = nav.select_item(1).unwrap().to_owned();
    assert_eq!(first, again);
    assert_eq!(nav.level(), Level::DetailView);
  }

  #[tokio::test]
  async fn out_of_range_item_changes_nothing() {
    let mut nav = navigator().await;
    nav.select_table(table(Table::Flights)).await.unwrap();
    assert!(nav.select_item(99).is_none());
    assert_eq!(nav.level(), Level::ItemList);
    assert!(nav.detail().is_none());
  }

  #[tokio::test]
  async fn new_table_selection_discards_previous_detail() {
    let mut nav = navigator().await;
    nav.select_table(table(Table::Flights)).await.unwrap();
    nav.select_item(0);
    nav.select_table(table(Table::IataCodes)).await.unwrap();
    assert_eq!(nav.level(), Level::ItemList);
    assert!(nav.detail().is_none());
    assert_eq!(nav.current_table(), Some(table(Table::IataCodes)));
  }

  #[tokio::test]
  async fn query_failure_leaves_an_empty_error_state() {
    let store = SqliteStore::open_in_memory("flights").await.unwrap();
    let mut nav = Navigator::new(store.clone());
    store.close().await.unwrap();

    let err = nav.select_table(table(Table::Flights)).await.unwrap_err();
    assert!(matches!(
      err,
      NavError::Query(skyline_store_sqlite::Error::StoreUnavailable)
    ));
    assert!(nav.items().is_empty());
    assert!(nav.summary().starts_with("Error: "));
    assert_eq!(nav.level(), Level::ItemList);
  }
}

//! Integration tests for `SqliteStore` and the bootstrapper against
//! in-memory databases.

use std::sync::atomic::{AtomicUsize, Ordering};

use rand::{SeedableRng, rngs::StdRng};
use skyline_core::{
  model::{AirportRecord, FlightRecord, PersonName, SeedData},
  names::NameSource,
  query::{Comparison, FlightQueries, Predicate},
  table::{Column, Table},
  value::Value,
};

use crate::{Bootstrap, Error, SqliteStore, bootstrap::Phase, ensure_ready};

// ─── Fixtures ────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("name service down")]
struct NamesDown;

/// Always answers with `count` predictable names.
struct FixedNames;

impl NameSource for FixedNames {
  type Error = NamesDown;

  async fn fetch_names(&self, count: usize) -> Result<Vec<PersonName>, NamesDown> {
    Ok(
      (0..count)
        .map(|i| PersonName {
          first_name: format!("First{i}"),
          last_name:  format!("Last{i}"),
        })
        .collect(),
    )
  }
}

/// Fails on exactly one call (zero-based).
struct FlakyNames {
  calls:   AtomicUsize,
  failing: usize,
}

impl NameSource for FlakyNames {
  type Error = NamesDown;

  async fn fetch_names(&self, count: usize) -> Result<Vec<PersonName>, NamesDown> {
    let call = self.calls.fetch_add(1, Ordering::SeqCst);
    if call == self.failing {
      return Err(NamesDown);
    }
    FixedNames.fetch_names(count).await
  }
}

fn airport(code: &str, city: &str, country: &str) -> AirportRecord {
  AirportRecord { code: code.into(), city: city.into(), country: country.into() }
}

fn flight(id: u32, dep: &str, arr: &str, price: i64, distance: i64) -> FlightRecord {
  FlightRecord {
    id:             id.to_string(),
    iata_departure: dep.into(),
    iata_arrival:   arr.into(),
    price,
    distance,
  }
}

fn seed_data() -> SeedData {
  SeedData {
    airports: vec![
      airport("JFK", "New York", "United States"),
      airport("LAX", "Los Angeles", "United States"),
      airport("ORD", "Chicago", "United States"),
      airport("CDG", "Paris", "France"),
    ],
    flights:  vec![
      flight(1, "JFK", "LAX", 100, 250),
      flight(2, "JFK", "ORD", 300, 199),
      flight(3, "LAX", "ORD", 150, 120),
      flight(4, "ORD", "JFK", 80, 30),
      flight(5, "LAX", "JFK", 420, 290),
    ],
  }
}

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory("flights")
    .await
    .expect("in-memory store")
}

async fn seeded_with(data: &SeedData, rng_seed: u64) -> SqliteStore {
  let s = store().await;
  let mut rng = StdRng::seed_from_u64(rng_seed);
  ensure_ready(&s, data, &FixedNames, &mut rng)
    .await
    .expect("bootstrap");
  s
}

async fn seeded() -> SqliteStore { seeded_with(&seed_data(), 7).await }

/// `(total_changes(), schema_version)` of the connection.
async fn mutation_counters(s: &SqliteStore) -> (i64, i64) {
  s.conn()
    .call(|conn| {
      let changes = conn.query_row("SELECT total_changes()", [], |r| r.get(0))?;
      let version = conn.query_row("PRAGMA schema_version", [], |r| r.get(0))?;
      Ok((changes, version))
    })
    .await
    .unwrap()
}

// ─── Connection ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn open_in_missing_directory_is_connection_failure() {
  let err = SqliteStore::open("/definitely/not/a/dir", "flights")
    .await
    .err()
    .expect("open should fail");
  assert!(matches!(err, Error::ConnectionFailure { .. }));
}

#[tokio::test]
async fn schema_name_must_be_identifier() {
  let err = SqliteStore::open_in_memory("flights; drop").await.err().unwrap();
  assert!(matches!(err, Error::Core(skyline_core::Error::InvalidIdentifier(_))));
}

#[tokio::test]
async fn closed_connection_reports_store_unavailable() {
  let s = seeded().await;
  let other = s.clone();
  s.close().await.unwrap();

  let err = other.list_tables().await.unwrap_err();
  assert!(matches!(err, Error::StoreUnavailable));
}

// ─── Bootstrap ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn bootstrap_seeds_every_phase() {
  let s = store().await;
  assert!(!s.is_ready().await.unwrap());

  let mut rng = StdRng::seed_from_u64(1);
  let outcome = ensure_ready(&s, &seed_data(), &FixedNames, &mut rng)
    .await
    .unwrap();
  let Bootstrap::Seeded(report) = outcome else { panic!("expected Seeded") };

  assert_eq!(report.airports.as_ref().unwrap().inserted, 4);
  assert_eq!(report.flights.as_ref().unwrap().inserted, 5);
  assert_eq!(report.total_failures(), 0);
  assert!(s.is_ready().await.unwrap());

  let passengers = s.select_all(Table::Passengers).await.unwrap();
  assert_eq!(passengers.len(), report.passengers.as_ref().unwrap().inserted);
  // 1..=10 passengers for each of the five flights.
  assert!((5..=50).contains(&passengers.len()));

  for row in &passengers {
    let phone = row.text(3).unwrap();
    assert_eq!(phone.len(), 10);
    assert!(phone.chars().all(|c| c.is_ascii_digit()));
    assert!(row.text(1).unwrap().starts_with("First"));
    assert!(row.text(2).unwrap().starts_with("Last"));
  }

  let flights = s.select_all(Table::Flights).await.unwrap();
  for id in flights.iter().map(|r| r.integer(0).unwrap()) {
    let n = passengers
      .iter()
      .filter(|p| p.integer(4).unwrap() == id)
      .count();
    assert!((1..=10).contains(&n), "flight {id} has {n} passengers");
  }
}

#[tokio::test]
async fn second_bootstrap_touches_nothing() {
  let s = seeded().await;
  let before = mutation_counters(&s).await;

  // Different seed data must not matter: it is never read.
  let mut rng = StdRng::seed_from_u64(99);
  let outcome = ensure_ready(&s, &SeedData::default(), &FixedNames, &mut rng)
    .await
    .unwrap();

  assert_eq!(outcome, Bootstrap::AlreadyReady);
  assert_eq!(mutation_counters(&s).await, before);
  assert_eq!(s.select_all(Table::Flights).await.unwrap().len(), 5);
}

#[tokio::test]
async fn seeding_continues_past_failing_rows() {
  let mut data = seed_data();
  data.airports.push(airport("JFK", "Duplicate", "Nowhere"));
  data.flights.push(flight(6, "JFK", "XXX", 10, 10));

  let s = store().await;
  let mut rng = StdRng::seed_from_u64(3);
  let Bootstrap::Seeded(report) = ensure_ready(&s, &data, &FixedNames, &mut rng)
    .await
    .unwrap()
  else {
    panic!("expected Seeded");
  };

  let airports = report.airports.unwrap();
  assert_eq!(airports.inserted, 4);
  assert_eq!(airports.failures.len(), 1);
  assert_eq!(airports.failures[0].row, "JFK");

  let flights = report.flights.unwrap();
  assert_eq!(flights.phase, Phase::Flights);
  assert_eq!(flights.inserted, 5);
  assert_eq!(flights.failures.len(), 1);
  assert!(flights.failures[0].row.starts_with("JFK->XXX"));

  // The phases committed despite the failures.
  assert_eq!(s.select_all(Table::IataCodes).await.unwrap().len(), 4);
  assert_eq!(s.select_all(Table::Flights).await.unwrap().len(), 5);
  assert!(s.is_ready().await.unwrap());
}

#[tokio::test]
async fn name_source_failure_skips_only_that_flight() {
  let s = store().await;
  let names = FlakyNames { calls: AtomicUsize::new(0), failing: 2 };
  let mut rng = StdRng::seed_from_u64(5);
  let Bootstrap::Seeded(report) = ensure_ready(&s, &seed_data(), &names, &mut rng)
    .await
    .unwrap()
  else {
    panic!("expected Seeded");
  };

  let passengers = report.passengers.unwrap();
  assert_eq!(passengers.failures.len(), 1);
  assert!(passengers.failures[0].row.starts_with("flight "));
  assert!(passengers.failures[0].reason.contains("name service down"));

  let rows = s.select_all(Table::Passengers).await.unwrap();
  let flights_with_passengers: std::collections::BTreeSet<i64> =
    rows.iter().map(|r| r.integer(4).unwrap()).collect();
  assert_eq!(flights_with_passengers.len(), 4);
}

#[tokio::test]
async fn interrupted_bootstrap_resumes_missing_phases() {
  let s = store().await;
  // Simulate a run that created tables and seeded airports, then died.
  s.conn()
    .call(|conn| {
      conn.execute_batch(crate::schema::SCHEMA)?;
      conn.execute(
        "INSERT INTO iata_codes (code, city, country) VALUES ('JFK', 'New York', 'US'),
                                                            ('LAX', 'Los Angeles', 'US'),
                                                            ('ORD', 'Chicago', 'US'),
                                                            ('CDG', 'Paris', 'France')",
        [],
      )?;
      Ok(())
    })
    .await
    .unwrap();
  assert!(!s.is_ready().await.unwrap());

  let mut rng = StdRng::seed_from_u64(11);
  let Bootstrap::Seeded(report) = ensure_ready(&s, &seed_data(), &FixedNames, &mut rng)
    .await
    .unwrap()
  else {
    panic!("expected Seeded");
  };

  assert!(report.airports.is_none(), "airports were already seeded");
  assert_eq!(report.flights.unwrap().inserted, 5);
  assert!(report.passengers.unwrap().inserted >= 5);
  assert_eq!(s.select_all(Table::IataCodes).await.unwrap().len(), 4);
  assert!(s.is_ready().await.unwrap());
}

// ─── Catalogue and raw reads ─────────────────────────────────────────────────

#[tokio::test]
async fn list_tables_before_and_after_bootstrap() {
  let s = store().await;
  assert!(s.list_tables().await.unwrap().is_empty());

  let s = seeded().await;
  let names: Vec<_> = s
    .list_tables()
    .await
    .unwrap()
    .iter()
    .map(|t| t.name())
    .collect();
  assert_eq!(names, ["flights", "iata_codes", "passengers"]);
}

#[tokio::test]
async fn select_all_keeps_insertion_order() {
  let s = seeded().await;
  let codes: Vec<_> = s
    .select_all(Table::IataCodes)
    .await
    .unwrap()
    .iter()
    .map(|r| r.text(0).unwrap().to_owned())
    .collect();
  assert_eq!(codes, ["JFK", "LAX", "ORD", "CDG"]);
}

#[tokio::test]
async fn flight_by_id_hit_and_miss() {
  let s = seeded().await;
  let first = s.select_all(Table::Flights).await.unwrap().remove(0);
  let id = first.integer(0).unwrap();

  let found = s.flight_by_id(id).await.unwrap();
  assert_eq!(found, Some(first));
  assert_eq!(s.flight_by_id(10_000).await.unwrap(), None);
}

// ─── Joins ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn flight_join_is_lossless_and_sorted_by_price() {
  let s = seeded().await;
  let flights = s.flights_joined_with_airports().await.unwrap();

  assert_eq!(flights.len(), s.select_all(Table::Flights).await.unwrap().len());
  let prices: Vec<_> = flights.iter().map(|f| f.price).collect();
  assert_eq!(prices, [420, 300, 150, 100, 80]);

  let top = &flights[0];
  assert_eq!(top.departure_code, "LAX");
  assert_eq!(top.departure_city, "Los Angeles");
  assert_eq!(top.arrival_code, "JFK");
  assert_eq!(top.arrival_city, "New York");
  assert_eq!(top.distance, 290);
}

#[tokio::test]
async fn flight_join_does_not_depend_on_insertion_order() {
  let a = seeded_with(&seed_data(), 1).await;
  let b = seeded_with(&seed_data(), 2).await;
  assert_eq!(
    a.flights_joined_with_airports().await.unwrap(),
    b.flights_joined_with_airports().await.unwrap()
  );
}

#[tokio::test]
async fn passenger_join_carries_flight_route() {
  let s = seeded().await;
  let fares = s.passengers_joined_with_flights().await.unwrap();
  assert_eq!(fares.len(), s.select_all(Table::Passengers).await.unwrap().len());

  let known = [
    ("JFK", "LAX", 100),
    ("JFK", "ORD", 300),
    ("LAX", "ORD", 150),
    ("ORD", "JFK", 80),
    ("LAX", "JFK", 420),
  ];
  for fare in &fares {
    assert!(known.contains(&(fare.departure_code.as_str(), fare.arrival_code.as_str(), fare.price)));
  }
}

// ─── Aggregates ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn bucketed_average_assigns_floor_buckets() {
  let s = seeded().await;
  let buckets = s
    .average_bucketed(Column::Distance, 100, Column::Price, Table::Flights)
    .await
    .unwrap();

  // distances 30, 120, 199, 250, 290 → buckets 0, 1, 1, 2, 2
  let got: Vec<_> = buckets.iter().map(|b| (b.bucket, b.average)).collect();
  assert_eq!(
    got,
    vec![
      (0, Some(80.0)),
      (1, Some((150.0 + 300.0) / 2.0)),
      (2, Some((100.0 + 420.0) / 2.0)),
    ]
  );
  assert_eq!(buckets[2].lower_bound(100), 200);
}

#[tokio::test]
async fn bucketed_average_rejects_zero_width() {
  let s = seeded().await;
  let err = s
    .average_bucketed(Column::Distance, 0, Column::Price, Table::Flights)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(skyline_core::Error::InvalidBucketWidth)));
}

#[tokio::test]
async fn average_by_groups_per_value() {
  let s = seeded().await;
  let groups = s
    .average_by(Column::IataDeparture, Column::Price, Table::Flights)
    .await
    .unwrap();

  let got: Vec<_> = groups.iter().map(|g| (g.group.clone(), g.average)).collect();
  assert_eq!(
    got,
    vec![
      (Value::from("JFK"), Some(200.0)),
      (Value::from("LAX"), Some(285.0)),
      (Value::from("ORD"), Some(80.0)),
    ]
  );
}

#[tokio::test]
async fn conditional_average_for_departure_code() {
  let s = seeded().await;
  let jfk = Predicate::eq(Column::IataDeparture, "JFK");
  let avg = s
    .conditional_average(Table::Flights, Column::Price, &jfk)
    .await
    .unwrap();
  assert_eq!(avg, Some(200.0));

  let cdg = Predicate::eq(Column::IataDeparture, "CDG");
  let avg = s
    .conditional_average(Table::Flights, Column::Distance, &cdg)
    .await
    .unwrap();
  assert_eq!(avg, None);

  let cheap_from_jfk = jfk.and(Predicate::compare(Column::Price, Comparison::Lt, 200_i64));
  let avg = s
    .conditional_average(Table::Flights, Column::Price, &cheap_from_jfk)
    .await
    .unwrap();
  assert_eq!(avg, Some(100.0));
}

#[tokio::test]
async fn aggregate_rejects_foreign_columns() {
  let s = seeded().await;
  let err = s
    .average_by(Column::Phone, Column::Price, Table::Flights)
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(skyline_core::Error::ColumnNotInTable { column: Column::Phone, .. })
  ));

  let p = Predicate::eq(Column::FirstName, "Ada");
  let err = s
    .conditional_average(Table::Flights, Column::Price, &p)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(_)));
}

//! Display values built by the navigation layer, and the flat records
//! consumed by the bootstrapper.

use serde::{Deserialize, Serialize};

use crate::{Result, value::Row};

// ─── Display values ──────────────────────────────────────────────────────────

/// An airport with its outbound averages, computed on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
  pub code:         String,
  pub city:         String,
  pub country:      Option<String>,
  /// Average price of flights departing here; `None` with no departures.
  pub avg_price:    Option<f64>,
  pub avg_distance: Option<f64>,
}

impl Airport {
  /// Build from an `iata_codes` row plus the two computed averages.
  pub fn from_row(
    row: &Row,
    avg_price: Option<f64>,
    avg_distance: Option<f64>,
  ) -> Result<Self> {
    Ok(Self {
      code: row.text(0)?.to_owned(),
      city: row.text(1)?.to_owned(),
      country: row.opt_text(2)?.map(str::to_owned),
      avg_price,
      avg_distance,
    })
  }
}

/// A flight as read through the airport join. Carries no surrogate id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
  pub departure_code: String,
  pub departure_city: String,
  pub arrival_code:   String,
  pub arrival_city:   String,
  pub price:          i64,
  pub distance:       i64,
}

/// The departure/arrival pair a passenger is linked to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
  pub departure_code: String,
  pub arrival_code:   String,
}

impl Route {
  /// Extract the route from a raw `flights` row.
  pub fn from_flight_row(row: &Row) -> Result<Self> {
    Ok(Self {
      departure_code: row.text(1)?.to_owned(),
      arrival_code:   row.text(2)?.to_owned(),
    })
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passenger {
  pub first_name: String,
  pub last_name:  String,
  pub phone:      String,
  /// `None` when the referenced flight could not be found.
  pub route:      Option<Route>,
}

impl Passenger {
  /// Build from a `passengers` row and its already-resolved route.
  pub fn from_row(row: &Row, route: Option<Route>) -> Result<Self> {
    Ok(Self {
      first_name: row.text(1)?.to_owned(),
      last_name: row.text(2)?.to_owned(),
      phone: row.text(3)?.to_owned(),
      route,
    })
  }
}

// ─── Import records ──────────────────────────────────────────────────────────

/// One line of the airport import: `code,city,country`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirportRecord {
  pub code:    String,
  pub city:    String,
  pub country: String,
}

/// One line of the flight import: `id,iata_departure,iata_arrival,price,distance`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightRecord {
  /// Identifier from the import file. Ignored; the store assigns its own.
  pub id:             String,
  pub iata_departure: String,
  pub iata_arrival:   String,
  pub price:          i64,
  pub distance:       i64,
}

/// Everything the bootstrapper seeds from.
#[derive(Debug, Clone, Default)]
pub struct SeedData {
  pub airports: Vec<AirportRecord>,
  pub flights:  Vec<FlightRecord>,
}

/// A generated first/last name pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName {
  pub first_name: String,
  pub last_name:  String,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::value::Value;

  #[test]
  fn passenger_from_row_skips_ids() {
    let row = Row(vec![
      Value::Integer(1),
      "Ada".into(),
      "Lovelace".into(),
      "0123456789".into(),
      Value::Integer(99),
    ]);
    let route = Route { departure_code: "JFK".into(), arrival_code: "LAX".into() };
    let p = Passenger::from_row(&row, Some(route.clone())).unwrap();
    assert_eq!(p.first_name, "Ada");
    assert_eq!(p.phone, "0123456789");
    assert_eq!(p.route, Some(route));
  }

  #[test]
  fn airport_from_row_allows_missing_country() {
    let row = Row(vec!["JFK".into(), "New York".into(), Value::Null]);
    let a = Airport::from_row(&row, Some(200.0), None).unwrap();
    assert_eq!(a.country, None);
    assert_eq!(a.avg_price, Some(200.0));
  }
}

//! The selectable entries of the item list and their detail rendering.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::model::{Airport, Flight, Passenger};

/// Placeholder for absent values in rendered text.
pub const NOT_AVAILABLE: &str = "N/A";

/// An entry of the item list. Which variant depends on the selected table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Item {
  Flight(Flight),
  Passenger(Passenger),
  Airport(Airport),
}

impl Item {
  /// One-line label shown in the item list.
  pub fn label(&self) -> String {
    match self {
      Item::Flight(f) => format!("{} -> {}", f.departure_code, f.arrival_code),
      Item::Passenger(p) => format!("{} {}", p.first_name, p.last_name),
      Item::Airport(a) => a.code.clone(),
    }
  }

  /// The label:value block shown in the detail pane, one field per line.
  ///
  /// Pure: the same item always renders to the same text.
  pub fn render_detail(&self) -> String {
    let mut s = String::new();
    // Writing to a String cannot fail.
    let _ = match self {
      Item::Flight(f) => render_flight(&mut s, f),
      Item::Passenger(p) => render_passenger(&mut s, p),
      Item::Airport(a) => render_airport(&mut s, a),
    };
    s
  }
}

fn render_flight(s: &mut String, f: &Flight) -> std::fmt::Result {
  writeln!(s, "IATA Departure: {}", f.departure_code)?;
  writeln!(s, "Departure: {}", f.departure_city)?;
  writeln!(s, "IATA Arrival: {}", f.arrival_code)?;
  writeln!(s, "Arrival: {}", f.arrival_city)?;
  writeln!(s, "Price: ${}", f.price)?;
  writeln!(s, "Distance: {}km", f.distance)
}

fn render_passenger(s: &mut String, p: &Passenger) -> std::fmt::Result {
  writeln!(s, "First name: {}", p.first_name)?;
  writeln!(s, "Last name: {}", p.last_name)?;
  writeln!(s, "Phone: +{}", p.phone)?;
  match &p.route {
    Some(r) => writeln!(s, "Flight: {}->{}", r.departure_code, r.arrival_code),
    None => writeln!(s, "Flight: {NOT_AVAILABLE}"),
  }
}

fn render_airport(s: &mut String, a: &Airport) -> std::fmt::Result {
  writeln!(s, "Code: {}", a.code)?;
  writeln!(s, "City: {}", a.city)?;
  writeln!(s, "Country: {}", a.country.as_deref().unwrap_or(NOT_AVAILABLE))?;
  writeln!(s, "Average price to destinations: ${}", format_average(a.avg_price))?;
  writeln!(
    s,
    "Average distance to destinations: {}km",
    format_average(a.avg_distance)
  )
}

/// Round to the nearest integer, or `N/A` when absent.
pub fn format_average(avg: Option<f64>) -> String {
  match avg {
    Some(v) => format!("{:.0}", v.round()),
    None => NOT_AVAILABLE.to_owned(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::Route;

  fn jfk_lax() -> Flight {
    Flight {
      departure_code: "JFK".into(),
      departure_city: "New York".into(),
      arrival_code:   "LAX".into(),
      arrival_city:   "Los Angeles".into(),
      price:          320,
      distance:       3983,
    }
  }

  #[test]
  fn flight_detail_lines() {
    let item = Item::Flight(jfk_lax());
    assert_eq!(item.label(), "JFK -> LAX");
    assert_eq!(
      item.render_detail(),
      "IATA Departure: JFK\nDeparture: New York\nIATA Arrival: LAX\n\
       Arrival: Los Angeles\nPrice: $320\nDistance: 3983km\n"
    );
  }

  #[test]
  fn passenger_detail_uses_route_codes() {
    let item = Item::Passenger(Passenger {
      first_name: "Grace".into(),
      last_name:  "Hopper".into(),
      phone:      "5551234567".into(),
      route:      Some(Route {
        departure_code: "JFK".into(),
        arrival_code:   "LAX".into(),
      }),
    });
    assert_eq!(item.label(), "Grace Hopper");
    let text = item.render_detail();
    assert!(text.contains("Phone: +5551234567\n"));
    assert!(text.ends_with("Flight: JFK->LAX\n"));
  }

  #[test]
  fn passenger_without_flight_renders_placeholder() {
    let item = Item::Passenger(Passenger {
      first_name: "A".into(),
      last_name:  "B".into(),
      phone:      "0".into(),
      route:      None,
    });
    assert!(item.render_detail().ends_with("Flight: N/A\n"));
  }

  #[test]
  fn airport_detail_with_and_without_averages() {
    let mut airport = Airport {
      code:         "JFK".into(),
      city:         "New York".into(),
      country:      Some("United States".into()),
      avg_price:    Some(200.0),
      avg_distance: Some(1234.6),
    };
    let text = Item::Airport(airport.clone()).render_detail();
    assert_eq!(
      text,
      "Code: JFK\nCity: New York\nCountry: United States\n\
       Average price to destinations: $200\nAverage distance to destinations: 1235km\n"
    );

    airport.avg_price = None;
    airport.avg_distance = None;
    let text = Item::Airport(airport).render_detail();
    assert!(text.contains("Average price to destinations: $N/A\n"));
    assert!(text.contains("Average distance to destinations: N/Akm\n"));
  }

  #[test]
  fn rendering_is_deterministic() {
    let item = Item::Flight(jfk_lax());
    assert_eq!(item.render_detail(), item.clone().render_detail());
  }
}

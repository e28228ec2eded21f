//! The closed set of physical tables and their columns.
//!
//! Table and column names end up interpolated into SQL, so they are never
//! taken from free-form strings: every name the store sees comes from one of
//! these enums.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Table ───────────────────────────────────────────────────────────────────

/// One of the three physical tables of a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
  IataCodes,
  Flights,
  Passengers,
}

impl Table {
  pub const ALL: [Table; 3] = [Table::IataCodes, Table::Flights, Table::Passengers];

  pub fn name(self) -> &'static str {
    match self {
      Table::IataCodes => "iata_codes",
      Table::Flights => "flights",
      Table::Passengers => "passengers",
    }
  }

  /// Columns in declaration order; this is the order of a raw [`Row`].
  ///
  /// [`Row`]: crate::value::Row
  pub fn columns(self) -> &'static [Column] {
    match self {
      Table::IataCodes => &[Column::Code, Column::City, Column::Country],
      Table::Flights => &[
        Column::Id,
        Column::IataDeparture,
        Column::IataArrival,
        Column::Price,
        Column::Distance,
      ],
      Table::Passengers => &[
        Column::Id,
        Column::FirstName,
        Column::LastName,
        Column::Phone,
        Column::FlightId,
      ],
    }
  }

  pub fn primary_key(self) -> Column {
    match self {
      Table::IataCodes => Column::Code,
      Table::Flights | Table::Passengers => Column::Id,
    }
  }

  pub fn has_column(self, column: Column) -> bool { self.columns().contains(&column) }

  /// Fail with [`Error::ColumnNotInTable`] unless every column belongs here.
  pub fn check_columns(self, columns: &[Column]) -> Result<()> {
    match columns.iter().find(|c| !self.has_column(**c)) {
      Some(&column) => Err(Error::ColumnNotInTable { column, table: self }),
      None => Ok(()),
    }
  }
}

impl fmt::Display for Table {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

impl FromStr for Table {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    Table::ALL
      .into_iter()
      .find(|t| t.name() == s)
      .ok_or_else(|| Error::UnknownTable(s.to_owned()))
  }
}

// ─── Column ──────────────────────────────────────────────────────────────────

/// A column of one of the physical tables.
///
/// `Id` is shared by `flights` and `passengers`; every other column belongs
/// to exactly one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
  Code,
  City,
  Country,
  Id,
  IataDeparture,
  IataArrival,
  Price,
  Distance,
  FirstName,
  LastName,
  Phone,
  FlightId,
}

impl Column {
  pub fn name(self) -> &'static str {
    match self {
      Column::Code => "code",
      Column::City => "city",
      Column::Country => "country",
      Column::Id => "id",
      Column::IataDeparture => "iata_departure",
      Column::IataArrival => "iata_arrival",
      Column::Price => "price",
      Column::Distance => "distance",
      Column::FirstName => "first_name",
      Column::LastName => "last_name",
      Column::Phone => "phone",
      Column::FlightId => "flight_id",
    }
  }
}

impl fmt::Display for Column {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

// ─── TableDescriptor ─────────────────────────────────────────────────────────

/// An entry of the root list: one table present in the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
  pub table: Table,
}

impl TableDescriptor {
  pub fn new(table: Table) -> Self { Self { table } }

  pub fn name(&self) -> &'static str { self.table.name() }

  /// `iata_codes` → `Iata Codes`.
  pub fn label(&self) -> String {
    self
      .name()
      .split('_')
      .map(|word| {
        let mut chars = word.chars();
        match chars.next() {
          Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
          None => String::new(),
        }
      })
      .collect::<Vec<_>>()
      .join(" ")
  }
}

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// Accept only `[A-Za-z_][A-Za-z0-9_]*`.
pub fn validate_identifier(name: &str) -> Result<&str> {
  let mut chars = name.chars();
  let head_ok = chars
    .next()
    .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
  if head_ok && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
    Ok(name)
  } else {
    Err(Error::InvalidIdentifier(name.to_owned()))
  }
}

//! Untyped values and raw rows as returned by `select_all` and point lookups.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A single stored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
  Null,
  Integer(i64),
  Real(f64),
  Text(String),
}

impl Value {
  pub fn is_null(&self) -> bool { matches!(self, Value::Null) }
}

impl From<i64> for Value {
  fn from(v: i64) -> Self { Value::Integer(v) }
}

impl From<f64> for Value {
  fn from(v: f64) -> Self { Value::Real(v) }
}

impl From<&str> for Value {
  fn from(v: &str) -> Self { Value::Text(v.to_owned()) }
}

impl From<String> for Value {
  fn from(v: String) -> Self { Value::Text(v) }
}

impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Value::Null => f.write_str("NULL"),
      Value::Integer(i) => write!(f, "{i}"),
      Value::Real(r) => write!(f, "{r}"),
      Value::Text(s) => f.write_str(s),
    }
  }
}

/// One row, values in the table's column declaration order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Row(pub Vec<Value>);

impl Row {
  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn get(&self, index: usize) -> Option<&Value> { self.0.get(index) }

  pub fn text(&self, index: usize) -> Result<&str> {
    match self.0.get(index) {
      Some(Value::Text(s)) => Ok(s),
      _ => Err(Error::UnexpectedValue { index, expected: "text" }),
    }
  }

  /// Like [`Row::text`] but maps NULL to `None`.
  pub fn opt_text(&self, index: usize) -> Result<Option<&str>> {
    match self.0.get(index) {
      Some(Value::Null) => Ok(None),
      _ => self.text(index).map(Some),
    }
  }

  pub fn integer(&self, index: usize) -> Result<i64> {
    match self.0.get(index) {
      Some(Value::Integer(i)) => Ok(*i),
      _ => Err(Error::UnexpectedValue { index, expected: "integer" }),
    }
  }
}

impl From<Vec<Value>> for Row {
  fn from(values: Vec<Value>) -> Self { Row(values) }
}

//! Conversions between core values and SQLite values, and rendering of typed
//! query pieces into SQL text plus bound parameters.

use rusqlite::types::Value as SqlValue;
use skyline_core::{query::Predicate, table::Column, value::Value};

// ─── Values ──────────────────────────────────────────────────────────────────

pub fn encode_value(v: &Value) -> SqlValue {
  match v {
    Value::Null => SqlValue::Null,
    Value::Integer(i) => SqlValue::Integer(*i),
    Value::Real(r) => SqlValue::Real(*r),
    Value::Text(s) => SqlValue::Text(s.clone()),
  }
}

pub fn decode_value(v: SqlValue) -> Value {
  match v {
    SqlValue::Null => Value::Null,
    SqlValue::Integer(i) => Value::Integer(i),
    SqlValue::Real(r) => Value::Real(r),
    SqlValue::Text(s) => Value::Text(s),
    SqlValue::Blob(b) => Value::Text(String::from_utf8_lossy(&b).into_owned()),
  }
}

/// Read the first `n` columns of a result row untyped.
pub fn read_values(row: &rusqlite::Row<'_>, n: usize) -> rusqlite::Result<Vec<SqlValue>> {
  (0..n).map(|i| row.get::<_, SqlValue>(i)).collect()
}

// ─── SQL fragments ───────────────────────────────────────────────────────────

pub fn column_list(columns: &[Column]) -> String {
  columns
    .iter()
    .map(|c| c.name())
    .collect::<Vec<_>>()
    .join(", ")
}

/// Render `predicate` as a WHERE expression with `?` placeholders, pushing
/// the values to bind onto `params` in placeholder order.
pub fn encode_predicate(predicate: &Predicate, params: &mut Vec<SqlValue>) -> String {
  match predicate {
    Predicate::Compare { column, op, value } => {
      params.push(encode_value(value));
      format!("{} {} ?", column.name(), op.operator())
    }
    Predicate::And(parts) if parts.is_empty() => "1".to_owned(),
    Predicate::And(parts) => parts
      .iter()
      .map(|p| format!("({})", encode_predicate(p, params)))
      .collect::<Vec<_>>()
      .join(" AND "),
  }
}

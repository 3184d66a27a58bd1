//! Dynamic row records.
//!
//! A [`Record`] is one row's attribute mapping: column name to scalar
//! value. Records are transient; they are hydrated from a query or from
//! JSON input, handed to a gateway for persistence, and discarded when the
//! call returns. Column order is kept deterministic (sorted) so statements
//! built from a record are stable.

use crate::executor::ExecError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use may_postgres::types::Type;
use may_postgres::Row;
use rust_decimal::Decimal;
use sea_query::Value;
use serde_json::{Map as JsonMap, Number as JsonNumber, Value as JsonValue};
use std::collections::BTreeMap;

/// A single row's attribute mapping.
///
/// # Example
///
/// ```
/// use gatehouse::Record;
///
/// let record = Record::new()
///     .with("name", "alice")
///     .with("active", true);
/// assert!(record.has_value("name"));
/// assert!(!record.has_value("id"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    columns: BTreeMap<String, Value>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, consuming and returning the record
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.columns.insert(column.into(), value.into());
        self
    }

    /// Set a column value
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.columns.insert(column.into(), value.into());
    }

    /// Get a column value, if present
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    /// Remove a column and return its value
    pub fn take(&mut self, column: &str) -> Option<Value> {
        self.columns.remove(column)
    }

    /// True when the column is present and holds a non-NULL value.
    ///
    /// This is the identity test used by `save`: a record "has an id" only
    /// if the id column is present and not a typed NULL.
    pub fn has_value(&self, column: &str) -> bool {
        self.columns.get(column).is_some_and(|v| !is_null_value(v))
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True when the record carries no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterate column/value pairs in deterministic (sorted) order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Column names in deterministic (sorted) order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Hydrate a record from a driver row, keyed on each column's declared
    /// Postgres type.
    ///
    /// # Errors
    ///
    /// Returns `ExecError::ParseError` for a column type the record model
    /// has no mapping for, or a driver error if extraction fails.
    pub fn from_row(row: &Row) -> Result<Self, ExecError> {
        let mut record = Record::new();
        for (idx, column) in row.columns().iter().enumerate() {
            let ty = column.type_();
            let value: Value = if *ty == Type::BOOL {
                row.try_get::<_, Option<bool>>(idx)?.into()
            } else if *ty == Type::INT2 {
                row.try_get::<_, Option<i16>>(idx)?.into()
            } else if *ty == Type::INT4 {
                row.try_get::<_, Option<i32>>(idx)?.into()
            } else if *ty == Type::INT8 {
                row.try_get::<_, Option<i64>>(idx)?.into()
            } else if *ty == Type::FLOAT4 {
                row.try_get::<_, Option<f32>>(idx)?.into()
            } else if *ty == Type::FLOAT8 {
                row.try_get::<_, Option<f64>>(idx)?.into()
            } else if *ty == Type::TEXT
                || *ty == Type::VARCHAR
                || *ty == Type::BPCHAR
                || *ty == Type::NAME
            {
                row.try_get::<_, Option<String>>(idx)?.into()
            } else if *ty == Type::NUMERIC {
                row.try_get::<_, Option<Decimal>>(idx)?.into()
            } else if *ty == Type::TIMESTAMP {
                row.try_get::<_, Option<NaiveDateTime>>(idx)?.into()
            } else if *ty == Type::TIMESTAMPTZ {
                row.try_get::<_, Option<DateTime<Utc>>>(idx)?.into()
            } else if *ty == Type::DATE {
                row.try_get::<_, Option<NaiveDate>>(idx)?.into()
            } else if *ty == Type::TIME {
                row.try_get::<_, Option<NaiveTime>>(idx)?.into()
            } else if *ty == Type::UUID {
                row.try_get::<_, Option<uuid::Uuid>>(idx)?.into()
            } else if *ty == Type::JSON || *ty == Type::JSONB {
                row.try_get::<_, Option<JsonValue>>(idx)?.into()
            } else if *ty == Type::BYTEA {
                row.try_get::<_, Option<Vec<u8>>>(idx)?.into()
            } else {
                return Err(ExecError::ParseError(format!(
                    "unsupported column type {ty} for column {}",
                    column.name()
                )));
            };
            record.set(column.name(), value);
        }
        Ok(record)
    }

    /// Project the record as a JSON object, the keyed-array form handed to
    /// view layers and HTTP responses.
    pub fn to_json(&self) -> JsonValue {
        let mut map = JsonMap::new();
        for (column, value) in self.iter() {
            map.insert(column.to_string(), value_to_json(value));
        }
        JsonValue::Object(map)
    }

    /// Hydrate a record from decoded JSON input, typically a request body.
    ///
    /// JSON null carries no column type, so it lands as a text NULL;
    /// nested arrays and objects are stored as JSON column values.
    ///
    /// # Errors
    ///
    /// Returns `ExecError::ParseError` when the input is not a JSON object
    /// or a number is neither `i64` nor `f64` representable.
    pub fn from_json(json: &JsonValue) -> Result<Self, ExecError> {
        let JsonValue::Object(map) = json else {
            return Err(ExecError::ParseError(format!(
                "expected a JSON object, got: {json}"
            )));
        };
        let mut record = Record::new();
        for (column, value) in map {
            let converted = match value {
                JsonValue::Null => Value::String(None),
                JsonValue::Bool(b) => Value::from(*b),
                JsonValue::Number(n) => {
                    if let Some(i) = n.as_i64() {
                        Value::from(i)
                    } else if let Some(f) = n.as_f64() {
                        Value::from(f)
                    } else {
                        return Err(ExecError::ParseError(format!(
                            "unrepresentable number for column {column}: {n}"
                        )));
                    }
                }
                JsonValue::String(s) => Value::from(s.as_str()),
                nested @ (JsonValue::Array(_) | JsonValue::Object(_)) => {
                    Value::from(nested.clone())
                }
            };
            record.set(column.as_str(), converted);
        }
        Ok(record)
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

/// Typed-NULL check over every value family this crate can carry.
///
/// `None` patterns match regardless of how a variant stores its payload,
/// so this stays correct across the feature-gated families.
pub(crate) fn is_null_value(value: &Value) -> bool {
    matches!(
        value,
        Value::Bool(None)
            | Value::TinyInt(None)
            | Value::SmallInt(None)
            | Value::Int(None)
            | Value::BigInt(None)
            | Value::TinyUnsigned(None)
            | Value::SmallUnsigned(None)
            | Value::Unsigned(None)
            | Value::BigUnsigned(None)
            | Value::Float(None)
            | Value::Double(None)
            | Value::String(None)
            | Value::Char(None)
            | Value::Bytes(None)
            | Value::Json(None)
            | Value::ChronoDate(None)
            | Value::ChronoTime(None)
            | Value::ChronoDateTime(None)
            | Value::ChronoDateTimeUtc(None)
            | Value::ChronoDateTimeLocal(None)
            | Value::ChronoDateTimeWithTimeZone(None)
            | Value::Uuid(None)
            | Value::Decimal(None)
    )
}

fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Bool(Some(b)) => JsonValue::Bool(*b),
        Value::TinyInt(Some(i)) => JsonValue::from(*i),
        Value::SmallInt(Some(i)) => JsonValue::from(*i),
        Value::Int(Some(i)) => JsonValue::from(*i),
        Value::BigInt(Some(i)) => JsonValue::from(*i),
        Value::TinyUnsigned(Some(u)) => JsonValue::from(*u),
        Value::SmallUnsigned(Some(u)) => JsonValue::from(*u),
        Value::Unsigned(Some(u)) => JsonValue::from(*u),
        Value::BigUnsigned(Some(u)) => JsonValue::from(*u),
        Value::Float(Some(f)) => JsonNumber::from_f64(f64::from(*f))
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::Double(Some(d)) => JsonNumber::from_f64(*d)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::String(Some(s)) => JsonValue::String(s.clone()),
        Value::Char(Some(c)) => JsonValue::String(c.to_string()),
        Value::Json(Some(j)) => (**j).clone(),
        other if is_null_value(other) => JsonValue::Null,
        // Timestamps, uuids, decimals and byte strings have no native JSON
        // scalar; render them as strings.
        other @ Value::ChronoDate(_) => JsonValue::String(unwrap_display::<NaiveDate>(other)),
        other @ Value::ChronoTime(_) => JsonValue::String(unwrap_display::<NaiveTime>(other)),
        other @ Value::ChronoDateTime(_) => {
            JsonValue::String(unwrap_display::<NaiveDateTime>(other))
        }
        other @ Value::ChronoDateTimeUtc(_) => {
            JsonValue::String(unwrap_display::<DateTime<Utc>>(other))
        }
        other @ Value::Uuid(_) => JsonValue::String(unwrap_display::<uuid::Uuid>(other)),
        other @ Value::Decimal(_) => JsonValue::String(unwrap_display::<Decimal>(other)),
        other => JsonValue::String(format!("{other:?}")),
    }
}

/// Stringify a non-NULL feature-typed value through its own `Display`.
fn unwrap_display<T>(value: &Value) -> String
where
    T: sea_query::ValueType + std::fmt::Display,
{
    value.clone().unwrap::<T>().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_value_distinguishes_null_from_absent() {
        let record = Record::new()
            .with("name", "alice")
            .with("deleted_at", Value::String(None));
        assert!(record.has_value("name"));
        assert!(!record.has_value("deleted_at"));
        assert!(!record.has_value("id"));
    }

    #[test]
    fn test_columns_are_sorted() {
        let record = Record::new().with("b", 1).with("a", 2).with("c", 3);
        let columns: Vec<&str> = record.columns().collect();
        assert_eq!(columns, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_json_round_trip() {
        let json = serde_json::json!({
            "name": "alice",
            "age": 34,
            "score": 1.5,
            "active": true,
            "notes": null,
        });
        let record = Record::from_json(&json).unwrap();
        assert_eq!(record.get("name"), Some(&Value::from("alice")));
        assert_eq!(record.get("age"), Some(&Value::from(34i64)));
        assert!(!record.has_value("notes"));

        let back = record.to_json();
        assert_eq!(back["name"], "alice");
        assert_eq!(back["age"], 34);
        assert_eq!(back["active"], true);
        assert_eq!(back["notes"], JsonValue::Null);
    }

    #[test]
    fn test_from_json_rejects_non_objects() {
        let err = Record::from_json(&serde_json::json!([1, 2, 3])).unwrap_err();
        assert!(err.to_string().contains("expected a JSON object"));
    }

    #[test]
    fn test_from_json_keeps_nested_values_as_json() {
        let json = serde_json::json!({"meta": {"tags": ["a", "b"]}});
        let record = Record::from_json(&json).unwrap();
        match record.get("meta") {
            Some(Value::Json(Some(j))) => assert_eq!(j["tags"][0], "a"),
            other => panic!("expected a JSON value, got {other:?}"),
        }
    }

    #[test]
    fn test_take_removes_column() {
        let mut record = Record::new().with("id", 7);
        assert_eq!(record.take("id"), Some(Value::from(7)));
        assert!(record.is_empty());
    }
}

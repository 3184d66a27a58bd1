//! Conversion of sea-query bind values into `may_postgres` parameters.
//!
//! `may_postgres` binds parameters as `&dyn ToSql` references, so the owned
//! values must outlive the slice handed to the driver. [`ParamBuffer`] owns
//! one typed vector per value family and a slot list recording which vector
//! each parameter came from; `params()` then rebuilds the reference slice in
//! the original order. Typed NULLs stay in their own family so the driver
//! sees the right parameter type for them.

use crate::executor::ExecError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use may_postgres::types::ToSql;
use rust_decimal::Decimal;
use sea_query::{Value, Values};
use serde_json::Value as JsonValue;
use uuid::Uuid;

enum Slot {
    Bool(usize),
    Int(usize),
    BigInt(usize),
    Float(usize),
    Double(usize),
    Text(usize),
    Blob(usize),
    Json(usize),
    Date(usize),
    Time(usize),
    DateTime(usize),
    DateTimeUtc(usize),
    Uuid(usize),
    Decimal(usize),
}

/// Owns converted bind values and hands out `ToSql` references in order.
#[derive(Default)]
pub(crate) struct ParamBuffer {
    bools: Vec<Option<bool>>,
    ints: Vec<Option<i32>>,
    big_ints: Vec<Option<i64>>,
    floats: Vec<Option<f32>>,
    doubles: Vec<Option<f64>>,
    texts: Vec<Option<String>>,
    blobs: Vec<Option<Vec<u8>>>,
    jsons: Vec<Option<JsonValue>>,
    dates: Vec<Option<NaiveDate>>,
    times: Vec<Option<NaiveTime>>,
    date_times: Vec<Option<NaiveDateTime>>,
    utc_date_times: Vec<Option<DateTime<Utc>>>,
    uuids: Vec<Option<Uuid>>,
    decimals: Vec<Option<Decimal>>,
    slots: Vec<Slot>,
}

impl ParamBuffer {
    /// Convert a full set of sea-query values into bindable form.
    ///
    /// # Errors
    ///
    /// Returns `ExecError::Other` for value types the driver cannot bind,
    /// or when an unsigned value does not fit the signed wire type.
    pub(crate) fn load(values: &Values) -> Result<Self, ExecError> {
        let mut buf = ParamBuffer::default();
        for value in values.iter() {
            let slot = match value {
                Value::Bool(v) => {
                    buf.bools.push(*v);
                    Slot::Bool(buf.bools.len() - 1)
                }
                Value::TinyInt(v) => {
                    buf.ints.push(v.map(i32::from));
                    Slot::Int(buf.ints.len() - 1)
                }
                Value::SmallInt(v) => {
                    buf.ints.push(v.map(i32::from));
                    Slot::Int(buf.ints.len() - 1)
                }
                Value::Int(v) => {
                    buf.ints.push(*v);
                    Slot::Int(buf.ints.len() - 1)
                }
                Value::TinyUnsigned(v) => {
                    buf.ints.push(v.map(i32::from));
                    Slot::Int(buf.ints.len() - 1)
                }
                Value::SmallUnsigned(v) => {
                    buf.ints.push(v.map(i32::from));
                    Slot::Int(buf.ints.len() - 1)
                }
                Value::BigInt(v) => {
                    buf.big_ints.push(*v);
                    Slot::BigInt(buf.big_ints.len() - 1)
                }
                Value::Unsigned(v) => {
                    buf.big_ints.push(v.map(i64::from));
                    Slot::BigInt(buf.big_ints.len() - 1)
                }
                Value::BigUnsigned(v) => {
                    let converted = match v {
                        Some(u) => Some(i64::try_from(*u).map_err(|_| {
                            ExecError::Other(format!(
                                "BigUnsigned value {u} exceeds i64::MAX, cannot be bound"
                            ))
                        })?),
                        None => None,
                    };
                    buf.big_ints.push(converted);
                    Slot::BigInt(buf.big_ints.len() - 1)
                }
                Value::Float(v) => {
                    buf.floats.push(*v);
                    Slot::Float(buf.floats.len() - 1)
                }
                Value::Double(v) => {
                    buf.doubles.push(*v);
                    Slot::Double(buf.doubles.len() - 1)
                }
                Value::String(v) => {
                    buf.texts.push(v.clone());
                    Slot::Text(buf.texts.len() - 1)
                }
                Value::Char(v) => {
                    buf.texts.push(v.map(|c| c.to_string()));
                    Slot::Text(buf.texts.len() - 1)
                }
                Value::Bytes(v) => {
                    buf.blobs.push(v.clone());
                    Slot::Blob(buf.blobs.len() - 1)
                }
                Value::Json(v) => {
                    buf.jsons.push(v.as_deref().cloned());
                    Slot::Json(buf.jsons.len() - 1)
                }
                Value::ChronoDate(_) => {
                    buf.dates.push(unwrap_nullable(value));
                    Slot::Date(buf.dates.len() - 1)
                }
                Value::ChronoTime(_) => {
                    buf.times.push(unwrap_nullable(value));
                    Slot::Time(buf.times.len() - 1)
                }
                Value::ChronoDateTime(_) => {
                    buf.date_times.push(unwrap_nullable(value));
                    Slot::DateTime(buf.date_times.len() - 1)
                }
                Value::ChronoDateTimeUtc(_) => {
                    buf.utc_date_times.push(unwrap_nullable(value));
                    Slot::DateTimeUtc(buf.utc_date_times.len() - 1)
                }
                Value::Uuid(_) => {
                    buf.uuids.push(unwrap_nullable(value));
                    Slot::Uuid(buf.uuids.len() - 1)
                }
                Value::Decimal(_) => {
                    buf.decimals.push(unwrap_nullable(value));
                    Slot::Decimal(buf.decimals.len() - 1)
                }
                _ => {
                    return Err(ExecError::Other(format!(
                        "Unsupported value type in query: {value:?}"
                    )));
                }
            };
            buf.slots.push(slot);
        }
        Ok(buf)
    }

    /// Reference slice in original parameter order, valid while `self` lives.
    pub(crate) fn params(&self) -> Vec<&dyn ToSql> {
        self.slots
            .iter()
            .map(|slot| match slot {
                Slot::Bool(i) => &self.bools[*i] as &dyn ToSql,
                Slot::Int(i) => &self.ints[*i] as &dyn ToSql,
                Slot::BigInt(i) => &self.big_ints[*i] as &dyn ToSql,
                Slot::Float(i) => &self.floats[*i] as &dyn ToSql,
                Slot::Double(i) => &self.doubles[*i] as &dyn ToSql,
                Slot::Text(i) => &self.texts[*i] as &dyn ToSql,
                Slot::Blob(i) => &self.blobs[*i] as &dyn ToSql,
                Slot::Json(i) => &self.jsons[*i] as &dyn ToSql,
                Slot::Date(i) => &self.dates[*i] as &dyn ToSql,
                Slot::Time(i) => &self.times[*i] as &dyn ToSql,
                Slot::DateTime(i) => &self.date_times[*i] as &dyn ToSql,
                Slot::DateTimeUtc(i) => &self.utc_date_times[*i] as &dyn ToSql,
                Slot::Uuid(i) => &self.uuids[*i] as &dyn ToSql,
                Slot::Decimal(i) => &self.decimals[*i] as &dyn ToSql,
            })
            .collect()
    }
}

/// Extract the typed payload of a feature-gated variant without naming its
/// internal representation. The caller has already matched the variant, so
/// `unwrap` cannot see a foreign type; NULL short-circuits to `None`.
fn unwrap_nullable<T>(value: &Value) -> Option<T>
where
    T: sea_query::ValueType,
{
    if crate::record::is_null_value(value) {
        None
    } else {
        Some(value.clone().unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_preserve_order_and_arity() {
        let values = Values(vec![
            Value::from(1i64),
            Value::from("active"),
            Value::from(true),
        ]);
        let buf = ParamBuffer::load(&values).unwrap();
        assert_eq!(buf.params().len(), 3);
    }

    #[test]
    fn test_typed_nulls_are_bindable() {
        let values = Values(vec![
            Value::String(None),
            Value::Int(None),
            Value::Bool(None),
        ]);
        let buf = ParamBuffer::load(&values).unwrap();
        assert_eq!(buf.params().len(), 3);
    }

    #[test]
    fn test_big_unsigned_overflow_is_rejected() {
        let values = Values(vec![Value::BigUnsigned(Some(u64::MAX))]);
        let err = ParamBuffer::load(&values).unwrap_err();
        assert!(err.to_string().contains("exceeds i64::MAX"));
    }

    #[test]
    fn test_unsigned_widens_to_big_int() {
        let values = Values(vec![Value::Unsigned(Some(u32::MAX))]);
        let buf = ParamBuffer::load(&values).unwrap();
        assert_eq!(buf.big_ints, vec![Some(i64::from(u32::MAX))]);
    }
}

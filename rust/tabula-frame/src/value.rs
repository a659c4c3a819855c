//! Scalar cell values and their conversion to and from Arrow arrays.

use std::{fmt, sync::Arc};

use arrow_array::{
    Array, ArrayRef, BooleanArray, Float16Array, Float32Array, Float64Array, Int64Array,
    NullArray, StringArray, TimestampNanosecondArray,
    cast::AsArray,
    types::{
        Float16Type, Float32Type, Float64Type, Int8Type, Int16Type, Int32Type, Int64Type,
        TimestampNanosecondType, UInt8Type, UInt16Type, UInt32Type, UInt64Type,
    },
};
use arrow_schema::{DataType, TimeUnit};
use chrono::{DateTime, NaiveDateTime};
use half::f16;
use tabula_common::{Result, error::Error};

use crate::period::Period;

/// A single cell value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float16(f16),
    Float32(f32),
    Float64(f64),
    Str(String),
    Timestamp(NaiveDateTime),
    Period(Period),
}

impl Value {
    /// Returns `true` for `Null` and for floating NaN, both of which mark a
    /// missing value.
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float16(v) => v.is_nan(),
            Value::Float32(v) => v.is_nan(),
            Value::Float64(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Returns `true` for floating values at most four bytes wide.
    pub fn is_narrow_float(&self) -> bool {
        matches!(self, Value::Float16(_) | Value::Float32(_))
    }

    /// Numeric view of the value; booleans map to 0 and 1.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Bool(b) => Some(if b { 1.0 } else { 0.0 }),
            Value::Int(v) => Some(v as f64),
            Value::Float16(v) => Some(v.to_f64()),
            Value::Float32(v) => Some(v as f64),
            Value::Float64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the value kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float16(_) => "float16",
            Value::Float32(_) => "float32",
            Value::Float64(_) => "float64",
            Value::Str(_) => "str",
            Value::Timestamp(_) => "timestamp",
            Value::Period(_) => "period",
        }
    }

    /// Reads the value at `idx` of an Arrow array.
    pub fn from_array(array: &dyn Array, idx: usize) -> Result<Value> {
        if idx >= array.len() {
            return Err(Error::invalid_arg(
                "idx",
                format!("{idx} out of bounds for length {}", array.len()),
            ));
        }
        if array.is_null(idx) {
            return Ok(Value::Null);
        }
        let value = match array.data_type() {
            DataType::Null => Value::Null,
            DataType::Boolean => Value::Bool(array.as_boolean().value(idx)),
            DataType::Int8 => Value::Int(array.as_primitive::<Int8Type>().value(idx) as i64),
            DataType::Int16 => Value::Int(array.as_primitive::<Int16Type>().value(idx) as i64),
            DataType::Int32 => Value::Int(array.as_primitive::<Int32Type>().value(idx) as i64),
            DataType::Int64 => Value::Int(array.as_primitive::<Int64Type>().value(idx)),
            DataType::UInt8 => Value::Int(array.as_primitive::<UInt8Type>().value(idx) as i64),
            DataType::UInt16 => Value::Int(array.as_primitive::<UInt16Type>().value(idx) as i64),
            DataType::UInt32 => Value::Int(array.as_primitive::<UInt32Type>().value(idx) as i64),
            DataType::UInt64 => {
                let v = array.as_primitive::<UInt64Type>().value(idx);
                Value::Int(i64::try_from(v).map_err(|_| {
                    Error::invalid_arg("array", format!("UInt64 value {v} exceeds i64 range"))
                })?)
            }
            DataType::Float16 => Value::Float16(array.as_primitive::<Float16Type>().value(idx)),
            DataType::Float32 => Value::Float32(array.as_primitive::<Float32Type>().value(idx)),
            DataType::Float64 => Value::Float64(array.as_primitive::<Float64Type>().value(idx)),
            DataType::Utf8 => Value::Str(array.as_string::<i32>().value(idx).to_string()),
            DataType::LargeUtf8 => Value::Str(array.as_string::<i64>().value(idx).to_string()),
            DataType::Timestamp(TimeUnit::Nanosecond, None) => {
                let nanos = array.as_primitive::<TimestampNanosecondType>().value(idx);
                Value::Timestamp(DateTime::from_timestamp_nanos(nanos).naive_utc())
            }
            other => {
                return Err(Error::not_implemented(format!(
                    "reading values of type {other}"
                )));
            }
        };
        Ok(value)
    }

    /// Reads all values of an Arrow array.
    pub fn vec_from_array(array: &dyn Array) -> Result<Vec<Value>> {
        (0..array.len())
            .map(|i| Value::from_array(array, i))
            .collect()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float16(v) => write!(f, "{v}"),
            Value::Float32(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S")),
            Value::Period(p) => write!(f, "{p}"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f16> for Value {
    fn from(v: f16) -> Self {
        Value::Float16(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(ts: NaiveDateTime) -> Self {
        Value::Timestamp(ts)
    }
}

impl From<Period> for Value {
    fn from(p: Period) -> Self {
        Value::Period(p)
    }
}

/// Column storage kind inferred from a run of values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ColumnKind {
    Null,
    Bool,
    Int,
    Float16,
    Float32,
    Float64,
    Str,
    Timestamp,
}

impl ColumnKind {
    fn of(value: &Value) -> Result<ColumnKind> {
        Ok(match value {
            Value::Null => ColumnKind::Null,
            Value::Bool(_) => ColumnKind::Bool,
            Value::Int(_) => ColumnKind::Int,
            Value::Float16(_) => ColumnKind::Float16,
            Value::Float32(_) => ColumnKind::Float32,
            Value::Float64(_) => ColumnKind::Float64,
            Value::Str(_) => ColumnKind::Str,
            Value::Timestamp(_) => ColumnKind::Timestamp,
            Value::Period(_) => {
                return Err(Error::not_implemented("period-valued columns"));
            }
        })
    }

    fn is_numeric(self) -> bool {
        matches!(
            self,
            ColumnKind::Int | ColumnKind::Float16 | ColumnKind::Float32 | ColumnKind::Float64
        )
    }

    /// Common storage for two kinds: nulls fit anywhere, mixed numerics widen
    /// to `Float64`, anything else is a conflict.
    fn merge(self, other: ColumnKind) -> Option<ColumnKind> {
        match (self, other) {
            (a, b) if a == b => Some(a),
            (ColumnKind::Null, k) | (k, ColumnKind::Null) => Some(k),
            (a, b) if a.is_numeric() && b.is_numeric() => Some(ColumnKind::Float64),
            _ => None,
        }
    }
}

/// Builds an Arrow array holding `values`.
///
/// The storage type is inferred: uniform kinds map to their natural Arrow type,
/// mixed numeric kinds widen to `Float64`, and an all-null run becomes a
/// `NullArray`. Mixing incompatible kinds (e.g. strings and integers) is an
/// invalid-argument error.
pub fn array_from_values(values: &[Value]) -> Result<ArrayRef> {
    let mut kind = ColumnKind::Null;
    for value in values {
        let next = ColumnKind::of(value)?;
        kind = kind.merge(next).ok_or_else(|| {
            Error::invalid_arg(
                "values",
                format!("cannot store {kind:?} and {next:?} values in one column"),
            )
        })?;
    }

    let array: ArrayRef = match kind {
        ColumnKind::Null => Arc::new(NullArray::new(values.len())),
        ColumnKind::Bool => Arc::new(BooleanArray::from(
            values
                .iter()
                .map(|v| match v {
                    Value::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
        ColumnKind::Int => Arc::new(Int64Array::from(
            values
                .iter()
                .map(|v| match v {
                    Value::Int(i) => Some(*i),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
        ColumnKind::Float16 => Arc::new(Float16Array::from(
            values
                .iter()
                .map(|v| match v {
                    Value::Float16(x) => Some(*x),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
        ColumnKind::Float32 => Arc::new(Float32Array::from(
            values
                .iter()
                .map(|v| match v {
                    Value::Float32(x) => Some(*x),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
        ColumnKind::Float64 => Arc::new(Float64Array::from(
            values
                .iter()
                .map(|v| match v {
                    Value::Null => None,
                    v => v.as_f64(),
                })
                .collect::<Vec<_>>(),
        )),
        ColumnKind::Str => Arc::new(StringArray::from(
            values.iter().map(|v| v.as_str()).collect::<Vec<_>>(),
        )),
        ColumnKind::Timestamp => {
            let nanos = values
                .iter()
                .map(|v| match v {
                    Value::Timestamp(ts) => ts
                        .and_utc()
                        .timestamp_nanos_opt()
                        .map(Some)
                        .ok_or_else(|| {
                            Error::invalid_arg("values", format!("timestamp {ts} out of range"))
                        }),
                    _ => Ok(None),
                })
                .collect::<Result<Vec<_>>>()?;
            Arc::new(TimestampNanosecondArray::from(nanos))
        }
    };
    Ok(array)
}

/// Builds an Arrow array holding `values`, then casts it to `data_type`.
pub fn array_from_values_as(values: &[Value], data_type: &DataType) -> Result<ArrayRef> {
    let array = array_from_values(values)?;
    if array.data_type() == data_type {
        return Ok(array);
    }
    arrow_cast::cast(array.as_ref(), data_type)
        .map_err(|e| Error::arrow(format!("cast to {data_type}"), e))
}

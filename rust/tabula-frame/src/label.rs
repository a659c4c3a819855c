//! Axis labels.

use std::fmt;

use chrono::NaiveDateTime;
use ordered_float::OrderedFloat;

use crate::period::Period;

/// A single positional identifier along an axis.
///
/// Labels are hashable and totally ordered so that they can key maps and be
/// looked up in an [`Index`](crate::Index). Multi-level indexes hand out their
/// entries as [`Label::Tuple`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
    Int(i64),
    Float(OrderedFloat<f64>),
    Str(String),
    Timestamp(NaiveDateTime),
    Period(Period),
    Tuple(Vec<Label>),
}

impl Label {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Label::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[Label]> {
        match self {
            Label::Tuple(parts) => Some(parts),
            _ => None,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Int(v) => write!(f, "{v}"),
            Label::Float(v) => write!(f, "{}", v.0),
            Label::Str(s) => f.write_str(s),
            Label::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S")),
            Label::Period(p) => write!(f, "{p}"),
            Label::Tuple(parts) => {
                f.write_str("(")?;
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{part}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl From<i64> for Label {
    fn from(v: i64) -> Self {
        Label::Int(v)
    }
}

impl From<f64> for Label {
    fn from(v: f64) -> Self {
        Label::Float(OrderedFloat(v))
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Label::Str(s.to_string())
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Label::Str(s)
    }
}

impl From<NaiveDateTime> for Label {
    fn from(ts: NaiveDateTime) -> Self {
        Label::Timestamp(ts)
    }
}

impl From<Period> for Label {
    fn from(p: Period) -> Self {
        Label::Period(p)
    }
}

impl From<Vec<Label>> for Label {
    fn from(parts: Vec<Label>) -> Self {
        Label::Tuple(parts)
    }
}

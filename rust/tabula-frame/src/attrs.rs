//! Lookup of container attributes by name.
//!
//! Comparison helpers and mocks address metadata such as `dtype` or `names`
//! through this trait instead of typed accessors, so any attribute can be
//! overridden or compared generically.

use std::fmt;

use itertools::Itertools;

use crate::{frame::DataFrame, index::Index, panel::Panel, series::Series};

/// An attribute value.
#[derive(Clone, Debug, PartialEq)]
pub enum Attr {
    Int(i64),
    Text(String),
    Names(Vec<Option<String>>),
    Shape(Vec<usize>),
}

impl fmt::Display for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attr::Int(v) => write!(f, "{v}"),
            Attr::Text(s) => write!(f, "{s:?}"),
            Attr::Names(names) => write!(
                f,
                "[{}]",
                names
                    .iter()
                    .map(|n| n.as_deref().map_or("None".to_string(), |n| format!("{n:?}")))
                    .join(", ")
            ),
            Attr::Shape(dims) => write!(f, "({})", dims.iter().join(", ")),
        }
    }
}

impl From<&str> for Attr {
    fn from(s: &str) -> Self {
        Attr::Text(s.to_string())
    }
}

impl From<String> for Attr {
    fn from(s: String) -> Self {
        Attr::Text(s)
    }
}

impl From<i64> for Attr {
    fn from(v: i64) -> Self {
        Attr::Int(v)
    }
}

/// Objects exposing named attributes.
pub trait Attributes {
    /// Returns the attribute called `name`, or `None` if there is no such
    /// attribute.
    fn attr(&self, name: &str) -> Option<Attr>;
}

impl<T: Attributes + ?Sized> Attributes for &T {
    fn attr(&self, name: &str) -> Option<Attr> {
        (**self).attr(name)
    }
}

impl Attributes for Index {
    fn attr(&self, name: &str) -> Option<Attr> {
        match name {
            "dtype" => Some(Attr::Text(self.dtype().to_string())),
            "inferred_type" => Some(Attr::Text(self.inferred_type().to_string())),
            "names" => Some(Attr::Names(self.names())),
            "name" => self.name().map(Attr::from),
            "nlevels" => Some(Attr::Int(self.nlevels() as i64)),
            "len" => Some(Attr::Int(self.len() as i64)),
            _ => None,
        }
    }
}

impl Attributes for Series {
    fn attr(&self, name: &str) -> Option<Attr> {
        match name {
            "dtype" => Some(Attr::Text(self.dtype().to_string())),
            "name" => self.name().map(|n| Attr::Text(n.to_string())),
            "len" => Some(Attr::Int(self.len() as i64)),
            "shape" => Some(Attr::Shape(vec![self.len()])),
            _ => None,
        }
    }
}

impl Attributes for DataFrame {
    fn attr(&self, name: &str) -> Option<Attr> {
        match name {
            "shape" => {
                let (rows, cols) = self.shape();
                Some(Attr::Shape(vec![rows, cols]))
            }
            "ndim" => Some(Attr::Int(2)),
            "len" => Some(Attr::Int(self.nrows() as i64)),
            _ => None,
        }
    }
}

impl Attributes for Panel {
    fn attr(&self, name: &str) -> Option<Attr> {
        match name {
            "shape" => {
                let (items, major, minor) = self.shape();
                Some(Attr::Shape(vec![items, major, minor]))
            }
            "ndim" => Some(Attr::Int(3)),
            _ => None,
        }
    }
}

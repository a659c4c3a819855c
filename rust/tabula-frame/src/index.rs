//! Axis indexes: flat label sequences and multi-level composite keys.

use std::fmt;

use itertools::Itertools;
use tabula_common::{Result, error::Error, verify_arg};

use crate::{label::Label, period::Frequency};

/// Declared storage type of an index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IndexDtype {
    Int64,
    Float64,
    Datetime,
    Period(Frequency),
    Object,
}

impl fmt::Display for IndexDtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexDtype::Int64 => f.write_str("int64"),
            IndexDtype::Float64 => f.write_str("float64"),
            IndexDtype::Datetime => f.write_str("datetime64[ns]"),
            IndexDtype::Period(freq) => write!(f, "period[{freq}]"),
            IndexDtype::Object => f.write_str("object"),
        }
    }
}

/// Kind of labels an index holds, inferred from the labels themselves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InferredType {
    Empty,
    Integer,
    Floating,
    MixedIntegerFloat,
    String,
    Datetime64,
    Period,
    Mixed,
}

impl fmt::Display for InferredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InferredType::Empty => "empty",
            InferredType::Integer => "integer",
            InferredType::Floating => "floating",
            InferredType::MixedIntegerFloat => "mixed-integer-float",
            InferredType::String => "string",
            InferredType::Datetime64 => "datetime64",
            InferredType::Period => "period",
            InferredType::Mixed => "mixed",
        };
        f.write_str(name)
    }
}

/// Flat, single-level index.
#[derive(Clone, Debug, PartialEq)]
pub struct SingleIndex {
    labels: Vec<Label>,
    name: Option<String>,
    dtype: IndexDtype,
}

impl SingleIndex {
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn dtype(&self) -> IndexDtype {
        self.dtype
    }
}

/// Multi-level index: every entry is a tuple with one label per level.
#[derive(Clone, Debug, PartialEq)]
pub struct MultiIndex {
    tuples: Vec<Vec<Label>>,
    names: Vec<Option<String>>,
}

impl MultiIndex {
    pub fn tuples(&self) -> &[Vec<Label>] {
        &self.tuples
    }

    pub fn nlevels(&self) -> usize {
        self.names.len()
    }

    /// Labels of one level, in entry order.
    pub fn level_values(&self, level: usize) -> Vec<Label> {
        self.tuples.iter().map(|t| t[level].clone()).collect()
    }
}

/// An ordered sequence of axis labels.
#[derive(Clone, Debug, PartialEq)]
pub enum Index {
    Single(SingleIndex),
    Multi(MultiIndex),
}

impl Index {
    /// Creates a flat index; the dtype is inferred from the labels.
    pub fn new(labels: Vec<Label>, name: Option<String>) -> Index {
        let dtype = infer_dtype(&labels);
        Index::Single(SingleIndex {
            labels,
            name,
            dtype,
        })
    }

    /// Integer index `0..len`.
    pub fn range(len: usize) -> Index {
        Index::new((0..len as i64).map(Label::Int).collect(), None)
    }

    /// Flat index over string labels.
    pub fn from_strs<S: AsRef<str>>(labels: &[S]) -> Index {
        Index::new(
            labels.iter().map(|s| Label::from(s.as_ref())).collect(),
            None,
        )
    }

    /// Creates a multi-level index from equal-length tuples.
    ///
    /// `names`, when given, must have one entry per level. An empty tuple list
    /// needs explicit names to fix the level count.
    pub fn from_tuples(
        tuples: Vec<Vec<Label>>,
        names: Option<Vec<Option<String>>>,
    ) -> Result<Index> {
        let nlevels = match (&names, tuples.first()) {
            (_, Some(first)) => first.len(),
            (Some(names), None) => names.len(),
            (None, None) => {
                return Err(Error::invalid_arg(
                    "tuples",
                    "empty tuple list requires level names",
                ));
            }
        };
        verify_arg!(tuples, nlevels >= 1);
        if let Some(bad) = tuples.iter().position(|t| t.len() != nlevels) {
            return Err(Error::invalid_arg(
                "tuples",
                format!(
                    "tuple {bad} has {} levels, expected {nlevels}",
                    tuples[bad].len()
                ),
            ));
        }
        let names = names.unwrap_or_else(|| vec![None; nlevels]);
        if names.len() != nlevels {
            return Err(Error::invalid_arg(
                "names",
                format!("{} names for {nlevels} levels", names.len()),
            ));
        }
        Ok(Index::Multi(MultiIndex { tuples, names }))
    }

    pub fn len(&self) -> usize {
        match self {
            Index::Single(idx) => idx.labels.len(),
            Index::Multi(idx) => idx.tuples.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn nlevels(&self) -> usize {
        match self {
            Index::Single(_) => 1,
            Index::Multi(idx) => idx.nlevels(),
        }
    }

    /// Label at `pos`; multi-level entries are returned as [`Label::Tuple`].
    pub fn label(&self, pos: usize) -> Label {
        match self {
            Index::Single(idx) => idx.labels[pos].clone(),
            Index::Multi(idx) => Label::Tuple(idx.tuples[pos].clone()),
        }
    }

    pub fn labels(&self) -> Vec<Label> {
        (0..self.len()).map(|i| self.label(i)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = Label> + '_ {
        (0..self.len()).map(|i| self.label(i))
    }

    /// Name of a flat index; `None` for multi-level indexes.
    pub fn name(&self) -> Option<&str> {
        match self {
            Index::Single(idx) => idx.name(),
            Index::Multi(_) => None,
        }
    }

    /// Per-level names.
    pub fn names(&self) -> Vec<Option<String>> {
        match self {
            Index::Single(idx) => vec![idx.name.clone()],
            Index::Multi(idx) => idx.names.clone(),
        }
    }

    /// Replaces the per-level names; the count must match the level count.
    pub fn set_names(&mut self, names: Vec<Option<String>>) -> Result<()> {
        if names.len() != self.nlevels() {
            return Err(Error::invalid_arg(
                "names",
                format!("{} names for {} levels", names.len(), self.nlevels()),
            ));
        }
        match self {
            Index::Single(idx) => idx.name = names.into_iter().next().flatten(),
            Index::Multi(idx) => idx.names = names,
        }
        Ok(())
    }

    pub fn dtype(&self) -> IndexDtype {
        match self {
            Index::Single(idx) => idx.dtype,
            Index::Multi(_) => IndexDtype::Object,
        }
    }

    pub fn inferred_type(&self) -> InferredType {
        match self {
            Index::Single(idx) => infer_type(&idx.labels),
            Index::Multi(idx) if idx.tuples.is_empty() => InferredType::Empty,
            Index::Multi(_) => InferredType::Mixed,
        }
    }

    /// Returns `true` when both indexes hold the same labels in the same
    /// order. Names and dtypes are not considered.
    pub fn equals(&self, other: &Index) -> bool {
        match (self, other) {
            (Index::Single(a), Index::Single(b)) => a.labels == b.labels,
            (Index::Multi(a), Index::Multi(b)) => a.tuples == b.tuples,
            _ => false,
        }
    }

    /// Position of the first occurrence of `label`.
    pub fn position(&self, label: &Label) -> Option<usize> {
        match (self, label) {
            (Index::Single(idx), _) => idx.labels.iter().position(|l| l == label),
            (Index::Multi(idx), Label::Tuple(parts)) => {
                idx.tuples.iter().position(|t| t.as_slice() == parts.as_slice())
            }
            (Index::Multi(_), _) => None,
        }
    }

    pub fn contains(&self, label: &Label) -> bool {
        self.position(label).is_some()
    }

    pub fn is_unique(&self) -> bool {
        self.iter().all_unique()
    }

    /// New index holding the entries at `positions`, keeping names.
    pub fn take(&self, positions: &[usize]) -> Index {
        match self {
            Index::Single(idx) => Index::Single(SingleIndex {
                labels: positions.iter().map(|&p| idx.labels[p].clone()).collect(),
                name: idx.name.clone(),
                dtype: idx.dtype,
            }),
            Index::Multi(idx) => Index::Multi(MultiIndex {
                tuples: positions.iter().map(|&p| idx.tuples[p].clone()).collect(),
                names: idx.names.clone(),
            }),
        }
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Index::Single(_) => "Index",
            Index::Multi(_) => "MultiIndex",
        };
        write!(f, "{kind}([{}], dtype={})", self.iter().join(", "), self.dtype())
    }
}

fn infer_dtype(labels: &[Label]) -> IndexDtype {
    match infer_type(labels) {
        InferredType::Integer => IndexDtype::Int64,
        InferredType::Floating => IndexDtype::Float64,
        InferredType::Datetime64 => IndexDtype::Datetime,
        InferredType::Period => {
            let freqs = labels
                .iter()
                .filter_map(|l| match l {
                    Label::Period(p) => Some(p.freq()),
                    _ => None,
                })
                .dedup()
                .collect::<Vec<_>>();
            match freqs.as_slice() {
                [freq] => IndexDtype::Period(*freq),
                _ => IndexDtype::Object,
            }
        }
        _ => IndexDtype::Object,
    }
}

fn infer_type(labels: &[Label]) -> InferredType {
    let Some(first) = labels.first() else {
        return InferredType::Empty;
    };
    let same_kind = labels
        .iter()
        .all(|l| std::mem::discriminant(l) == std::mem::discriminant(first));
    if same_kind {
        return match first {
            Label::Int(_) => InferredType::Integer,
            Label::Float(_) => InferredType::Floating,
            Label::Str(_) => InferredType::String,
            Label::Timestamp(_) => InferredType::Datetime64,
            Label::Period(_) => InferredType::Period,
            Label::Tuple(_) => InferredType::Mixed,
        };
    }
    if labels
        .iter()
        .all(|l| matches!(l, Label::Int(_) | Label::Float(_)))
    {
        InferredType::MixedIntegerFloat
    } else {
        InferredType::Mixed
    }
}

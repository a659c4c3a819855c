//! Configurable synthetic indexes and tables.
//!
//! [`make_custom_index`] builds flat or multi-level indexes with readable,
//! self-describing labels of the form `{prefix}_l{level}_g{group}`, where each
//! group label is repeated a per-level number of times. [`make_custom_dataframe`]
//! combines two such indexes with a cell generator into a table.

use std::{fmt, str::FromStr, sync::Arc};

use arrow_schema::DataType;
use tabula_common::{Result, error::Error, verify_arg};
use tabula_frame::{DataFrame, Index, Label, Value};

use crate::data_gen;

/// Label domain of a single-level index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexType {
    Int,
    Float,
    Str,
    Unicode,
    Datetime,
    Period,
}

impl IndexType {
    /// Short code accepted by [`IndexType::from_str`].
    pub fn code(&self) -> &'static str {
        match self {
            IndexType::Int => "i",
            IndexType::Float => "f",
            IndexType::Str => "s",
            IndexType::Unicode => "u",
            IndexType::Datetime => "dt",
            IndexType::Period => "p",
        }
    }

    /// Random index of this domain with `len` entries.
    pub fn make_index(&self, len: usize) -> Index {
        match self {
            IndexType::Int => data_gen::make_int_index(len),
            IndexType::Float => data_gen::make_float_index(len),
            IndexType::Str => data_gen::make_string_index(len),
            IndexType::Unicode => data_gen::make_unicode_index(len),
            IndexType::Datetime => data_gen::make_date_index(len),
            IndexType::Period => data_gen::make_period_index(len),
        }
    }
}

impl FromStr for IndexType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "i" => Ok(IndexType::Int),
            "f" => Ok(IndexType::Float),
            "s" => Ok(IndexType::Str),
            "u" => Ok(IndexType::Unicode),
            "dt" => Ok(IndexType::Datetime),
            "p" => Ok(IndexType::Period),
            _ => Err(Error::invalid_arg(
                "idx_type",
                format!("{s:?} is not a legal value, expected one of i/f/s/u/dt/p"),
            )),
        }
    }
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Level naming of a generated index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum IndexNames {
    /// `{prefix}{level}` for every level.
    #[default]
    Default,
    /// No level names.
    None,
    /// One name per level.
    Explicit(Vec<String>),
}

/// Shape of a generated index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexSpec {
    /// Number of levels, at least one.
    pub nlevels: usize,
    /// Label and default-name prefix.
    pub prefix: String,
    pub names: IndexNames,
    /// Per-level repetition counts; missing trailing levels repeat once.
    pub ndupe_l: Vec<usize>,
    /// Single-level shortcut: a random index of this domain instead of
    /// generated group labels. Only valid with one level.
    pub idx_type: Option<IndexType>,
}

impl Default for IndexSpec {
    fn default() -> Self {
        IndexSpec {
            nlevels: 1,
            prefix: "#".to_string(),
            names: IndexNames::Default,
            ndupe_l: Vec::new(),
            idx_type: None,
        }
    }
}

impl IndexSpec {
    pub fn new(nlevels: usize) -> IndexSpec {
        IndexSpec {
            nlevels,
            ..Default::default()
        }
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn names(mut self, names: IndexNames) -> Self {
        self.names = names;
        self
    }

    pub fn ndupe(mut self, ndupe_l: Vec<usize>) -> Self {
        self.ndupe_l = ndupe_l;
        self
    }

    pub fn idx_type(mut self, idx_type: IndexType) -> Self {
        self.idx_type = Some(idx_type);
        self
    }

    fn validate(&self) -> Result<()> {
        verify_arg!(nlevels, self.nlevels >= 1);
        if self.ndupe_l.len() > self.nlevels {
            return Err(Error::invalid_arg(
                "ndupe_l",
                format!(
                    "{} repetition counts for {} levels",
                    self.ndupe_l.len(),
                    self.nlevels
                ),
            ));
        }
        if let Some(level) = self.ndupe_l.iter().position(|&n| n == 0) {
            return Err(Error::invalid_arg(
                "ndupe_l",
                format!("repetition count of level {level} must be positive"),
            ));
        }
        if let IndexNames::Explicit(names) = &self.names {
            if names.len() != self.nlevels {
                return Err(Error::invalid_arg(
                    "names",
                    format!("{} names for {} levels", names.len(), self.nlevels),
                ));
            }
        }
        if self.idx_type.is_some() && self.nlevels > 1 {
            return Err(Error::invalid_arg(
                "idx_type",
                "a typed index can only be requested for a single level",
            ));
        }
        Ok(())
    }

    fn level_names(&self) -> Vec<Option<String>> {
        match &self.names {
            IndexNames::Default => (0..self.nlevels)
                .map(|i| Some(format!("{}{i}", self.prefix)))
                .collect(),
            IndexNames::None => vec![None; self.nlevels],
            IndexNames::Explicit(names) => names.iter().cloned().map(Some).collect(),
        }
    }
}

/// Builds an index of `nentries` labels shaped by `spec`.
///
/// Level `i` consists of the labels `{prefix}_l{i}_g{j}` for consecutive
/// groups `j`, each repeated `ndupe_l[i]` times, truncated to `nentries`. A
/// single level gives a flat index; several levels give a multi-level index
/// whose tuples zip the levels together. With exactly one entry the result is
/// flat, holding the lone tuple as its only label.
pub fn make_custom_index(nentries: usize, spec: &IndexSpec) -> Result<Index> {
    spec.validate()?;
    let names = spec.level_names();

    if let Some(idx_type) = spec.idx_type {
        let mut index = idx_type.make_index(nentries);
        index.set_names(names)?;
        return Ok(index);
    }

    let levels = (0..spec.nlevels)
        .map(|level| {
            let ndupe = spec.ndupe_l.get(level).copied().unwrap_or(1);
            level_labels(&spec.prefix, level, ndupe, nentries)
        })
        .collect::<Vec<_>>();

    if spec.nlevels == 1 {
        let labels = levels
            .into_iter()
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(Label::from)
            .collect();
        return Ok(Index::new(labels, names.into_iter().next().flatten()));
    }

    let tuples = (0..nentries)
        .map(|pos| {
            levels
                .iter()
                .map(|level| Label::from(level[pos].as_str()))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    if nentries == 1 {
        let name = names.into_iter().next().flatten();
        let tuple = tuples.into_iter().next().unwrap_or_default();
        return Ok(Index::new(vec![Label::Tuple(tuple)], name));
    }
    Index::from_tuples(tuples, Some(names))
}

/// Group labels of one level: `ndupe` copies of each group label, ordered by
/// the numeric parts of the label, truncated to `nentries`.
fn level_labels(prefix: &str, level: usize, ndupe: usize, nentries: usize) -> Vec<String> {
    let ngroups = nentries / ndupe + 1;
    let mut labels = (0..ngroups)
        .flat_map(|group| std::iter::repeat_n(format!("{prefix}_l{level}_g{group}"), ndupe))
        .collect::<Vec<_>>();
    labels.sort_by_cached_key(|label| numeric_key(label));
    labels.truncate(nentries);
    labels
}

/// Digit runs of `label` as integers, so that `g10` orders after `g9`.
fn numeric_key(label: &str) -> Vec<u64> {
    label
        .split(|c: char| !c.is_ascii_digit())
        .filter(|part| !part.is_empty())
        .filter_map(|part| part.parse().ok())
        .collect()
}

/// Generates the value of the cell at (row, column).
pub type CellGenerator = Arc<dyn Fn(usize, usize) -> Value + Send + Sync>;

/// Shape and content of a generated table.
#[derive(Clone)]
pub struct FrameSpec {
    /// Row index shape; defaults to prefix `R`.
    pub row_index: IndexSpec,
    /// Column index shape; defaults to prefix `C`.
    pub column_index: IndexSpec,
    /// Cell generator; defaults to the text `R{row}C{col}`.
    ///
    /// Periods are index labels only: a generator returning
    /// [`Value::Period`] makes [`make_custom_dataframe`] fail with a
    /// not-implemented error.
    pub data_gen: Option<CellGenerator>,
    /// Storage type every column is cast to; inferred when `None`.
    pub dtype: Option<DataType>,
}

impl Default for FrameSpec {
    fn default() -> Self {
        FrameSpec {
            row_index: IndexSpec::default().prefix("R"),
            column_index: IndexSpec::default().prefix("C"),
            data_gen: None,
            dtype: None,
        }
    }
}

impl fmt::Debug for FrameSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameSpec")
            .field("row_index", &self.row_index)
            .field("column_index", &self.column_index)
            .field("data_gen", &self.data_gen.as_ref().map(|_| "<fn>"))
            .field("dtype", &self.dtype)
            .finish()
    }
}

impl FrameSpec {
    pub fn row_index(mut self, spec: IndexSpec) -> Self {
        self.row_index = spec;
        self
    }

    pub fn column_index(mut self, spec: IndexSpec) -> Self {
        self.column_index = spec;
        self
    }

    /// Sets the cell generator. See [`FrameSpec::data_gen`] for the values it
    /// may return.
    pub fn data_gen(
        mut self,
        f: impl Fn(usize, usize) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.data_gen = Some(Arc::new(f));
        self
    }

    pub fn dtype(mut self, dtype: DataType) -> Self {
        self.dtype = Some(dtype);
        self
    }
}

/// Builds an `nrows` x `ncols` table whose axes come from
/// [`make_custom_index`] and whose cells come from the spec's generator.
///
/// Both index specs are validated before any cell is generated.
pub fn make_custom_dataframe(nrows: usize, ncols: usize, spec: &FrameSpec) -> Result<DataFrame> {
    spec.row_index.validate()?;
    spec.column_index.validate()?;

    let columns = make_custom_index(ncols, &spec.column_index)?;
    let index = make_custom_index(nrows, &spec.row_index)?;

    let cell = |r: usize, c: usize| match &spec.data_gen {
        Some(f) => f(r, c),
        None => Value::from(format!("R{r}C{c}")),
    };
    let rows = (0..nrows)
        .map(|r| (0..ncols).map(|c| cell(r, c)).collect::<Vec<_>>())
        .collect::<Vec<_>>();
    DataFrame::from_rows(&rows, index, columns, spec.dtype.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_common::error::ErrorKind;
    use tabula_frame::{Frequency, IndexDtype, Period};

    fn strs(labels: &[Label]) -> Vec<String> {
        labels.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_single_level_with_duplicates() {
        let index = make_custom_index(5, &IndexSpec::new(1).ndupe(vec![2])).unwrap();
        assert_eq!(index.nlevels(), 1);
        assert_eq!(
            strs(&index.labels()),
            vec!["#_l0_g0", "#_l0_g0", "#_l0_g1", "#_l0_g1", "#_l0_g2"]
        );
        assert_eq!(index.name(), Some("#0"));
    }

    #[test]
    fn test_multi_level() {
        let spec = IndexSpec::new(2)
            .prefix("R")
            .names(IndexNames::None)
            .ndupe(vec![2, 1]);
        let index = make_custom_index(4, &spec).unwrap();
        assert_eq!(index.nlevels(), 2);
        assert_eq!(index.len(), 4);
        assert_eq!(
            index.label(1),
            Label::Tuple(vec![Label::from("R_l0_g0"), Label::from("R_l1_g1")])
        );
        assert_eq!(
            index.label(3),
            Label::Tuple(vec![Label::from("R_l0_g1"), Label::from("R_l1_g3")])
        );
        assert_eq!(index.names(), vec![None, None]);
    }

    #[test]
    fn test_numeric_group_order() {
        let index = make_custom_index(12, &IndexSpec::default()).unwrap();
        assert_eq!(index.label(10), Label::from("#_l0_g10"));
        assert_eq!(index.label(9), Label::from("#_l0_g9"));
    }

    #[test]
    fn test_single_entry_multi_level_is_flat() {
        let index = make_custom_index(1, &IndexSpec::new(3)).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.name(), Some("#0"));
        assert_eq!(index.label(0).as_tuple().map(|t| t.len()), Some(3));
    }

    #[test]
    fn test_empty() {
        assert!(make_custom_index(0, &IndexSpec::new(1)).unwrap().is_empty());
        let multi = make_custom_index(0, &IndexSpec::new(2)).unwrap();
        assert!(multi.is_empty());
        assert_eq!(multi.nlevels(), 2);
    }

    #[test]
    fn test_typed_index() {
        let spec = IndexSpec::new(1).idx_type("dt".parse().unwrap());
        let index = make_custom_index(4, &spec).unwrap();
        assert_eq!(index.dtype(), IndexDtype::Datetime);
        assert_eq!(index.name(), Some("#0"));
        assert!("zz".parse::<IndexType>().is_err());
    }

    #[test]
    fn test_invalid_specs() {
        let cases = [
            IndexSpec::new(0),
            IndexSpec::new(1).ndupe(vec![1, 2]),
            IndexSpec::new(2).ndupe(vec![0]),
            IndexSpec::new(2).names(IndexNames::Explicit(vec!["a".into()])),
            IndexSpec::new(2).idx_type(IndexType::Int),
        ];
        for spec in cases {
            let err = make_custom_index(3, &spec).unwrap_err();
            assert!(
                matches!(err.kind(), ErrorKind::InvalidArgument { .. }),
                "{spec:?}"
            );
        }
    }

    #[test]
    fn test_default_dataframe() {
        let df = make_custom_dataframe(5, 3, &FrameSpec::default()).unwrap();
        assert_eq!(df.shape(), (5, 3));
        assert_eq!(df.value(3, 2).unwrap(), Value::from("R3C2"));
        assert_eq!(df.columns().label(0), Label::from("C_l0_g0"));
        assert_eq!(df.index().label(4), Label::from("R_l0_g4"));
        assert_eq!(df.columns().name(), Some("C0"));
        assert_eq!(df.index().name(), Some("R0"));
    }

    #[test]
    fn test_dataframe_with_generator_and_dtype() {
        let spec = FrameSpec::default()
            .column_index(IndexSpec::new(2).prefix("C").ndupe(vec![2]))
            .data_gen(|r, c| Value::Int((r * 10 + c) as i64))
            .dtype(DataType::Float64);
        let df = make_custom_dataframe(2, 4, &spec).unwrap();
        assert_eq!(df.columns().nlevels(), 2);
        assert_eq!(df.dtypes(), vec![DataType::Float64; 4]);
        assert_eq!(df.value(1, 3).unwrap(), Value::Float64(13.0));
    }

    #[test]
    fn test_dataframe_rejects_period_cells() {
        let spec = FrameSpec::default()
            .row_index(IndexSpec::new(1).idx_type(IndexType::Period))
            .data_gen(|r, _| Value::Period(Period::new(Frequency::BusinessDay, r as i64)));
        let err = make_custom_dataframe(3, 2, &spec).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::NotImplemented { .. }), "{err}");
    }

    #[test]
    fn test_dataframe_rejects_bad_axes() {
        let spec = FrameSpec::default().row_index(IndexSpec::new(1).ndupe(vec![1, 1]));
        assert!(make_custom_dataframe(3, 3, &spec).is_err());
    }
}

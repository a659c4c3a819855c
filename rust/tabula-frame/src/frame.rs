//! Labeled two-dimensional table.

use std::{collections::BTreeMap, ops::Range};

use arrow_array::{Array, ArrayRef};
use arrow_schema::DataType;
use tabula_common::{Result, error::Error};

use crate::{
    index::Index,
    label::Label,
    series::Series,
    value::{Value, array_from_values, array_from_values_as},
};

/// Rows x columns table. Each column is an Arrow array whose length equals the
/// row index length; the column index holds one label per array.
#[derive(Clone, Debug)]
pub struct DataFrame {
    index: Index,
    columns: Index,
    data: Vec<ArrayRef>,
}

impl DataFrame {
    pub fn new(index: Index, columns: Index, data: Vec<ArrayRef>) -> Result<DataFrame> {
        if columns.len() != data.len() {
            return Err(Error::invalid_arg(
                "columns",
                format!("{} column labels for {} arrays", columns.len(), data.len()),
            ));
        }
        if let Some(bad) = data.iter().position(|a| a.len() != index.len()) {
            return Err(Error::invalid_arg(
                "data",
                format!(
                    "column {bad} has {} values, index has {}",
                    data[bad].len(),
                    index.len()
                ),
            ));
        }
        Ok(DataFrame {
            index,
            columns,
            data,
        })
    }

    /// Builds a table from row-major values.
    ///
    /// Column storage types are inferred per column unless `dtype` is given,
    /// in which case every column is cast to it.
    pub fn from_rows(
        rows: &[Vec<Value>],
        index: Index,
        columns: Index,
        dtype: Option<&DataType>,
    ) -> Result<DataFrame> {
        if rows.len() != index.len() {
            return Err(Error::invalid_arg(
                "rows",
                format!("{} rows for an index of length {}", rows.len(), index.len()),
            ));
        }
        if let Some(bad) = rows.iter().position(|r| r.len() != columns.len()) {
            return Err(Error::invalid_arg(
                "rows",
                format!(
                    "row {bad} has {} values, expected {}",
                    rows[bad].len(),
                    columns.len()
                ),
            ));
        }
        let data = (0..columns.len())
            .map(|c| {
                let values = rows.iter().map(|r| r[c].clone()).collect::<Vec<_>>();
                match dtype {
                    Some(dtype) => array_from_values_as(&values, dtype),
                    None => array_from_values(&values),
                }
            })
            .collect::<Result<Vec<_>>>()?;
        DataFrame::new(index, columns, data)
    }

    /// Builds a table from named columns; columns are ordered by label.
    ///
    /// All series must share the same index.
    pub fn from_series(series: BTreeMap<Label, Series>) -> Result<DataFrame> {
        let index = match series.values().next() {
            Some(first) => first.index().clone(),
            None => Index::range(0),
        };
        if let Some((label, _)) = series.iter().find(|(_, s)| !s.index().equals(&index)) {
            return Err(Error::invalid_arg(
                "series",
                format!("index of column {label} differs from the first column"),
            ));
        }
        let columns = Index::new(series.keys().cloned().collect(), None);
        let data = series.into_values().map(|s| s.values().clone()).collect();
        DataFrame::new(index, columns, data)
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn columns(&self) -> &Index {
        &self.columns
    }

    pub fn nrows(&self) -> usize {
        self.index.len()
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }

    pub fn column_array(&self, pos: usize) -> &ArrayRef {
        &self.data[pos]
    }

    pub fn dtypes(&self) -> Vec<DataType> {
        self.data.iter().map(|a| a.data_type().clone()).collect()
    }

    /// Column at position `pos`, named by its column label.
    pub fn icol(&self, pos: usize) -> Result<Series> {
        let array = self.data.get(pos).ok_or_else(|| {
            Error::invalid_arg("pos", format!("column {pos} of {}", self.ncols()))
        })?;
        Series::new(
            array.clone(),
            self.index.clone(),
            Some(self.columns.label(pos)),
        )
    }

    /// First column labeled `label`.
    pub fn column(&self, label: &Label) -> Result<Option<Series>> {
        self.columns
            .position(label)
            .map(|pos| self.icol(pos))
            .transpose()
    }

    pub fn contains_column(&self, label: &Label) -> bool {
        self.columns.contains(label)
    }

    pub fn value(&self, row: usize, col: usize) -> Result<Value> {
        let array = self.data.get(col).ok_or_else(|| {
            Error::invalid_arg("col", format!("column {col} of {}", self.ncols()))
        })?;
        Value::from_array(array.as_ref(), row)
    }

    /// Overwrites one cell. The column keeps its storage type unless the new
    /// value forces a wider one (e.g. a float into an integer column).
    pub fn set_value(&mut self, row: usize, col: usize, value: Value) -> Result<()> {
        if row >= self.nrows() {
            return Err(Error::invalid_arg(
                "row",
                format!("row {row} of {}", self.nrows()),
            ));
        }
        self.update_column(col, |values| values[row] = value)
    }

    /// Sets the cells of column `col` in `rows` to null.
    pub fn set_nulls(&mut self, col: usize, rows: Range<usize>) -> Result<()> {
        let end = rows.end.min(self.nrows());
        let rows = rows.start.min(end)..end;
        self.update_column(col, |values| {
            values[rows].iter_mut().for_each(|v| *v = Value::Null)
        })
    }

    /// Groups the columns by physical storage type.
    ///
    /// Each group is a table with the same row index and the subset of column
    /// labels whose arrays share that type, keyed by the type name.
    pub fn blocks(&self) -> BTreeMap<String, DataFrame> {
        let mut groups = BTreeMap::<String, Vec<usize>>::new();
        for (pos, array) in self.data.iter().enumerate() {
            groups
                .entry(array.data_type().to_string())
                .or_default()
                .push(pos);
        }
        groups
            .into_iter()
            .map(|(key, positions)| {
                let block = DataFrame {
                    index: self.index.clone(),
                    columns: self.columns.take(&positions),
                    data: positions.iter().map(|&p| self.data[p].clone()).collect(),
                };
                (key, block)
            })
            .collect()
    }

    fn update_column(&mut self, col: usize, f: impl FnOnce(&mut Vec<Value>)) -> Result<()> {
        let array = self.data.get(col).ok_or_else(|| {
            Error::invalid_arg("col", format!("column {col} of {}", self.ncols()))
        })?;
        let original_type = array.data_type().clone();
        let mut values = Value::vec_from_array(array.as_ref())?;
        f(&mut values);
        let mut updated = array_from_values(&values)?;
        if updated.data_type() == &DataType::Null {
            updated = array_from_values_as(&values, &original_type)?;
        }
        self.data[col] = updated;
        Ok(())
    }
}

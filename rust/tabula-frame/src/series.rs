//! Labeled one-dimensional column.

use arrow_array::{Array, ArrayRef};
use arrow_schema::DataType;
use tabula_common::{Result, error::Error};

use crate::{
    index::Index,
    label::Label,
    value::{Value, array_from_values},
};

/// An Arrow array paired with an index of the same length.
#[derive(Clone, Debug)]
pub struct Series {
    values: ArrayRef,
    index: Index,
    name: Option<Label>,
}

impl Series {
    pub fn new(values: ArrayRef, index: Index, name: Option<Label>) -> Result<Series> {
        if values.len() != index.len() {
            return Err(Error::invalid_arg(
                "index",
                format!(
                    "index length {} does not match {} values",
                    index.len(),
                    values.len()
                ),
            ));
        }
        Ok(Series {
            values,
            index,
            name,
        })
    }

    /// Builds the value array from scalars, inferring its storage type.
    pub fn from_values(values: &[Value], index: Index, name: Option<Label>) -> Result<Series> {
        Series::new(array_from_values(values)?, index, name)
    }

    pub fn values(&self) -> &ArrayRef {
        &self.values
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn name(&self) -> Option<&Label> {
        self.name.as_ref()
    }

    pub fn dtype(&self) -> &DataType {
        self.values.data_type()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value(&self, pos: usize) -> Result<Value> {
        Value::from_array(self.values.as_ref(), pos)
    }

    pub fn to_values(&self) -> Result<Vec<Value>> {
        Value::vec_from_array(self.values.as_ref())
    }

    /// Value at the first position labeled `label`.
    pub fn get(&self, label: &Label) -> Result<Option<Value>> {
        self.index
            .position(label)
            .map(|pos| self.value(pos))
            .transpose()
    }
}

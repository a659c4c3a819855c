//! Assertions over indexes, series, tables and stacked tables.

use arrow_array::Array;
use tabula_common::{Result, ensure, error::Error};
use tabula_frame::{Attributes, DataFrame, Index, Panel, Panel4D, PanelAxis, Series, Stacked};

use super::{Datum, assert_almost_equal, assert_equal, in_context};

/// Asserts that two indexes hold the same labels in the same order.
pub fn assert_index_equal(left: &Index, right: &Index) -> Result<()> {
    ensure!(
        left.equals(right),
        "index mismatch: left {left}, right {right}"
    );
    Ok(())
}

/// Asserts that both objects expose attribute `attr` with equal values.
pub fn assert_attr_equal<L, R>(attr: &str, left: &L, right: &R) -> Result<()>
where
    L: Attributes + ?Sized,
    R: Attributes + ?Sized,
{
    let l = left
        .attr(attr)
        .ok_or_else(|| Error::assertion(format!("left has no attribute {attr}")))?;
    let r = right
        .attr(attr)
        .ok_or_else(|| Error::assertion(format!("right has no attribute {attr}")))?;
    assert_equal(&l, &r, &format!("attr is not equal [{attr}]"))
}

/// Options of [`assert_series_equal`].
#[derive(Clone, Debug)]
pub struct SeriesCompareOptions {
    /// Compare the storage types of the values.
    pub check_dtype: bool,
    /// Compare the declared and inferred label types of the indexes.
    pub check_index_type: bool,
    /// Relax the tolerance for narrow floats, and compare the indexes
    /// approximately instead of exactly.
    pub check_less_precise: bool,
    /// Compare the series names.
    pub check_names: bool,
}

impl Default for SeriesCompareOptions {
    fn default() -> Self {
        SeriesCompareOptions {
            check_dtype: true,
            check_index_type: false,
            check_less_precise: false,
            check_names: false,
        }
    }
}

/// Asserts that two series hold approximately equal values over equal
/// indexes.
pub fn assert_series_equal(
    left: &Series,
    right: &Series,
    options: &SeriesCompareOptions,
) -> Result<()> {
    in_context(
        assert_almost_equal(
            &Datum::from_series(left)?,
            &Datum::from_series(right)?,
            options.check_less_precise,
        ),
        || "series values".to_string(),
    )?;
    if options.check_dtype {
        assert_attr_equal("dtype", left, right)?;
    }
    assert_axis_equal(left.index(), right.index(), options.check_less_precise)?;
    if options.check_index_type {
        assert_index_type_equal(left.index(), right.index())?;
    }
    if options.check_names {
        ensure!(
            left.name() == right.name(),
            "series names differ: {:?} != {:?}",
            left.name(),
            right.name()
        );
    }
    Ok(())
}

/// Options of [`assert_frame_equal`].
#[derive(Clone, Debug)]
pub struct FrameCompareOptions {
    /// Compare the storage types of the columns.
    pub check_dtype: bool,
    /// Compare the declared and inferred label types of the row indexes.
    pub check_index_type: bool,
    /// Compare the declared and inferred label types of the column indexes.
    pub check_column_type: bool,
    /// Relax the tolerance for narrow floats, and compare the axes
    /// approximately instead of exactly.
    pub check_less_precise: bool,
    /// Compare the level names of both axes.
    pub check_names: bool,
    /// Compare storage-type groups of columns instead of individual columns.
    pub by_blocks: bool,
}

impl Default for FrameCompareOptions {
    fn default() -> Self {
        FrameCompareOptions {
            check_dtype: true,
            check_index_type: false,
            check_column_type: false,
            check_less_precise: false,
            check_names: true,
            by_blocks: false,
        }
    }
}

/// Asserts that two tables have equal axes and approximately equal columns.
///
/// The row and column indexes are compared first in both modes. With
/// `by_blocks`, columns are then grouped by storage type (see
/// [`DataFrame::blocks`]) and each group is compared as a table of its own;
/// both sides must have the same set of groups.
pub fn assert_frame_equal(
    left: &DataFrame,
    right: &DataFrame,
    options: &FrameCompareOptions,
) -> Result<()> {
    in_context(
        assert_axis_equal(left.columns(), right.columns(), options.check_less_precise),
        || "columns".to_string(),
    )?;
    in_context(
        assert_axis_equal(left.index(), right.index(), options.check_less_precise),
        || "index".to_string(),
    )?;

    if options.by_blocks {
        assert_blocks_equal(left, right, options)?;
    } else {
        assert_columns_equal(left, right, options)?;
    }

    if options.check_index_type {
        in_context(assert_index_type_equal(left.index(), right.index()), || {
            "index".to_string()
        })?;
    }
    if options.check_column_type {
        in_context(
            assert_index_type_equal(left.columns(), right.columns()),
            || "columns".to_string(),
        )?;
    }
    if options.check_names {
        in_context(assert_attr_equal("names", left.index(), right.index()), || {
            "index".to_string()
        })?;
        in_context(
            assert_attr_equal("names", left.columns(), right.columns()),
            || "columns".to_string(),
        )?;
    }
    Ok(())
}

fn assert_columns_equal(
    left: &DataFrame,
    right: &DataFrame,
    options: &FrameCompareOptions,
) -> Result<()> {
    let series_options = SeriesCompareOptions {
        check_dtype: options.check_dtype,
        check_index_type: options.check_index_type,
        check_less_precise: options.check_less_precise,
        check_names: false,
    };
    for pos in 0..left.ncols() {
        let label = left.columns().label(pos);
        ensure!(
            right.contains_column(&label),
            "column {label} missing from right"
        );
        ensure!(
            pos < right.ncols(),
            "right has {} columns, expected at least {}",
            right.ncols(),
            pos + 1
        );
        in_context(
            assert_series_equal(&left.icol(pos)?, &right.icol(pos)?, &series_options),
            || format!("column {label}"),
        )?;
    }
    Ok(())
}

fn assert_blocks_equal(
    left: &DataFrame,
    right: &DataFrame,
    options: &FrameCompareOptions,
) -> Result<()> {
    let lblocks = left.blocks();
    let rblocks = right.blocks();
    for dtype in lblocks.keys() {
        ensure!(rblocks.contains_key(dtype), "dtype {dtype} missing from right");
    }
    for dtype in rblocks.keys() {
        ensure!(lblocks.contains_key(dtype), "dtype {dtype} missing from left");
    }
    let block_options = FrameCompareOptions {
        by_blocks: false,
        ..options.clone()
    };
    for (dtype, lblock) in &lblocks {
        in_context(
            assert_frame_equal(lblock, &rblocks[dtype], &block_options),
            || format!("block {dtype}"),
        )?;
    }
    Ok(())
}

/// Compares the layers of two stacked tables.
///
/// Every shared axis (items, major and minor) must be equal; then each layer
/// key of `left` must exist in `right` and the paired layers are compared by
/// `assert_layer`. Keys present only in `right` fail the comparison.
pub fn assert_panelnd_equal<P, F>(
    left: &P,
    right: &P,
    check_less_precise: bool,
    assert_layer: F,
) -> Result<()>
where
    P: Stacked,
    F: Fn(&P::Layer, &P::Layer, bool) -> Result<()>,
{
    for axis in PanelAxis::SHARED {
        if let (Some(l), Some(r)) = (left.axis(axis), right.axis(axis)) {
            in_context(assert_index_equal(l, r), || axis.to_string())?;
        }
    }
    for (pos, key) in left.layer_keys().iter().enumerate() {
        let right_layer = right
            .layer(&key)
            .ok_or_else(|| Error::assertion(format!("non-matching layer {key}")))?;
        in_context(
            assert_layer(left.layer_at(pos), right_layer, check_less_precise),
            || format!("layer {key}"),
        )?;
    }
    for key in right.layer_keys().iter() {
        ensure!(left.layer(&key).is_some(), "layer {key} missing from left");
    }
    Ok(())
}

/// Compares panels item by item; table names are not compared.
pub fn assert_panel_equal(left: &Panel, right: &Panel, check_less_precise: bool) -> Result<()> {
    assert_panelnd_equal(left, right, check_less_precise, |l, r, less| {
        let options = FrameCompareOptions {
            check_less_precise: less,
            check_names: false,
            ..Default::default()
        };
        assert_frame_equal(l, r, &options)
    })
}

/// Compares 4D panels label by label with [`assert_panel_equal`].
pub fn assert_panel4d_equal(
    left: &Panel4D,
    right: &Panel4D,
    check_less_precise: bool,
) -> Result<()> {
    assert_panelnd_equal(left, right, check_less_precise, assert_panel_equal)
}

/// Asserts that `right` is an equal, independent copy of `left`: the tables
/// compare equal and no column shares a value buffer with its counterpart.
pub fn assert_copy(left: &DataFrame, right: &DataFrame) -> Result<()> {
    assert_frame_equal(left, right, &FrameCompareOptions::default())?;
    for pos in 0..left.ncols() {
        let lbuffers = left.column_array(pos).to_data();
        let rbuffers = right.column_array(pos).to_data();
        for lbuf in lbuffers.buffers() {
            let shared = rbuffers
                .buffers()
                .iter()
                .any(|rbuf| !lbuf.is_empty() && lbuf.as_ptr() == rbuf.as_ptr());
            ensure!(
                !shared,
                "column {} shares storage with the original",
                left.columns().label(pos)
            );
        }
    }
    Ok(())
}

fn assert_axis_equal(left: &Index, right: &Index, check_less_precise: bool) -> Result<()> {
    if check_less_precise {
        assert_almost_equal(&Datum::from(left), &Datum::from(right), true)
    } else {
        assert_index_equal(left, right)
    }
}

fn assert_index_type_equal(left: &Index, right: &Index) -> Result<()> {
    assert_attr_equal("nlevels", left, right)?;
    assert_attr_equal("dtype", left, right)?;
    assert_attr_equal("inferred_type", left, right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{collections::BTreeMap, sync::Arc};

    use arrow_array::{ArrayRef, Float64Array, Int64Array};
    use arrow_schema::DataType;
    use tabula_frame::{Label, Value};

    fn float_series(values: &[f64], index: Index) -> Series {
        let values = values.iter().copied().map(Value::from).collect::<Vec<_>>();
        Series::from_values(&values, index, None).unwrap()
    }

    fn frame(columns: &[(&str, Vec<Value>)], index: Index) -> DataFrame {
        let map = columns
            .iter()
            .map(|(name, values)| {
                (
                    Label::from(*name),
                    Series::from_values(values, index.clone(), None).unwrap(),
                )
            })
            .collect::<BTreeMap<_, _>>();
        DataFrame::from_series(map).unwrap()
    }

    #[test]
    fn test_index_equal() {
        let a = Index::from_strs(&["a", "b"]);
        let mut b = a.clone();
        b.set_names(vec![Some("n".into())]).unwrap();
        assert!(assert_index_equal(&a, &b).is_ok());
        assert!(assert_index_equal(&a, &Index::from_strs(&["b", "a"])).is_err());
        assert!(assert_attr_equal("names", &a, &b).is_err());
        assert!(assert_attr_equal("dtype", &a, &b).is_ok());
        assert!(assert_attr_equal("bogus", &a, &b).is_err());
    }

    #[test]
    fn test_series_equal() {
        let index = Index::from_strs(&["a", "b", "c"]);
        let s1 = float_series(&[1.0, 2.0, f64::NAN], index.clone());
        let s2 = float_series(&[1.0, 2.0000001, f64::NAN], index.clone());
        let options = SeriesCompareOptions::default();
        assert!(assert_series_equal(&s1, &s2, &options).is_ok());

        let s3 = float_series(&[1.0, 2.1, f64::NAN], index.clone());
        assert!(assert_series_equal(&s1, &s3, &options).is_err());

        let s4 = float_series(&[1.0, 2.0, f64::NAN], Index::from_strs(&["a", "b", "d"]));
        assert!(assert_series_equal(&s1, &s4, &options).is_err());
    }

    #[test]
    fn test_series_dtype_check() {
        let index = Index::range(2);
        let ints =
            Series::from_values(&[Value::Int(1), Value::Int(2)], index.clone(), None).unwrap();
        let floats = float_series(&[1.0, 2.0], index);
        assert!(assert_series_equal(&ints, &floats, &SeriesCompareOptions::default()).is_err());
        let lenient = SeriesCompareOptions {
            check_dtype: false,
            ..Default::default()
        };
        assert!(assert_series_equal(&ints, &floats, &lenient).is_ok());
    }

    #[test]
    fn test_series_index_type_check() {
        let ints = float_series(&[1.0, 2.0], Index::range(2));
        let floats = float_series(
            &[1.0, 2.0],
            Index::new(vec![Label::from(0.0), Label::from(1.0)], None),
        );
        // labels compare unequal as values of different kinds
        assert!(assert_series_equal(&ints, &floats, &SeriesCompareOptions::default()).is_err());

        let less = SeriesCompareOptions {
            check_less_precise: true,
            ..Default::default()
        };
        assert!(assert_series_equal(&ints, &floats, &less).is_ok());
        let typed = SeriesCompareOptions {
            check_index_type: true,
            ..less
        };
        assert!(assert_series_equal(&ints, &floats, &typed).is_err());
    }

    #[test]
    fn test_frame_equal() {
        let index = Index::from_strs(&["r0", "r1"]);
        let left = frame(
            &[
                ("A", vec![Value::from(1.0), Value::from(2.0)]),
                ("B", vec![Value::from("x"), Value::from("y")]),
            ],
            index.clone(),
        );
        let right = left.clone();
        let options = FrameCompareOptions::default();
        assert!(assert_frame_equal(&left, &right, &options).is_ok());

        let mut changed = left.clone();
        changed.set_value(1, 1, Value::from("z")).unwrap();
        let err = assert_frame_equal(&left, &changed, &options).unwrap_err();
        assert!(err.to_string().starts_with("column B"), "{err}");

        let fewer = frame(&[("A", vec![Value::from(1.0), Value::from(2.0)])], index);
        assert!(assert_frame_equal(&left, &fewer, &options).is_err());
    }

    #[test]
    fn test_frame_names() {
        let left = frame(&[("A", vec![Value::from(1.0)])], Index::from_strs(&["r"]));
        let mut right = left.clone();
        let mut named = right.index().clone();
        named.set_names(vec![Some("rows".into())]).unwrap();
        right = DataFrame::new(
            named,
            right.columns().clone(),
            vec![right.column_array(0).clone()],
        )
        .unwrap();
        assert!(assert_frame_equal(&left, &right, &FrameCompareOptions::default()).is_err());
        let unnamed = FrameCompareOptions {
            check_names: false,
            ..Default::default()
        };
        assert!(assert_frame_equal(&left, &right, &unnamed).is_ok());
    }

    #[test]
    fn test_frame_by_blocks() {
        let index = Index::range(2);
        let left = frame(
            &[
                ("A", vec![Value::from(1.0), Value::from(2.0)]),
                ("B", vec![Value::Int(1), Value::Int(2)]),
            ],
            index.clone(),
        );
        let options = FrameCompareOptions {
            by_blocks: true,
            ..Default::default()
        };
        assert!(assert_frame_equal(&left, &left.clone(), &options).is_ok());

        let other = frame(
            &[
                ("A", vec![Value::from(1.0), Value::from(2.0)]),
                ("B", vec![Value::from(1.0), Value::from(2.0)]),
            ],
            index,
        );
        let err = assert_frame_equal(&left, &other, &options).unwrap_err();
        assert!(err.to_string().contains("missing"), "{err}");
    }

    #[test]
    fn test_frame_by_blocks_without_columns() {
        let left = DataFrame::new(Index::from_strs(&["a", "b"]), Index::range(0), vec![]).unwrap();
        let right =
            DataFrame::new(Index::from_strs(&["x", "y", "z"]), Index::range(0), vec![]).unwrap();
        for by_blocks in [false, true] {
            let options = FrameCompareOptions {
                by_blocks,
                ..Default::default()
            };
            let err = assert_frame_equal(&left, &right, &options).unwrap_err();
            assert!(err.to_string().starts_with("index"), "{err}");
        }
    }

    #[test]
    fn test_frame_by_blocks_column_order() {
        let floats: ArrayRef = Arc::new(Float64Array::from(vec![1.0, 2.0]));
        let ints: ArrayRef = Arc::new(Int64Array::from(vec![1, 2]));
        let left = DataFrame::new(
            Index::range(2),
            Index::from_strs(&["A", "B"]),
            vec![floats.clone(), ints.clone()],
        )
        .unwrap();
        let right = DataFrame::new(
            Index::range(2),
            Index::from_strs(&["B", "A"]),
            vec![ints, floats],
        )
        .unwrap();
        let options = FrameCompareOptions {
            by_blocks: true,
            ..Default::default()
        };
        let err = assert_frame_equal(&left, &right, &options).unwrap_err();
        assert!(err.to_string().starts_with("columns"), "{err}");
    }

    #[test]
    fn test_frame_by_blocks_names() {
        let left = frame(&[("A", vec![Value::from(1.0)])], Index::from_strs(&["r"]));
        let mut named = left.index().clone();
        named.set_names(vec![Some("rows".into())]).unwrap();
        let right = DataFrame::new(
            named,
            left.columns().clone(),
            vec![left.column_array(0).clone()],
        )
        .unwrap();
        let options = FrameCompareOptions {
            by_blocks: true,
            ..Default::default()
        };
        assert!(assert_frame_equal(&left, &right, &options).is_err());
    }

    #[test]
    fn test_copy() {
        let left = frame(&[("A", vec![Value::from(1.0), Value::from(2.0)])], Index::range(2));
        assert!(assert_copy(&left, &left.clone()).is_err());

        let copied: ArrayRef = Arc::new(Float64Array::from(vec![1.0, 2.0]));
        let deep =
            DataFrame::new(left.index().clone(), left.columns().clone(), vec![copied]).unwrap();
        assert!(assert_copy(&left, &deep).is_ok());
        assert_eq!(deep.dtypes(), vec![DataType::Float64]);
    }

    fn panel(values: [f64; 2]) -> Panel {
        let index = Index::range(1);
        let mut frames = BTreeMap::new();
        for (i, v) in values.into_iter().enumerate() {
            frames.insert(
                Label::from(format!("Item{i}")),
                frame(&[("A", vec![Value::from(v)])], index.clone()),
            );
        }
        Panel::from_frames(frames).unwrap()
    }

    #[test]
    fn test_panel_equal() {
        let a = panel([1.0, 2.0]);
        assert!(assert_panel_equal(&a, &panel([1.0, 2.0]), false).is_ok());
        let err = assert_panel_equal(&a, &panel([1.0, 2.5]), false).unwrap_err();
        assert!(err.to_string().contains("Item1"), "{err}");
    }

    #[test]
    fn test_panel4d_equal() {
        let make = |v: f64| {
            let mut panels = BTreeMap::new();
            panels.insert(Label::from("l1"), panel([1.0, v]));
            Panel4D::from_panels(panels).unwrap()
        };
        assert!(assert_panel4d_equal(&make(2.0), &make(2.0), false).is_ok());
        assert!(assert_panel4d_equal(&make(2.0), &make(3.0), false).is_err());
    }

    #[test]
    fn test_panelnd_extra_layer() {
        let a = panel([1.0, 2.0]);
        let mut frames = BTreeMap::new();
        frames.insert(Label::from("Item0"), a.frames()[0].clone());
        let b = Panel::from_frames(frames).unwrap();
        // items differ, so the shared-axis check fails first
        let err = assert_panelnd_equal(&b, &a, false, |_, _, _| Ok(())).unwrap_err();
        assert!(err.to_string().starts_with("items"), "{err}");
    }
}

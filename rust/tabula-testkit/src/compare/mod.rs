//! Structural comparison with numeric tolerance.
//!
//! Every assertion returns `Ok(())` on success and an
//! [`ErrorKind::AssertionFailed`](tabula_common::error::ErrorKind) error
//! describing the first mismatch otherwise. Malformed inputs (e.g. an
//! unreadable Arrow array) surface as their own error kinds.
//!
//! Generic values are compared through [`Datum`], a tree of mappings,
//! sequences, text and scalars; containers have dedicated assertions in
//! [`containers`].

use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet},
    fmt::{self, Debug},
    hash::{BuildHasher, Hash},
};

use arrow_array::Array;
use itertools::Itertools;
use tabula_common::{Result, ensure, error::Error};
use tabula_frame::{Index, Label, Series, Value};

pub mod containers;

pub use containers::{
    FrameCompareOptions, SeriesCompareOptions, assert_attr_equal, assert_copy,
    assert_frame_equal, assert_index_equal, assert_panel_equal, assert_panel4d_equal,
    assert_panelnd_equal, assert_series_equal,
};

/// Significant decimals checked by default.
const DECIMAL: i32 = 5;

/// Significant decimals checked for narrow floats under `check_less_precise`.
const DECIMAL_LESS_PRECISE: i32 = 3;

/// Values below this magnitude are compared by absolute difference.
const NEAR_ZERO: f64 = 1e-5;

/// A comparable value tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Datum {
    Map(BTreeMap<Label, Datum>),
    Text(String),
    Seq(Vec<Datum>),
    Scalar(Value),
}

impl Datum {
    /// Sequence of the values of an Arrow array.
    pub fn from_array(array: &dyn Array) -> Result<Datum> {
        Ok(Datum::Seq(
            Value::vec_from_array(array)?
                .into_iter()
                .map(Datum::from)
                .collect(),
        ))
    }

    /// Sequence of the values of a series; the index is not included.
    pub fn from_series(series: &Series) -> Result<Datum> {
        Datum::from_array(series.values().as_ref())
    }

    pub fn seq<T: Into<Datum>>(items: impl IntoIterator<Item = T>) -> Datum {
        Datum::Seq(items.into_iter().map(Into::into).collect())
    }

    fn as_text(&self) -> Option<&str> {
        match self {
            Datum::Text(s) => Some(s),
            Datum::Scalar(Value::Str(s)) => Some(s),
            _ => None,
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Datum::Map(_) => "mapping",
            Datum::Text(_) => "text",
            Datum::Seq(_) => "sequence",
            Datum::Scalar(v) => v.kind_name(),
        }
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Map(map) => write!(
                f,
                "{{{}}}",
                map.iter().map(|(k, v)| format!("{k}: {v}")).join(", ")
            ),
            Datum::Text(s) => write!(f, "{s:?}"),
            Datum::Seq(items) => write!(f, "[{}]", items.iter().join(", ")),
            Datum::Scalar(v) => write!(f, "{v}"),
        }
    }
}

impl From<Value> for Datum {
    fn from(value: Value) -> Self {
        match value {
            Value::Str(s) => Datum::Text(s),
            other => Datum::Scalar(other),
        }
    }
}

impl From<&Value> for Datum {
    fn from(value: &Value) -> Self {
        Datum::from(value.clone())
    }
}

impl From<&Label> for Datum {
    fn from(label: &Label) -> Self {
        match label {
            Label::Str(s) => Datum::Text(s.clone()),
            Label::Tuple(parts) => Datum::Seq(parts.iter().map(Datum::from).collect()),
            Label::Int(v) => Datum::Scalar(Value::Int(*v)),
            Label::Float(v) => Datum::Scalar(Value::Float64(v.0)),
            Label::Timestamp(ts) => Datum::Scalar(Value::Timestamp(*ts)),
            Label::Period(p) => Datum::Scalar(Value::Period(*p)),
        }
    }
}

impl From<Label> for Datum {
    fn from(label: Label) -> Self {
        Datum::from(&label)
    }
}

impl From<&Index> for Datum {
    fn from(index: &Index) -> Self {
        Datum::Seq(index.iter().map(Datum::from).collect())
    }
}

impl From<&str> for Datum {
    fn from(s: &str) -> Self {
        Datum::Text(s.to_string())
    }
}

impl From<String> for Datum {
    fn from(s: String) -> Self {
        Datum::Text(s)
    }
}

impl From<f64> for Datum {
    fn from(v: f64) -> Self {
        Datum::Scalar(Value::Float64(v))
    }
}

impl From<f32> for Datum {
    fn from(v: f32) -> Self {
        Datum::Scalar(Value::Float32(v))
    }
}

impl From<i64> for Datum {
    fn from(v: i64) -> Self {
        Datum::Scalar(Value::Int(v))
    }
}

impl From<bool> for Datum {
    fn from(v: bool) -> Self {
        Datum::Scalar(Value::Bool(v))
    }
}

impl<T: Into<Datum>> From<Vec<T>> for Datum {
    fn from(items: Vec<T>) -> Self {
        Datum::seq(items)
    }
}

impl<T: Into<Datum>> From<BTreeMap<Label, T>> for Datum {
    fn from(map: BTreeMap<Label, T>) -> Self {
        Datum::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

/// Compares two value trees.
///
/// Rules, in order:
/// 1. a mapping on either side: both must be mappings with the same keys,
///    values compared per key;
/// 2. text on either side: exact equality;
/// 3. a sequence on either side: both must be sequences of equal length,
///    compared element-wise;
/// 4. a missing value (null or NaN) on either side: both must be missing;
/// 5. numeric `expected`: `actual` must be numeric and agree to 5 decimals
///    (3 when `check_less_precise` is set and both sides are narrow floats),
///    relative to `expected` unless it is near zero; an infinite `expected`
///    requires an identical `actual`;
/// 6. anything else: exact equality.
pub fn assert_almost_equal(
    expected: &Datum,
    actual: &Datum,
    check_less_precise: bool,
) -> Result<()> {
    match (expected, actual) {
        (Datum::Map(a), Datum::Map(b)) => assert_dict_equal(a, b, true, check_less_precise),
        (Datum::Map(_), other) | (other, Datum::Map(_)) => Err(Error::assertion(format!(
            "cannot compare a mapping with {} {other}",
            other.kind_name()
        ))),
        _ if expected.as_text().is_some() || actual.as_text().is_some() => {
            ensure!(
                expected.as_text() == actual.as_text(),
                "{expected} != {actual}"
            );
            Ok(())
        }
        (Datum::Seq(a), Datum::Seq(b)) => {
            ensure!(
                a.len() == b.len(),
                "length {} != {}: {expected} vs {actual}",
                a.len(),
                b.len()
            );
            if a == b {
                return Ok(());
            }
            for (pos, (x, y)) in a.iter().zip(b).enumerate() {
                in_context(assert_almost_equal(x, y, check_less_precise), || {
                    format!("at position {pos}")
                })?;
            }
            Ok(())
        }
        (Datum::Seq(_), other) | (other, Datum::Seq(_)) => Err(Error::assertion(format!(
            "{other} is not a sequence ({})",
            other.kind_name()
        ))),
        (Datum::Scalar(a), Datum::Scalar(b)) => {
            assert_scalar_almost_equal(a, b, check_less_precise)
        }
        _ => {
            ensure!(expected == actual, "{expected} != {actual}");
            Ok(())
        }
    }
}

fn assert_scalar_almost_equal(
    expected: &Value,
    actual: &Value,
    check_less_precise: bool,
) -> Result<()> {
    if expected.is_null() || actual.is_null() {
        ensure!(
            expected.is_null() && actual.is_null(),
            "expected {expected} but got {actual}"
        );
        return Ok(());
    }
    let Some(e) = expected.as_f64() else {
        ensure!(expected == actual, "{expected} != {actual}");
        return Ok(());
    };
    let x = actual.as_f64().ok_or_else(|| {
        Error::assertion(format!(
            "expected numeric {expected} but got {} {actual}",
            actual.kind_name()
        ))
    })?;

    let decimal = if check_less_precise && expected.is_narrow_float() && actual.is_narrow_float() {
        DECIMAL_LESS_PRECISE
    } else {
        DECIMAL
    };
    let tolerance = 1.5 * 10f64.powi(-decimal);

    if e.is_infinite() {
        ensure!(x == e, "expected {expected} but got {actual}");
    } else if e.abs() < NEAR_ZERO {
        ensure!(
            (x - e).abs() < tolerance,
            "expected {expected} but got {actual} (decimal {decimal})"
        );
    } else {
        ensure!(
            (1.0 - x / e).abs() < tolerance,
            "expected {expected} but got {actual} (decimal {decimal})"
        );
    }
    Ok(())
}

/// Compares two mappings key by key.
///
/// With `compare_keys` the key sets must be equal; otherwise only the keys of
/// `a` are checked, and each must also be present in `b`.
pub fn assert_dict_equal(
    a: &BTreeMap<Label, Datum>,
    b: &BTreeMap<Label, Datum>,
    compare_keys: bool,
    check_less_precise: bool,
) -> Result<()> {
    if compare_keys {
        ensure!(
            a.keys().eq(b.keys()),
            "key sets differ: [{}] vs [{}]",
            a.keys().join(", "),
            b.keys().join(", ")
        );
    }
    for (key, left) in a {
        let right = b
            .get(key)
            .ok_or_else(|| Error::assertion(format!("key {key} missing from right")))?;
        in_context(assert_almost_equal(left, right, check_less_precise), || {
            format!("at key {key}")
        })?;
    }
    Ok(())
}

/// Exact equality. `msg` may reference the operands as `{0}` and `{1}`.
pub fn assert_equal<T: PartialEq + Debug + ?Sized>(a: &T, b: &T, msg: &str) -> Result<()> {
    if a == b {
        return Ok(());
    }
    let (a, b) = (format!("{a:?}"), format!("{b:?}"));
    let msg = msg.replace("{0}", &a).replace("{1}", &b);
    Err(Error::assertion(format!("{msg}: {a} != {b}")))
}

/// Returns `true` when both sides hold the same distinct elements, ignoring
/// order and multiplicity.
pub fn equal_contents<T: Eq + Hash>(
    a: impl IntoIterator<Item = T>,
    b: impl IntoIterator<Item = T>,
) -> bool {
    a.into_iter().collect::<HashSet<_>>() == b.into_iter().collect::<HashSet<_>>()
}

/// Asserts that `items` is in non-decreasing order.
pub fn assert_sorted<T: PartialOrd + Debug>(items: &[T]) -> Result<()> {
    match items.windows(2).position(|w| !(w[0] <= w[1])) {
        None => Ok(()),
        Some(pos) => Err(Error::assertion(format!(
            "not sorted at position {}: {:?} > {:?}",
            pos + 1,
            items[pos],
            items[pos + 1]
        ))),
    }
}

/// Membership test used by [`assert_contains_all`].
pub trait Contains<T: ?Sized> {
    fn contains_item(&self, item: &T) -> bool;
}

impl<K: Ord, V> Contains<K> for BTreeMap<K, V> {
    fn contains_item(&self, item: &K) -> bool {
        self.contains_key(item)
    }
}

impl<K: Eq + Hash, V, S: BuildHasher> Contains<K> for HashMap<K, V, S> {
    fn contains_item(&self, item: &K) -> bool {
        self.contains_key(item)
    }
}

impl<T: Ord> Contains<T> for BTreeSet<T> {
    fn contains_item(&self, item: &T) -> bool {
        self.contains(item)
    }
}

impl<T: Eq + Hash, S: BuildHasher> Contains<T> for HashSet<T, S> {
    fn contains_item(&self, item: &T) -> bool {
        self.contains(item)
    }
}

impl<T: PartialEq> Contains<T> for [T] {
    fn contains_item(&self, item: &T) -> bool {
        self.contains(item)
    }
}

impl<T: PartialEq> Contains<T> for Vec<T> {
    fn contains_item(&self, item: &T) -> bool {
        self.as_slice().contains(item)
    }
}

impl Contains<Label> for Index {
    fn contains_item(&self, item: &Label) -> bool {
        self.contains(item)
    }
}

/// Asserts that every element of `items` is in `container`.
pub fn assert_contains_all<'a, T, C>(
    items: impl IntoIterator<Item = &'a T>,
    container: &C,
) -> Result<()>
where
    T: Debug + 'a,
    C: Contains<T> + ?Sized,
{
    for item in items {
        ensure!(container.contains_item(item), "{item:?} is not in the container");
    }
    Ok(())
}

/// Prefixes the message of a failed comparison with `context`.
pub(crate) fn in_context<T>(result: Result<T>, context: impl FnOnce() -> String) -> Result<T> {
    result.map_err(|e| {
        if e.is_assertion() {
            Error::assertion(format!("{}: {e}", context()))
        } else {
            e
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use half::f16;

    fn almost(a: impl Into<Datum>, b: impl Into<Datum>) -> Result<()> {
        assert_almost_equal(&a.into(), &b.into(), false)
    }

    #[test]
    fn test_numeric_tolerance() {
        assert!(almost(1.000001, 1.0000015).is_ok());
        assert!(almost(1.0, 1.1).is_err());
        assert!(almost(1e-7, 2e-7).is_ok());
        assert!(almost(0.0, 1e-4).is_err());
        assert!(almost(100_000.0, 100_000.1).is_ok());
        assert!(almost(3_i64, 3.0).is_ok());
        assert!(almost(true, 1_i64).is_ok());
    }

    #[test]
    fn test_infinity() {
        assert!(almost(f64::INFINITY, f64::INFINITY).is_ok());
        assert!(almost(f64::INFINITY, f64::NEG_INFINITY).is_err());
        assert!(almost(f64::INFINITY, 1e300).is_err());
        assert!(almost(1.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_missing_values() {
        assert!(almost(f64::NAN, f64::NAN).is_ok());
        assert!(almost(Value::Null, f64::NAN).is_ok());
        assert!(almost(f64::NAN, 1.0).is_err());
        assert!(almost(1.0, Value::Null).is_err());
    }

    #[test]
    fn test_less_precise() {
        let a = Datum::Scalar(Value::Float32(1.0001));
        let b = Datum::Scalar(Value::Float32(1.0006));
        assert!(assert_almost_equal(&a, &b, false).is_err());
        assert!(assert_almost_equal(&a, &b, true).is_ok());

        // only narrow floats relax the tolerance
        let c = Datum::from(1.0001_f64);
        let d = Datum::from(1.0006_f64);
        assert!(assert_almost_equal(&c, &d, true).is_err());

        let h1 = Datum::Scalar(Value::Float16(f16::from_f32(2.0)));
        let h2 = Datum::Scalar(Value::Float16(f16::from_f32(2.0)));
        assert!(assert_almost_equal(&h1, &h2, true).is_ok());
    }

    #[test]
    fn test_text() {
        assert!(almost("abc", "abc").is_ok());
        assert!(almost("abc", "abd").is_err());
        assert!(almost("1", 1_i64).is_err());
        assert!(almost(Value::from("x"), "x").is_ok());
    }

    #[test]
    fn test_sequences() {
        assert!(almost(vec![1.0, 2.0], vec![1.0, 2.000001]).is_ok());
        assert!(almost(vec![1.0, 2.0], vec![1.0]).is_err());
        assert!(almost(vec![1.0], 1.0).is_err());
        let err = almost(vec![1.0, 2.0], vec![1.0, 3.0]).unwrap_err();
        assert!(err.to_string().starts_with("at position 1"), "{err}");
        let nested = Datum::seq(vec![Datum::seq(vec![1.0]), Datum::from("a")]);
        assert!(assert_almost_equal(&nested, &nested.clone(), false).is_ok());
    }

    #[test]
    fn test_mappings() {
        let mut a = BTreeMap::new();
        a.insert(Label::from("x"), 1.0);
        a.insert(Label::from("y"), 2.0);
        let mut b = a.clone();
        assert!(almost(a.clone(), b.clone()).is_ok());
        b.insert(Label::from("z"), 3.0);
        assert!(almost(a.clone(), b.clone()).is_err());
        assert!(almost(a.clone(), 1.0).is_err());

        let a = Datum::from(a);
        let b = Datum::from(b);
        let (Datum::Map(a), Datum::Map(b)) = (a, b) else {
            unreachable!()
        };
        assert!(assert_dict_equal(&a, &b, false, false).is_ok());
        assert!(assert_dict_equal(&b, &a, false, false).is_err());
    }

    #[test]
    fn test_exact_fallback() {
        let p = tabula_frame::Period::new(tabula_frame::Frequency::BusinessDay, 3);
        let q = p.shift(1);
        assert!(almost(Value::Period(p), Value::Period(p)).is_ok());
        assert!(almost(Value::Period(p), Value::Period(q)).is_err());
        assert!(almost(Value::Period(p), 1.0).is_err());
        assert!(almost(1.0, Value::Period(p)).is_err());
    }

    #[test]
    fn test_assert_equal_message() {
        assert!(assert_equal(&1, &1, "").is_ok());
        let err = assert_equal(&"a", &"b", "left {0} vs {1}").unwrap_err();
        assert_eq!(err.to_string(), "left \"a\" vs \"b\": \"a\" != \"b\"");
    }

    #[test]
    fn test_helpers() {
        assert!(equal_contents(vec![1, 2, 2, 3], vec![3, 2, 1]));
        assert!(!equal_contents(vec![1, 2], vec![1]));

        assert!(assert_sorted(&[1, 2, 2, 5]).is_ok());
        assert!(assert_sorted::<i32>(&[]).is_ok());
        assert!(assert_sorted(&[1.0, 0.5]).is_err());

        let mut map = HashMap::new();
        map.insert("a", 1);
        map.insert("b", 2);
        assert!(assert_contains_all(&["a", "b"], &map).is_ok());
        assert!(assert_contains_all(&["a", "c"], &map).is_err());

        let index = Index::from_strs(&["x", "y"]);
        assert!(assert_contains_all(&[Label::from("y")], &index).is_ok());
        assert!(assert_contains_all(&[3, 1], &vec![1, 2, 3]).is_ok());
    }
}

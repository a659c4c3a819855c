//! Data generation utilities for testing.
//!
//! Random primitives (strings, booleans, normal samples), single-domain index
//! makers and a set of canned fixtures: series, tables and panels of a fixed
//! default size.
//!
//! All randomness is drawn from the thread-local [`fastrand`] generator, so a
//! test that needs reproducible data calls [`fastrand::seed`] first.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use tabula_common::Result;
use tabula_frame::{
    DataFrame, Frequency, Index, Label, Panel, Panel4D, Series, Value, bdate_range, period_range,
};

/// Default number of rows of the canned fixtures.
pub const N: usize = 30;

/// Default number of columns of the canned fixtures.
pub const K: usize = 4;

const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// First code point of the non-ASCII alphabet used by [`randu`].
const UNICODE_FIRST: u32 = 0x05D0;
const UNICODE_COUNT: u32 = 26;

/// Random ASCII alphanumeric string of length `len`.
pub fn rands(len: usize) -> String {
    (0..len)
        .map(|_| ALPHANUMERIC[fastrand::usize(..ALPHANUMERIC.len())] as char)
        .collect()
}

/// Random string of length `len` drawn from a non-ASCII alphabet plus digits.
pub fn randu(len: usize) -> String {
    let alphabet = (UNICODE_FIRST..UNICODE_FIRST + UNICODE_COUNT)
        .filter_map(char::from_u32)
        .chain('0'..='9')
        .collect::<Vec<_>>();
    (0..len)
        .map(|_| alphabet[fastrand::usize(..alphabet.len())])
        .collect()
}

/// `size` booleans, each `true` with probability `p`.
pub fn randbool(size: usize, p: f64) -> Vec<bool> {
    (0..size).map(|_| fastrand::f64() <= p).collect()
}

/// `size` elements drawn uniformly, with replacement, from `items`.
///
/// Returns an empty vector when `items` is empty.
pub fn choice<T: Clone>(items: &[T], size: usize) -> Vec<T> {
    if items.is_empty() {
        return Vec::new();
    }
    (0..size)
        .map(|_| items[fastrand::usize(..items.len())].clone())
        .collect()
}

/// `size` samples of the standard normal distribution.
pub fn randn(size: usize) -> Vec<f64> {
    (0..size).map(|_| standard_normal()).collect()
}

/// Box-Muller transform over two uniform samples.
fn standard_normal() -> f64 {
    let u1 = 1.0 - fastrand::f64();
    let u2 = fastrand::f64();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Column names `A`, `B`, ... for the first `k` columns.
pub fn column_names(k: usize) -> Vec<String> {
    ('A'..='Z').take(k).map(String::from).collect()
}

fn start_of_2000() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).expect("valid date")
}

fn as_labels<T: Into<Label>>(values: Vec<T>) -> Vec<Label> {
    values.into_iter().map(Into::into).collect()
}

fn as_values<T: Into<Value>>(values: Vec<T>) -> Vec<Value> {
    values.into_iter().map(Into::into).collect()
}

/// `k` random ASCII string labels of length 10.
pub fn make_string_index(k: usize) -> Index {
    Index::new((0..k).map(|_| Label::from(rands(10))).collect(), None)
}

/// `k` random non-ASCII string labels of length 10.
pub fn make_unicode_index(k: usize) -> Index {
    Index::new((0..k).map(|_| Label::from(randu(10))).collect(), None)
}

/// Integer labels `0..k`.
pub fn make_int_index(k: usize) -> Index {
    Index::range(k)
}

/// `k` sorted random floats, shifted by a random offset and scaled by a
/// random power of ten.
pub fn make_float_index(k: usize) -> Index {
    let mut values = (0..k).map(|_| fastrand::f64()).collect::<Vec<_>>();
    values.sort_by(f64::total_cmp);
    let offset = fastrand::f64();
    let scale = 10f64.powi(fastrand::i32(0..=9));
    Index::new(
        values
            .into_iter()
            .map(|v| Label::from((v - offset) * scale))
            .collect(),
        None,
    )
}

/// `k` consecutive business-day timestamps starting 2000-01-03.
pub fn make_date_index(k: usize) -> Index {
    let start = start_of_2000().and_time(chrono::NaiveTime::MIN);
    Index::new(as_labels(bdate_range(start, k)), None)
}

/// `k` consecutive business-day periods starting 2000-01-03.
pub fn make_period_index(k: usize) -> Index {
    Index::new(
        as_labels(period_range(start_of_2000(), k, Frequency::BusinessDay)),
        None,
    )
}

/// `N` normal samples over a random string index.
pub fn make_float_series() -> Result<Series> {
    Series::from_values(&as_values(randn(N)), make_string_index(N), None)
}

/// `N` normal samples over a random string index.
pub fn make_string_series() -> Result<Series> {
    make_float_series()
}

/// `N` timestamps as values, over a random string index.
pub fn make_object_series() -> Result<Series> {
    let dates = bdate_range(start_of_2000().and_time(chrono::NaiveTime::MIN), N);
    Series::from_values(&as_values(dates), make_string_index(N), None)
}

/// `K` float series named `A`.. sharing one random string index.
pub fn get_series_data() -> Result<BTreeMap<Label, Series>> {
    let index = make_string_index(N);
    column_names(K)
        .into_iter()
        .map(|c| {
            let series = Series::from_values(&as_values(randn(N)), index.clone(), None)?;
            Ok((Label::from(c), series))
        })
        .collect()
}

/// `N` x `K` table of normal samples with columns `A`.. and a random string
/// row index.
pub fn make_data_frame() -> Result<DataFrame> {
    DataFrame::from_series(get_series_data()?)
}

/// `N` rows of `K` consecutive integers, counting up from zero row by row.
pub fn get_arange_mat() -> Vec<Vec<i64>> {
    (0..N)
        .map(|r| (0..K).map(|c| (r * K + c) as i64).collect())
        .collect()
}

/// Five rows of mixed columns: two float columns `A`/`B`, a string column
/// `C` and a timestamp column `D`, over the row labels `a`..`e`.
pub fn get_mixed_type_dict() -> (Index, BTreeMap<Label, Vec<Value>>) {
    let index = Index::from_strs(&["a", "b", "c", "d", "e"]);
    let d_start = NaiveDate::from_ymd_opt(2009, 1, 1)
        .expect("valid date")
        .and_time(chrono::NaiveTime::MIN);
    let mut data = BTreeMap::new();
    data.insert(Label::from("A"), as_values(vec![0.0, 1.0, 2.0, 3.0, 4.0]));
    data.insert(Label::from("B"), as_values(vec![0.0, 1.0, 0.0, 1.0, 0.0]));
    data.insert(
        Label::from("C"),
        (1..=5).map(|i| Value::from(format!("foo{i}"))).collect(),
    );
    data.insert(Label::from("D"), as_values(bdate_range(d_start, 5)));
    (index, data)
}

/// Table built from [`get_mixed_type_dict`].
pub fn make_mixed_data_frame() -> Result<DataFrame> {
    let (index, data) = get_mixed_type_dict();
    let series = data
        .into_iter()
        .map(|(label, values)| Ok((label, Series::from_values(&values, index.clone(), None)?)))
        .collect::<Result<BTreeMap<_, _>>>()?;
    DataFrame::from_series(series)
}

/// Normal samples over a business-day timestamp index of `nper` entries
/// (default `N`).
pub fn make_time_series(nper: Option<usize>) -> Result<Series> {
    let nper = nper.unwrap_or(N);
    Series::from_values(&as_values(randn(nper)), make_date_index(nper), None)
}

/// Normal samples over a business-day period index of `N` entries.
pub fn make_period_series(nper: Option<usize>) -> Result<Series> {
    let nper = nper.unwrap_or(N);
    Series::from_values(&as_values(randn(nper)), make_period_index(nper), None)
}

/// `K` time series named `A`..
pub fn get_time_series_data(nper: Option<usize>) -> Result<BTreeMap<Label, Series>> {
    column_names(K)
        .into_iter()
        .map(|c| Ok((Label::from(c), make_time_series(nper)?)))
        .collect()
}

/// `K` period series named `A`..
pub fn get_period_data(nper: Option<usize>) -> Result<BTreeMap<Label, Series>> {
    column_names(K)
        .into_iter()
        .map(|c| Ok((Label::from(c), make_period_series(nper)?)))
        .collect()
}

pub fn make_time_data_frame(nper: Option<usize>) -> Result<DataFrame> {
    DataFrame::from_series(get_time_series_data(nper)?)
}

pub fn make_period_frame(nper: Option<usize>) -> Result<DataFrame> {
    DataFrame::from_series(get_period_data(nper)?)
}

/// Panel of three time tables keyed `ItemA`, `ItemB`, `ItemC`.
pub fn make_panel(nper: Option<usize>) -> Result<Panel> {
    let frames = ["ItemA", "ItemB", "ItemC"]
        .into_iter()
        .map(|item| Ok((Label::from(item), make_time_data_frame(nper)?)))
        .collect::<Result<BTreeMap<_, _>>>()?;
    Panel::from_frames(frames)
}

/// Four-dimensional panel of three [`make_panel`] panels keyed `l1`, `l2`,
/// `l3`.
pub fn make_panel4d(nper: Option<usize>) -> Result<Panel4D> {
    let panels = ["l1", "l2", "l3"]
        .into_iter()
        .map(|label| Ok((Label::from(label), make_panel(nper)?)))
        .collect::<Result<BTreeMap<_, _>>>()?;
    Panel4D::from_panels(panels)
}

/// Nulls out a staircase of leading cells: in item `i`, the first `i + j`
/// rows of column `j` become null.
pub fn add_nans(panel: &mut Panel) -> Result<()> {
    for (i, frame) in panel.frames_mut().iter_mut().enumerate() {
        for j in 0..frame.ncols() {
            frame.set_nulls(j, 0..i + j)?;
        }
    }
    Ok(())
}

/// Applies [`add_nans`] to every panel.
pub fn add_nans_panel4d(panel: &mut Panel4D) -> Result<()> {
    for inner in panel.panels_mut() {
        add_nans(inner)?;
    }
    Ok(())
}

/// First business day on or after `date`, as a timestamp.
pub fn first_business_day(date: NaiveDate) -> NaiveDateTime {
    bdate_range(date.and_time(chrono::NaiveTime::MIN), 1)[0]
}

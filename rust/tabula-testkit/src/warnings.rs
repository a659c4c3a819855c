//! Scoped capture of warnings.
//!
//! Library code reports soft problems through [`warn`]. Outside a capture the
//! warning goes to the `log` facade; inside a [`WarningCapture`] scope it is
//! recorded instead, so tests can assert which warnings a block produced.
//! Captures are per thread and nest: the innermost active capture receives the
//! warnings.

use std::{cell::RefCell, fmt, marker::PhantomData};

use itertools::Itertools;
use tabula_common::{Result, ensure};

/// Warning classes. Every category is a kind of [`WarningCategory::Warning`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WarningCategory {
    Warning,
    UserWarning,
    DeprecationWarning,
    FutureWarning,
    RuntimeWarning,
    PerformanceWarning,
}

impl WarningCategory {
    pub fn name(&self) -> &'static str {
        match self {
            WarningCategory::Warning => "Warning",
            WarningCategory::UserWarning => "UserWarning",
            WarningCategory::DeprecationWarning => "DeprecationWarning",
            WarningCategory::FutureWarning => "FutureWarning",
            WarningCategory::RuntimeWarning => "RuntimeWarning",
            WarningCategory::PerformanceWarning => "PerformanceWarning",
        }
    }

    /// Returns `true` if `self` is `base` or a kind of it.
    pub fn is_a(&self, base: WarningCategory) -> bool {
        base == WarningCategory::Warning || *self == base
    }
}

impl fmt::Display for WarningCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Warning {
    pub category: WarningCategory,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category, self.message)
    }
}

/// Which warnings a capture records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterLevel {
    /// Every warning.
    #[default]
    Always,
    /// The first occurrence of each (category, message) pair.
    Once,
    /// None; warnings are swallowed.
    Ignore,
}

struct Sink {
    level: FilterLevel,
    records: Vec<Warning>,
}

impl Sink {
    fn record(&mut self, warning: Warning) {
        match self.level {
            FilterLevel::Always => self.records.push(warning),
            FilterLevel::Once => {
                if !self.records.contains(&warning) {
                    self.records.push(warning);
                }
            }
            FilterLevel::Ignore => {}
        }
    }
}

thread_local! {
    static SINKS: RefCell<Vec<Sink>> = const { RefCell::new(Vec::new()) };
}

/// Emits a warning.
pub fn warn(category: WarningCategory, message: impl Into<String>) {
    let warning = Warning {
        category,
        message: message.into(),
    };
    SINKS.with(|sinks| match sinks.borrow_mut().last_mut() {
        Some(sink) => sink.record(warning),
        None => log::warn!("{warning}"),
    });
}

/// Records the warnings emitted on this thread while alive.
///
/// The capture is released when dropped, including during unwinding, and
/// restores whichever capture was active before it.
pub struct WarningCapture {
    depth: usize,
    active: bool,
    _not_send: PhantomData<*const ()>,
}

impl WarningCapture {
    pub fn start(level: FilterLevel) -> WarningCapture {
        let depth = SINKS.with(|sinks| {
            let mut sinks = sinks.borrow_mut();
            sinks.push(Sink {
                level,
                records: Vec::new(),
            });
            sinks.len()
        });
        WarningCapture {
            depth,
            active: true,
            _not_send: PhantomData,
        }
    }

    /// Warnings recorded so far.
    pub fn records(&self) -> Vec<Warning> {
        SINKS.with(|sinks| {
            sinks
                .borrow()
                .get(self.depth - 1)
                .map(|sink| sink.records.clone())
                .unwrap_or_default()
        })
    }

    /// Ends the capture and returns everything it recorded.
    pub fn finish(mut self) -> Vec<Warning> {
        self.release().unwrap_or_default()
    }

    fn release(&mut self) -> Option<Vec<Warning>> {
        if !self.active {
            return None;
        }
        self.active = false;
        SINKS.with(|sinks| {
            let mut sinks = sinks.borrow_mut();
            if sinks.len() < self.depth {
                return None;
            }
            // captures opened inside this one and leaked are closed with it
            sinks.truncate(self.depth);
            sinks.pop().map(|sink| sink.records)
        })
    }
}

impl Drop for WarningCapture {
    fn drop(&mut self) {
        self.release();
    }
}

/// Runs `f` and asserts the warnings it emits.
///
/// With `Some(expected)`, at least one warning of that category (or a kind of
/// it) must be emitted. With `None`, no warning may be emitted. Warnings of
/// any other category fail the assertion in both cases.
pub fn assert_produces_warning<R>(
    expected: Option<WarningCategory>,
    f: impl FnOnce() -> R,
) -> Result<R> {
    assert_produces_warning_with(expected, FilterLevel::Always, f)
}

/// [`assert_produces_warning`] with an explicit filter level.
pub fn assert_produces_warning_with<R>(
    expected: Option<WarningCategory>,
    level: FilterLevel,
    f: impl FnOnce() -> R,
) -> Result<R> {
    let capture = WarningCapture::start(level);
    let result = f();
    let records = capture.finish();

    let (matching, extra): (Vec<_>, Vec<_>) = records
        .iter()
        .partition(|w| expected.is_some_and(|e| w.category.is_a(e)));
    if let Some(expected) = expected {
        ensure!(
            !matching.is_empty(),
            "did not see expected warning of class {expected}"
        );
    }
    ensure!(
        extra.is_empty(),
        "caused unexpected warning(s): [{}]",
        extra.iter().join(", ")
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_records() {
        let capture = WarningCapture::start(FilterLevel::Always);
        warn(WarningCategory::UserWarning, "first");
        warn(WarningCategory::UserWarning, "first");
        assert_eq!(capture.records().len(), 2);
        let records = capture.finish();
        assert_eq!(records[0].message, "first");
        // no capture active: goes to the log
        warn(WarningCategory::UserWarning, "unseen");
    }

    #[test]
    fn test_filter_levels() {
        let once = WarningCapture::start(FilterLevel::Once);
        warn(WarningCategory::RuntimeWarning, "a");
        warn(WarningCategory::RuntimeWarning, "a");
        warn(WarningCategory::RuntimeWarning, "b");
        assert_eq!(once.finish().len(), 2);

        let ignore = WarningCapture::start(FilterLevel::Ignore);
        warn(WarningCategory::RuntimeWarning, "a");
        assert!(ignore.finish().is_empty());
    }

    #[test]
    fn test_nested_captures() {
        let outer = WarningCapture::start(FilterLevel::Always);
        {
            let inner = WarningCapture::start(FilterLevel::Always);
            warn(WarningCategory::FutureWarning, "inner");
            assert_eq!(inner.records().len(), 1);
        }
        warn(WarningCategory::FutureWarning, "outer");
        let records = outer.finish();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "outer");
    }

    #[test]
    fn test_released_on_panic() {
        let result = std::panic::catch_unwind(|| {
            let _capture = WarningCapture::start(FilterLevel::Always);
            panic!("body failed");
        });
        assert!(result.is_err());
        SINKS.with(|sinks| assert!(sinks.borrow().is_empty()));
    }

    #[test]
    fn test_assert_produces_warning() {
        let value = assert_produces_warning(Some(WarningCategory::FutureWarning), || {
            warn(WarningCategory::FutureWarning, "deprecated");
            7
        })
        .unwrap();
        assert_eq!(value, 7);

        // any category satisfies the base class
        assert!(
            assert_produces_warning(Some(WarningCategory::Warning), || {
                warn(WarningCategory::UserWarning, "x")
            })
            .is_ok()
        );

        assert!(assert_produces_warning(None, || ()).is_ok());
        assert!(
            assert_produces_warning(None, || warn(WarningCategory::UserWarning, "x")).is_err()
        );
        assert!(assert_produces_warning(Some(WarningCategory::UserWarning), || ()).is_err());
        let err = assert_produces_warning(Some(WarningCategory::UserWarning), || {
            warn(WarningCategory::UserWarning, "ok");
            warn(WarningCategory::DeprecationWarning, "stray");
        })
        .unwrap_err();
        assert!(err.to_string().contains("stray"), "{err}");
    }
}

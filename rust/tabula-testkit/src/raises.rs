//! Assertions that an operation fails in an expected way.

use std::{
    any::Any,
    fmt::{Debug, Display},
    panic::{self, UnwindSafe},
};

use regex::Regex;
use tabula_common::{Result, error::Error};

/// Asserts that `result` is an error accepted by `expected`, returning it.
///
/// An `Ok` result, or an error `expected` rejects, fails the assertion.
pub fn assert_raises<T, E>(
    result: std::result::Result<T, E>,
    expected: impl FnOnce(&E) -> bool,
) -> Result<E>
where
    T: Debug,
    E: Display,
{
    match result {
        Ok(value) => Err(Error::assertion(format!(
            "expected an error, got Ok({value:?})"
        ))),
        Err(e) if expected(&e) => Ok(e),
        Err(e) => Err(Error::assertion(format!("unexpected error: {e}"))),
    }
}

/// Asserts that `result` is an error whose message matches `pattern`
/// (searched, not anchored), returning it.
pub fn assert_raises_regex<T, E>(result: std::result::Result<T, E>, pattern: &str) -> Result<E>
where
    T: Debug,
    E: Display,
{
    let regex = compile(pattern)?;
    match result {
        Ok(value) => Err(Error::assertion(format!(
            "expected an error matching {pattern:?}, got Ok({value:?})"
        ))),
        Err(e) => {
            let message = e.to_string();
            if regex.is_match(&message) {
                Ok(e)
            } else {
                Err(Error::assertion(format!(
                    "{pattern:?} does not match {message:?}"
                )))
            }
        }
    }
}

/// Asserts that `f` panics, returning the panic message.
pub fn assert_panics<R>(f: impl FnOnce() -> R + UnwindSafe) -> Result<String> {
    match panic::catch_unwind(f) {
        Ok(_) => Err(Error::assertion("expected a panic")),
        Err(payload) => Ok(panic_message(payload.as_ref())),
    }
}

/// Asserts that `f` panics with a message matching `pattern`.
pub fn assert_panics_regex<R>(f: impl FnOnce() -> R + UnwindSafe, pattern: &str) -> Result<String> {
    let regex = compile(pattern)?;
    let message = assert_panics(f)?;
    if regex.is_match(&message) {
        Ok(message)
    } else {
        Err(Error::assertion(format!(
            "{pattern:?} does not match panic {message:?}"
        )))
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::invalid_arg("pattern", e.to_string()))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}

//! Policies for tests that depend on network access.
//!
//! A network test either passes, fails, or is skipped when the failure is a
//! connectivity problem rather than a defect. Whether connectivity failures
//! are tolerated defaults to the `TABULA_RAISE_NETWORK_ERRORS` environment
//! variable, so CI can make them fatal without code changes.

use std::{
    fmt::Display,
    io,
    net::{SocketAddr, TcpStream},
    time::Duration,
};

use tabula_common::{
    Result,
    error::{Error, ErrorKind},
    verify_arg,
};

/// Environment variable that, when set to `1`/`true`/`yes`, makes network
/// errors fatal by default.
pub const RAISE_NETWORK_ERRORS_ENV: &str = "TABULA_RAISE_NETWORK_ERRORS";

/// Default target of [`ConnectivityCheck::default`].
pub const DEFAULT_CHECK_URL: &str = "http://www.google.com";

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default of `raise_on_error`, read from [`RAISE_NETWORK_ERRORS_ENV`].
pub fn raise_on_error_default() -> bool {
    std::env::var(RAISE_NETWORK_ERRORS_ENV)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Result of running a guarded test body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TestOutcome {
    Passed,
    Skipped(String),
}

impl TestOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, TestOutcome::Skipped(_))
    }
}

/// Classifies errors that stem from missing or flaky connectivity.
pub trait NetworkError {
    fn is_connectivity_error(&self) -> bool;
}

impl NetworkError for io::Error {
    fn is_connectivity_error(&self) -> bool {
        use io::ErrorKind::*;
        matches!(
            self.kind(),
            ConnectionRefused
                | ConnectionReset
                | ConnectionAborted
                | NotConnected
                | AddrNotAvailable
                | BrokenPipe
                | TimedOut
                | HostUnreachable
                | NetworkUnreachable
                | NetworkDown
        )
    }
}

impl NetworkError for Error {
    fn is_connectivity_error(&self) -> bool {
        match self.kind() {
            ErrorKind::Io { source, .. } => source.is_connectivity_error(),
            _ => false,
        }
    }
}

impl NetworkError for anyhow::Error {
    fn is_connectivity_error(&self) -> bool {
        self.chain().any(|cause| {
            cause
                .downcast_ref::<io::Error>()
                .is_some_and(<io::Error as NetworkError>::is_connectivity_error)
        })
    }
}

/// Retry and skip policy of [`run_network_test`].
#[derive(Clone, Debug)]
pub struct NetworkPolicy {
    raise_on_error: bool,
    num_runs: usize,
}

impl Default for NetworkPolicy {
    fn default() -> Self {
        NetworkPolicy {
            raise_on_error: raise_on_error_default(),
            num_runs: 2,
        }
    }
}

impl NetworkPolicy {
    /// Propagate every error instead of skipping on connectivity errors.
    pub fn raise_on_error(mut self, raise: bool) -> Self {
        self.raise_on_error = raise;
        self
    }

    /// Attempts made before a non-connectivity error is propagated; at least
    /// one.
    pub fn num_runs(mut self, num_runs: usize) -> Result<Self> {
        verify_arg!(num_runs, num_runs >= 1);
        self.num_runs = num_runs;
        Ok(self)
    }
}

/// Runs a network-dependent test body under `policy`.
///
/// With `raise_on_error` the body runs once and its result is returned as is.
/// Otherwise a connectivity error skips the test, and any other error is
/// retried until `num_runs` attempts have been made, the last error being
/// returned.
pub fn run_network_test<E, F>(
    policy: &NetworkPolicy,
    mut body: F,
) -> std::result::Result<TestOutcome, E>
where
    E: NetworkError + Display,
    F: FnMut() -> std::result::Result<(), E>,
{
    if policy.raise_on_error {
        return body().map(|()| TestOutcome::Passed);
    }
    let mut attempt = 1;
    loop {
        match body() {
            Ok(()) => return Ok(TestOutcome::Passed),
            Err(e) if e.is_connectivity_error() => {
                log::warn!("skipping network test: {e}");
                return Ok(TestOutcome::Skipped(format!("Skipping test {e}")));
            }
            Err(e) if attempt >= policy.num_runs => return Err(e),
            Err(e) => {
                log::info!("network test failed (attempt {attempt}/{}): {e}", policy.num_runs);
                attempt += 1;
            }
        }
    }
}

/// Returns `true` when a TCP connection to the host of `url` can be opened
/// within `timeout`. Malformed URLs and unresolvable hosts yield `false`.
pub fn can_connect(url: &str, timeout: Duration) -> bool {
    let addrs = match resolve(url) {
        Ok(addrs) => addrs,
        Err(e) => {
            log::debug!("cannot resolve {url}: {e}");
            return false;
        }
    };
    addrs
        .iter()
        .any(|addr| TcpStream::connect_timeout(addr, timeout).is_ok())
}

fn resolve(url: &str) -> anyhow::Result<Vec<SocketAddr>> {
    let url = url::Url::parse(url)?;
    let addrs = url.socket_addrs(|| None)?;
    Ok(addrs)
}

/// Connectivity target and policy of [`with_connectivity_check`].
#[derive(Clone, Debug)]
pub struct ConnectivityCheck {
    pub url: String,
    pub raise_on_error: bool,
    /// Check connectivity before running the body, skipping it when offline.
    pub check_before_test: bool,
    pub timeout: Duration,
}

impl Default for ConnectivityCheck {
    fn default() -> Self {
        ConnectivityCheck {
            url: DEFAULT_CHECK_URL.to_string(),
            raise_on_error: raise_on_error_default(),
            check_before_test: false,
            timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl ConnectivityCheck {
    pub fn new(url: impl Into<String>) -> ConnectivityCheck {
        ConnectivityCheck {
            url: url.into(),
            ..Default::default()
        }
    }

    fn is_online(&self) -> bool {
        can_connect(&self.url, self.timeout)
    }
}

/// Runs a test body, skipping it when a connectivity error coincides with
/// the check URL being unreachable.
///
/// A connectivity error while the check URL is reachable points at the code
/// under test and is returned. Other errors are always returned.
pub fn with_connectivity_check<E, F>(
    check: &ConnectivityCheck,
    body: F,
) -> std::result::Result<TestOutcome, E>
where
    E: NetworkError + Display,
    F: FnOnce() -> std::result::Result<(), E>,
{
    if check.check_before_test && !check.raise_on_error && !check.is_online() {
        log::warn!("skipping test: {} is unreachable", check.url);
        return Ok(TestOutcome::Skipped(format!(
            "Skipping test because {} is unreachable",
            check.url
        )));
    }
    match body() {
        Ok(()) => Ok(TestOutcome::Passed),
        Err(e) if e.is_connectivity_error() && !check.raise_on_error && !check.is_online() => {
            log::warn!("skipping test: {e}");
            Ok(TestOutcome::Skipped(format!(
                "Skipping test due to lack of connectivity and error {e}"
            )))
        }
        Err(e) => Err(e),
    }
}

//! Detection of optional external tools.
//!
//! Tests that exercise an integration with an external program call
//! [`skip_if_no_package`] first, so they are skipped rather than failed on
//! machines where the program is missing or too old.

use std::{cmp::Ordering, fmt, process::Command, sync::LazyLock};

use regex::Regex;

static VERSION_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.[0-9A-Za-z]+)*").expect("valid version regex"));

static VERSION_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+|[A-Za-z]+").expect("valid version part regex"));

/// A version compared component-wise: numeric components numerically,
/// alphabetic components lexically, numbers ordering before words.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LooseVersion {
    text: String,
    parts: Vec<VersionPart>,
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum VersionPart {
    Num(u64),
    Word(String),
}

impl LooseVersion {
    pub fn parse(text: &str) -> LooseVersion {
        let parts = VERSION_PART
            .find_iter(text)
            .map(|m| match m.as_str().parse() {
                Ok(n) => VersionPart::Num(n),
                Err(_) => VersionPart::Word(m.as_str().to_string()),
            })
            .collect();
        LooseVersion {
            text: text.to_string(),
            parts,
        }
    }
}

impl PartialOrd for LooseVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LooseVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parts.cmp(&other.parts)
    }
}

impl fmt::Display for LooseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Runs `program --version` and returns the first version-like token of its
/// output.
pub fn get_version(program: &str) -> anyhow::Result<LooseVersion> {
    let output = Command::new(program).arg("--version").output()?;
    if !output.status.success() {
        anyhow::bail!("{program} --version exited with {}", output.status);
    }
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    let token = VERSION_TOKEN
        .find(&text)
        .ok_or_else(|| anyhow::anyhow!("no version in the output of {program} --version"))?;
    Ok(LooseVersion::parse(token.as_str()))
}

/// Checks that `program` can be run and, if `min_version` is given, that its
/// version is at least `min_version`.
pub fn package_check(program: &str, min_version: Option<&str>) -> anyhow::Result<()> {
    let version = get_version(program)
        .map_err(|e| anyhow::anyhow!("Could not run {program}: {e}"))?;
    if let Some(min_version) = min_version {
        let min = LooseVersion::parse(min_version);
        if version < min {
            anyhow::bail!("{program} {version} is older than the required {min}");
        }
    }
    Ok(())
}

/// Returns the reason to skip a test needing `program`, or `None` when it is
/// available.
pub fn skip_if_no_package(program: &str, min_version: Option<&str>) -> Option<String> {
    match package_check(program, min_version) {
        Ok(()) => None,
        Err(e) => {
            let reason = format!("skipping test: {e}");
            log::warn!("{reason}");
            Some(reason)
        }
    }
}

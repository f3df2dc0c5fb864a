// src/target.rs

//! Coordinates identifying package universes
//!
//! A [`Target`] names one `Packages` index: repository, distribution, suite
//! and architecture. A [`SuiteKey`] is the same coordinate without the
//! architecture; dependency declarations are written against suite keys and
//! the architecture is attached uniformly when a target is checked.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Architecture-independent `(repository, distribution, suite)` triple
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SuiteKey {
    pub repository: String,
    pub distribution: String,
    pub suite: String,
}

impl SuiteKey {
    pub fn new(
        repository: impl Into<String>,
        distribution: impl Into<String>,
        suite: impl Into<String>,
    ) -> Self {
        Self {
            repository: repository.into(),
            distribution: distribution.into(),
            suite: suite.into(),
        }
    }

    /// Attach an architecture, producing a full coordinate
    pub fn with_arch(&self, architecture: &str) -> Target {
        Target {
            repository: self.repository.clone(),
            distribution: self.distribution.clone(),
            suite: self.suite.clone(),
            architecture: architecture.to_string(),
        }
    }

    /// Parse an entry of a dependency list declared under `parent`
    ///
    /// Accepts either a full `repo/dist/suite` triple or the `repo/suite`
    /// shorthand, which inherits the parent's distribution.
    pub fn parse_dependency(s: &str, parent: &SuiteKey) -> Result<Self> {
        let parts = split_identifiers(s)?;
        match parts.as_slice() {
            [repository, suite] => Ok(Self::new(*repository, parent.distribution.as_str(), *suite)),
            [repository, distribution, suite] => Ok(Self::new(*repository, *distribution, *suite)),
            _ => Err(Error::ConfigError(format!(
                "Invalid dependency '{}' (expected repo/suite or repo/distribution/suite)",
                s
            ))),
        }
    }
}

impl FromStr for SuiteKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts = split_identifiers(s)?;
        match parts.as_slice() {
            [repository, distribution, suite] => Ok(Self::new(*repository, *distribution, *suite)),
            _ => Err(Error::ConfigError(format!(
                "Invalid suite '{}' (expected repo/distribution/suite)",
                s
            ))),
        }
    }
}

impl fmt::Display for SuiteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.repository, self.distribution, self.suite)
    }
}

/// One package universe: `(repository, distribution, suite, architecture)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Target {
    pub repository: String,
    pub distribution: String,
    pub suite: String,
    pub architecture: String,
}

impl Target {
    pub fn new(
        repository: impl Into<String>,
        distribution: impl Into<String>,
        suite: impl Into<String>,
        architecture: impl Into<String>,
    ) -> Self {
        Self {
            repository: repository.into(),
            distribution: distribution.into(),
            suite: suite.into(),
            architecture: architecture.into(),
        }
    }

    /// The dependency graph lookup key for this target
    pub fn suite_key(&self) -> SuiteKey {
        SuiteKey::new(
            self.repository.as_str(),
            self.distribution.as_str(),
            self.suite.as_str(),
        )
    }

    /// `repo_dist_suite_arch`, used to name cache and result files
    pub fn file_stem(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.repository, self.distribution, self.suite, self.architecture
        )
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.repository, self.distribution, self.suite, self.architecture
        )
    }
}

/// Check that a name is usable as a path component and file name fragment
///
/// `_` separates the components of [`Target::file_stem`], so it is rejected
/// along with `/` and whitespace to keep file names unambiguous.
pub fn validate_identifier(kind: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::ConfigError(format!("Empty {} name", kind)));
    }
    if value.contains(['/', '_']) || value.chars().any(char::is_whitespace) {
        return Err(Error::ConfigError(format!(
            "Invalid {} name '{}': must not contain '/', '_' or whitespace",
            kind, value
        )));
    }
    Ok(())
}

fn split_identifiers(s: &str) -> Result<Vec<&str>> {
    let parts: Vec<&str> = s.split('/').collect();
    for part in &parts {
        validate_identifier("suite reference component", part)
            .map_err(|e| Error::ConfigError(format!("Invalid suite reference '{}': {}", s, e)))?;
    }
    Ok(parts)
}

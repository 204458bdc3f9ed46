//! Parsed version model
//!
//! A [`Version`] is a numeric core of dot-separated segments (any length, the
//! last one may be the `*` wildcard), an optional pre-release introduced by
//! `-` and optional build metadata introduced by `+`.

use std::cmp::Ordering;
use std::fmt;

/// Unbounded non-negative integer kept as its canonical digit string
///
/// Leading zeros are stripped on construction, so comparing by length first and
/// lexicographically second gives numeric order without any width limit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Numeric(String);

impl Numeric {
    /// Build from a string of ASCII digits. Returns `None` for an empty or non-digit input.
    pub fn from_digits(digits: &str) -> Option<Self> {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let trimmed = digits.trim_start_matches('0');
        let canonical = if trimmed.is_empty() { "0" } else { trimmed };
        Some(Self(canonical.to_string()))
    }

    pub fn zero() -> Self {
        Self("0".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for Numeric {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl Ord for Numeric {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Numeric {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One element of the numeric core
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Number(Numeric),
    /// `*`: matches this position and everything after it
    Wildcard,
}

impl Segment {
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Segment::Wildcard)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Number(n) => n.fmt(f),
            Segment::Wildcard => f.write_str("*"),
        }
    }
}

/// A dot-separated pre-release or build-metadata identifier
///
/// Purely numeric identifiers compare numerically and always sort before
/// alphanumeric ones, which compare in ASCII order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    Numeric(Numeric),
    AlphaNumeric(String),
}

impl Identifier {
    /// Classify an identifier that is already known to match `[0-9A-Za-z-]+`.
    pub(crate) fn classify(text: &str) -> Self {
        match Numeric::from_digits(text) {
            Some(n) => Identifier::Numeric(n),
            None => Identifier::AlphaNumeric(text.to_string()),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Numeric(n) => n.fmt(f),
            Identifier::AlphaNumeric(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PreRelease {
    /// `-*`: matches any concrete pre-release
    Wildcard,
    Identifiers(Vec<Identifier>),
}

impl fmt::Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreRelease::Wildcard => f.write_str("*"),
            PreRelease::Identifiers(ids) => write_dotted(f, ids),
        }
    }
}

/// A parsed version
///
/// Equality derived here is structural. Precedence, including wildcard
/// matching, goes through [`Version::compare`]. There is no `Ord` impl:
/// wildcard matches are not transitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    pub(crate) core: Vec<Segment>,
    pub(crate) pre_release: Option<PreRelease>,
    pub(crate) build: Option<Vec<Identifier>>,
}

impl Version {
    pub fn core(&self) -> &[Segment] {
        &self.core
    }

    pub fn pre_release(&self) -> Option<&PreRelease> {
        self.pre_release.as_ref()
    }

    pub fn build(&self) -> Option<&[Identifier]> {
        self.build.as_deref()
    }

    /// True if the core or the pre-release contains a wildcard
    pub fn has_wildcard(&self) -> bool {
        self.core.iter().any(Segment::is_wildcard)
            || matches!(self.pre_release, Some(PreRelease::Wildcard))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_dotted(f, &self.core)?;
        if let Some(pre) = &self.pre_release {
            write!(f, "-{pre}")?;
        }
        if let Some(build) = &self.build {
            f.write_str("+")?;
            write_dotted(f, build)?;
        }
        Ok(())
    }
}

impl From<&semver::Version> for Version {
    fn from(v: &semver::Version) -> Self {
        let identifiers = |s: &str| s.split('.').map(Identifier::classify).collect::<Vec<_>>();

        Self {
            core: vec![
                Segment::Number(v.major.into()),
                Segment::Number(v.minor.into()),
                Segment::Number(v.patch.into()),
            ],
            pre_release: (!v.pre.is_empty())
                .then(|| PreRelease::Identifiers(identifiers(v.pre.as_str()))),
            build: (!v.build.is_empty()).then(|| identifiers(v.build.as_str())),
        }
    }
}

fn write_dotted<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(".")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

//! Three-phase version precedence
//!
//! 1. Numeric core, zero-padded. A wildcard truncates its own side: the `*`
//!    and every segment after it are dropped before padding, so `1.2.*`
//!    compares as `1.2` (equal to `1.2.0`, less than `1.2.1`).
//! 2. Pre-release. A release sorts after any pre-release of the same core; a
//!    `*` pre-release equals any other pre-release.
//! 3. Build metadata. Unlike semver, build metadata breaks ties, and a version
//!    with build metadata sorts after the same version without it.

use std::cmp::Ordering;

use crate::version::error::VersionError;
use crate::version::parser::parse_operand;
use crate::version::types::{Identifier, Numeric, PreRelease, Segment, Version};

impl Version {
    /// Compare two versions by precedence.
    pub fn compare(&self, other: &Version) -> Ordering {
        compare_core(&self.core, &other.core)
            .then_with(|| {
                compare_pre_release(self.pre_release.as_ref(), other.pre_release.as_ref())
            })
            .then_with(|| compare_build(self.build.as_deref(), other.build.as_deref()))
    }
}

/// Parse both strings and compare them by precedence.
pub fn compare(v1: &str, v2: &str) -> Result<Ordering, VersionError> {
    let v1 = parse_operand(v1)?;
    let v2 = parse_operand(v2)?;
    Ok(v1.compare(&v2))
}

fn compare_core(a: &[Segment], b: &[Segment]) -> Ordering {
    let a = numeric_prefix(a);
    let b = numeric_prefix(b);
    let zero = Numeric::zero();

    (0..a.len().max(b.len()))
        .map(|i| {
            let left = a.get(i).copied().unwrap_or(&zero);
            let right = b.get(i).copied().unwrap_or(&zero);
            left.cmp(right)
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Segments before the first wildcard
fn numeric_prefix(segments: &[Segment]) -> Vec<&Numeric> {
    segments
        .iter()
        .map_while(|segment| match segment {
            Segment::Number(n) => Some(n),
            Segment::Wildcard => None,
        })
        .collect()
}

fn compare_pre_release(a: Option<&PreRelease>, b: Option<&PreRelease>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(PreRelease::Wildcard), Some(_)) | (Some(_), Some(PreRelease::Wildcard)) => {
            Ordering::Equal
        }
        (Some(PreRelease::Identifiers(a)), Some(PreRelease::Identifiers(b))) => {
            compare_identifiers(a, b)
        }
    }
}

fn compare_build(a: Option<&[Identifier]>, b: Option<&[Identifier]>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => compare_identifiers(a, b),
    }
}

/// Compare identifier lists left to right; a shorter list with an equal prefix is lesser.
pub fn compare_identifiers(a: &[Identifier], b: &[Identifier]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| compare_identifier(x, y))
        .find(|ordering| ordering.is_ne())
        .unwrap_or_else(|| a.len().cmp(&b.len()))
}

fn compare_identifier(a: &Identifier, b: &Identifier) -> Ordering {
    match (a, b) {
        (Identifier::Numeric(x), Identifier::Numeric(y)) => x.cmp(y),
        (Identifier::Numeric(_), Identifier::AlphaNumeric(_)) => Ordering::Less,
        (Identifier::AlphaNumeric(_), Identifier::Numeric(_)) => Ordering::Greater,
        (Identifier::AlphaNumeric(x), Identifier::AlphaNumeric(y)) => {
            x.as_bytes().cmp(y.as_bytes())
        }
    }
}

//! Range membership
//!
//! [`is_covered`] answers the common `[min, max]` question with one
//! inclusivity flag for both ends. [`VersionRange`] models each end
//! separately, including open-ended ranges, and can be deserialized from
//! advisory-style records with `minVerIncluding` / `maxVerExcluding` fields.

use std::fmt;

use serde::Deserialize;
use tracing::debug;

use crate::version::error::VersionError;
use crate::version::operator::Operator;
use crate::version::parser::parse_operand;
use crate::version::types::Version;

/// One end of a [`VersionRange`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bound {
    Including(Version),
    Excluding(Version),
    Unbounded,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RangeCriteria")]
pub struct VersionRange {
    lower: Bound,
    upper: Bound,
}

impl VersionRange {
    pub fn new(lower: Bound, upper: Bound) -> Self {
        Self { lower, upper }
    }

    /// `[min, max]` when `including`, otherwise `(min, max)`
    pub fn between(min: Version, max: Version, including: bool) -> Self {
        if including {
            Self::new(Bound::Including(min), Bound::Including(max))
        } else {
            Self::new(Bound::Excluding(min), Bound::Excluding(max))
        }
    }

    pub fn lower(&self) -> &Bound {
        &self.lower
    }

    pub fn upper(&self) -> &Bound {
        &self.upper
    }

    pub fn contains(&self, version: &Version) -> bool {
        let above_lower = match &self.lower {
            Bound::Including(min) => version.satisfies(Operator::Ge, min),
            Bound::Excluding(min) => version.satisfies(Operator::Gt, min),
            Bound::Unbounded => true,
        };
        let below_upper = match &self.upper {
            Bound::Including(max) => version.satisfies(Operator::Le, max),
            Bound::Excluding(max) => version.satisfies(Operator::Lt, max),
            Bound::Unbounded => true,
        };
        above_lower && below_upper
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lower = match &self.lower {
            Bound::Including(v) => Some(format!(">={v}")),
            Bound::Excluding(v) => Some(format!(">{v}")),
            Bound::Unbounded => None,
        };
        let upper = match &self.upper {
            Bound::Including(v) => Some(format!("<={v}")),
            Bound::Excluding(v) => Some(format!("<{v}")),
            Bound::Unbounded => None,
        };
        match (lower, upper) {
            (Some(lower), Some(upper)) => write!(f, "{lower}, {upper}"),
            (Some(bound), None) | (None, Some(bound)) => f.write_str(&bound),
            (None, None) => f.write_str("*"),
        }
    }
}

/// Raw range record as published in vulnerability feeds
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RangeCriteria {
    pub min_ver_including: Option<String>,
    pub min_ver_excluding: Option<String>,
    pub max_ver_including: Option<String>,
    pub max_ver_excluding: Option<String>,
}

impl TryFrom<RangeCriteria> for VersionRange {
    type Error = VersionError;

    fn try_from(criteria: RangeCriteria) -> Result<Self, Self::Error> {
        let lower = to_bound(
            "lower bound",
            criteria.min_ver_including,
            criteria.min_ver_excluding,
        )?;
        let upper = to_bound(
            "upper bound",
            criteria.max_ver_including,
            criteria.max_ver_excluding,
        )?;
        Ok(Self::new(lower, upper))
    }
}

fn to_bound(
    side: &'static str,
    including: Option<String>,
    excluding: Option<String>,
) -> Result<Bound, VersionError> {
    match (including, excluding) {
        (Some(_), Some(_)) => Err(VersionError::ConflictingBounds(side)),
        (Some(v), None) => Ok(Bound::Including(parse_operand(&v)?)),
        (None, Some(v)) => Ok(Bound::Excluding(parse_operand(&v)?)),
        (None, None) => Ok(Bound::Unbounded),
    }
}

/// Check whether `version` lies between `min` and `max`.
///
/// With `including` both ends are inclusive, without it both are exclusive.
/// Pass `true` for the usual closed interval, or use [`is_covered_inclusive`].
pub fn is_covered(
    version: &str,
    min: &str,
    max: &str,
    including: bool,
) -> Result<bool, VersionError> {
    let range = VersionRange::between(parse_operand(min)?, parse_operand(max)?, including);
    let covered = range.contains(&parse_operand(version)?);
    debug!("{} in {}: {}", version, range, covered);
    Ok(covered)
}

/// [`is_covered`] with both ends inclusive
pub fn is_covered_inclusive(version: &str, min: &str, max: &str) -> Result<bool, VersionError> {
    is_covered(version, min, max, true)
}

//! Relational operators over version precedence

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::version::error::VersionError;
use crate::version::parser::parse_operand;
use crate::version::types::Version;

/// One of the six supported relational operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `==`
    Eq,
    /// `!=`
    Ne,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Eq => "==",
            Operator::Ne => "!=",
        }
    }

    /// Whether a comparison outcome satisfies this operator
    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            Operator::Lt => ordering.is_lt(),
            Operator::Le => ordering.is_le(),
            Operator::Gt => ordering.is_gt(),
            Operator::Ge => ordering.is_ge(),
            Operator::Eq => ordering.is_eq(),
            Operator::Ne => ordering.is_ne(),
        }
    }
}

impl FromStr for Operator {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::Le),
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::Ge),
            "==" => Ok(Operator::Eq),
            "!=" => Ok(Operator::Ne),
            _ => Err(VersionError::UnsupportedOperator(s.to_string())),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Version {
    /// `self <operator> other`
    pub fn satisfies(&self, operator: Operator, other: &Version) -> bool {
        operator.holds(self.compare(other))
    }
}

/// Evaluate `v1 <operator> v2`.
///
/// The operator is checked before either version is parsed.
pub fn evaluate(v1: &str, operator: &str, v2: &str) -> Result<bool, VersionError> {
    let operator: Operator = operator.parse()?;
    let v1 = parse_operand(v1)?;
    let v2 = parse_operand(v2)?;
    Ok(v1.satisfies(operator, &v2))
}

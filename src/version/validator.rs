//! Well-formedness checks on top of the grammar

use tracing::debug;

use crate::version::error::ParseError;
use crate::version::parser::parse;
use crate::version::types::Version;

/// Returns `true` if `text` is a well-formed version.
///
/// Never fails: every parse or structural error collapses into `false`.
pub fn is_valid(text: &str) -> bool {
    parse(text)
        .inspect_err(|e| debug!("Invalid version '{}': {}", text, e))
        .is_ok()
}

/// Structural rules the character grammar cannot express.
///
/// A wildcard may only be the last segment of the numeric core.
pub fn check_structure(version: &Version) -> Result<(), ParseError> {
    let last = version.core.len().saturating_sub(1);
    match version
        .core
        .iter()
        .position(|segment| segment.is_wildcard())
    {
        Some(position) if position != last => Err(ParseError::MisplacedWildcard { position }),
        _ => Ok(()),
    }
}

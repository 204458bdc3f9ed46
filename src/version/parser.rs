//! Version string grammar
//!
//! ```text
//! version    := core ( "-" prerelease )? ( "+" build )?
//! core       := segment ( "." segment )*
//! segment    := digit+ | "*"
//! prerelease := "*" | identifier ( "." identifier )*
//! build      := identifier ( "." identifier )*
//! identifier := (alnum | "-")+
//! ```

use std::str::FromStr;

use crate::version::error::{ParseError, VersionError};
use crate::version::types::{Identifier, Numeric, PreRelease, Segment, Version};
use crate::version::validator::check_structure;

/// Parse a version and enforce the trailing-wildcard rule.
///
/// This is the entry point used by every comparison operation.
pub fn parse(text: &str) -> Result<Version, ParseError> {
    let version = parse_grammar(text)?;
    check_structure(&version)?;
    Ok(version)
}

/// [`parse`] for operands of comparison operations, keeping the offending input in the error.
pub(crate) fn parse_operand(text: &str) -> Result<Version, VersionError> {
    parse(text).map_err(|e| VersionError::invalid(text, e))
}

/// Tokenize a version according to the character grammar only.
///
/// A wildcard is accepted in any core position here (`1.*.0` parses);
/// use [`parse`] to also reject non-trailing wildcards.
pub fn parse_grammar(text: &str) -> Result<Version, ParseError> {
    if text.is_empty() {
        return Err(ParseError::Empty);
    }

    if let Some((position, character)) = text.char_indices().find(|(_, c)| !is_allowed(*c)) {
        return Err(ParseError::InvalidCharacter {
            character,
            position,
        });
    }

    let (head, build) = match text.split_once('+') {
        Some((head, build)) => (head, Some((head.len() + 1, build))),
        None => (text, None),
    };
    let (core, pre_release) = match head.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (head, None),
    };

    Ok(Version {
        core: parse_core(core)?,
        pre_release: pre_release.map(parse_pre_release).transpose()?,
        build: build
            .map(|(offset, build)| parse_build(offset, build))
            .transpose()?,
    })
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '*' | '+' | '-')
}

fn parse_core(core: &str) -> Result<Vec<Segment>, ParseError> {
    core.split('.')
        .enumerate()
        .map(|(position, segment)| match segment {
            "" => Err(ParseError::EmptySegment { position }),
            "*" => Ok(Segment::Wildcard),
            digits => Numeric::from_digits(digits)
                .map(Segment::Number)
                .ok_or_else(|| ParseError::InvalidSegment {
                    segment: digits.to_string(),
                }),
        })
        .collect()
}

fn parse_pre_release(pre: &str) -> Result<PreRelease, ParseError> {
    match pre {
        "" => Err(ParseError::EmptyPreRelease),
        "*" => Ok(PreRelease::Wildcard),
        _ => parse_identifiers(pre).map(PreRelease::Identifiers),
    }
}

fn parse_build(offset: usize, build: &str) -> Result<Vec<Identifier>, ParseError> {
    if build.is_empty() {
        return Err(ParseError::EmptyBuild);
    }
    // Only the first `+` starts build metadata.
    if let Some(index) = build.find('+') {
        return Err(ParseError::InvalidCharacter {
            character: '+',
            position: offset + index,
        });
    }
    parse_identifiers(build)
}

fn parse_identifiers(text: &str) -> Result<Vec<Identifier>, ParseError> {
    text.split('.').map(parse_identifier).collect()
}

fn parse_identifier(text: &str) -> Result<Identifier, ParseError> {
    if text.is_empty() {
        return Err(ParseError::EmptyIdentifier);
    }
    if !text.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ParseError::InvalidIdentifier {
            identifier: text.to_string(),
        });
    }
    Ok(Identifier::classify(text))
}

impl FromStr for Version {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

use thiserror::Error;

/// Reasons a string is not a well-formed version
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Empty version string")]
    Empty,

    #[error("Invalid character {character:?} at position {position}")]
    InvalidCharacter { character: char, position: usize },

    #[error("Empty segment at position {position}")]
    EmptySegment { position: usize },

    #[error("Segment {segment:?} is neither a number nor a wildcard")]
    InvalidSegment { segment: String },

    #[error("Wildcard at segment {position} is not the last segment")]
    MisplacedWildcard { position: usize },

    #[error("Empty pre-release")]
    EmptyPreRelease,

    #[error("Empty build metadata")]
    EmptyBuild,

    #[error("Empty identifier")]
    EmptyIdentifier,

    #[error("Invalid identifier {identifier:?}")]
    InvalidIdentifier { identifier: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("Invalid version {input:?}: {source}")]
    InvalidVersion {
        input: String,
        #[source]
        source: ParseError,
    },

    #[error("Unsupported operator: {0:?}")]
    UnsupportedOperator(String),

    #[error("Conflicting bounds: {0} has both an including and an excluding version")]
    ConflictingBounds(&'static str),
}

impl VersionError {
    pub(crate) fn invalid(input: &str, source: ParseError) -> Self {
        VersionError::InvalidVersion {
            input: input.to_string(),
            source,
        }
    }
}

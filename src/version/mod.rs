//! Version parsing, ordering and range checks
//!
//! Versions follow an extended semver shape: any number of numeric segments,
//! an optional trailing `*` wildcard, an optional pre-release and optional
//! build metadata that also takes part in ordering.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Parser    │────▶│  Validator  │────▶│ Comparator  │
//! │  (grammar)  │     │ (structure) │     │ (precedence)│
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                                  ┌─────────────┴─────────────┐
//!                                  ▼                           ▼
//!                           ┌─────────────┐             ┌─────────────┐
//!                           │  Operator   │             │    Range    │
//!                           │ (<,<=,==..) │             │ (min, max)  │
//!                           └─────────────┘             └─────────────┘
//! ```
//!
//! Every operation is a pure function of its inputs.
//!
//! # Modules
//!
//! - [`types`]: The parsed [`Version`] model
//! - [`parser`]: Grammar parser
//! - [`validator`]: [`is_valid`] and the trailing-wildcard rule
//! - [`comparator`]: Three-phase precedence ([`compare`])
//! - [`operator`]: Relational operators ([`evaluate`])
//! - [`range`]: Range membership ([`is_covered`], [`VersionRange`])
//! - [`error`]: Parse and evaluation errors

pub mod comparator;
pub mod error;
pub mod operator;
pub mod parser;
pub mod range;
pub mod types;
pub mod validator;

pub use comparator::compare;
pub use error::{ParseError, VersionError};
pub use operator::{Operator, evaluate};
pub use parser::parse;
pub use range::{Bound, RangeCriteria, VersionRange, is_covered, is_covered_inclusive};
pub use types::{Identifier, Numeric, PreRelease, Segment, Version};
pub use validator::is_valid;

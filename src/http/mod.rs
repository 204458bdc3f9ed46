//! Outgoing HTTP with retries and rate limiting
//!
//! # Modules
//!
//! - [`client`]: [`HttpClient`] with status classification and retry/backoff
//! - [`rate_limit`]: [`RateLimit`] trait and a sliding-window implementation
//! - [`error`]: Error types for HTTP operations

pub mod client;
pub mod error;
pub mod rate_limit;

pub use client::HttpClient;
pub use error::HttpError;
pub use rate_limit::{RateLimit, SlidingWindowLimiter};

//! Version string validation, ordering and range membership.
//!
//! The [`version`] module is the pure core. [`config`], [`logging`] and
//! [`http`] are the supporting layers used by callers that fetch version data.

pub mod config;
pub mod http;
pub mod logging;
pub mod version;

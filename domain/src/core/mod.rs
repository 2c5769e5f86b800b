//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`]: registry setup errors

pub mod error;

//! Application-level configuration.
//!
//! - [`GuardParams`]: loop-safety budgets, per-tool quotas and call timeout

pub mod guard_params;

pub use guard_params::GuardParams;

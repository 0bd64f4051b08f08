//! Router Module Index
//!
//! Routes are split by the identity they need. The policy table in
//! `crate::policy` is still evaluated inside every handler; the split only
//! decides which routes sit behind the authentication layer.

/// Open actions: reads, category creation, health.
pub mod public;

/// Actions that need a resolved `AuthUser`; wrapped by the auth middleware.
pub mod authenticated;

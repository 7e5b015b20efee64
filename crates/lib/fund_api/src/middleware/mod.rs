//! Request guards: bearer-token authentication and origin-based CSRF.

pub mod auth;
pub mod csrf;

//! # fund_core
//!
//! Core domain logic for fund: token lifecycle, credential store,
//! and the SQL store for users, deposits, and payments.

pub mod auth;
pub mod migrate;
pub mod models;
pub mod store;

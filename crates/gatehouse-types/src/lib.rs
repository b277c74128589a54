//! Gatehouse Types - Shared domain types
//!
//! This crate contains the domain types used across gatehouse crates,
//! chiefly the authorization roles embedded in tokens and directory rows.

pub mod role;

pub use role::*;

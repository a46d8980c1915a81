//! Dribble Core - Shared domain types.
//!
//! This crate provides the types shared by the admin API and the CLI:
//! - `admin` - Order-management HTTP API (auth, orders, push tokens)
//! - `cli` - Command-line tools for migrations and account provisioning
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules - no I/O, no database
//! access, no HTTP clients. Database encoding is available behind the
//! `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, amounts, contact identifiers, order statuses and
//!   status filters

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

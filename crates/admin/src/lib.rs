//! Dribble Admin library.
//!
//! The order-management API behind the Dribble admin app, provided as a
//! library so the router can be built and tested in-process.
//!
//! # Security
//!
//! Every route except login and the health probes needs a bearer token.
//! Tokens are HS256-signed with `JWT_SECRET`; running with the built-in
//! fallback secret is logged as a warning at startup.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

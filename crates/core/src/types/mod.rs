//! Core types for Dribble.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod amount;
pub mod contact;
pub mod id;
pub mod push_token;
pub mod status;

pub use amount::{Amount, AmountError};
pub use contact::{Email, EmailError, LoginIdentifier};
pub use id::*;
pub use push_token::{PushTokenError, PushTokenValue};
pub use status::*;

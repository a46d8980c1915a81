//! Business logic services for admin.
//!
//! # Services
//!
//! - `auth` - Password login, bearer tokens and the current-identity lookup
//! - `orders` - Order queries, status changes, cancellation and stats

pub mod auth;
pub mod orders;

pub use auth::{AdminAuthService, AuthError, LoginSuccess};
pub use orders::{CancelRefusal, OrderError, OrderService};

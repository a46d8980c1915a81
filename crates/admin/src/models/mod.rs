//! Domain models for the admin API.
//!
//! Repository row types convert into these; handlers serialize them directly.

pub mod admin_user;
pub mod order;
pub mod push_token;
pub mod session;

pub use admin_user::{AdminProfile, AdminUser};
pub use order::{
    Cancellation, Order, OrderItem, OrderListQuery, OrderStats, Pagination, PaymentDetails,
    Shipment, ShippingAddress,
};
pub use push_token::{PushToken, PushTokenRegistration};
pub use session::CurrentAdmin;

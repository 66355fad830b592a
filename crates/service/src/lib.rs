//! Service layer holding the marketplace business rules on top of `models`.
//! - Separates business logic from HTTP handling and data access.
//! - Reuses validation and entity definitions in `models` crate.
//! - Provides clear error types and documented interfaces.

pub mod errors;
pub mod pagination;
pub mod cache;
pub mod otp;
pub mod notify;
pub mod rate_limit;
pub mod image_host;
pub mod audit;
pub mod auth;
pub mod notifications;
pub mod bookings;
pub mod catalog;
pub mod feedback;
pub mod users;
pub mod vendors;
pub mod admin;
pub mod dashboard;
pub mod seed;
#[cfg(test)]
pub mod test_support;

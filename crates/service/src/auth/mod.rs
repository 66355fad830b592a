//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Covers PIN login for users and vendors, password login for admins, OTP
//! verification, PIN reset and JWT issuance. Persistence goes through
//! [`repository::AuthRepository`] so the flows run against SeaORM or the
//! in-memory mock.

pub mod domain;
pub mod errors;
pub mod pin;
pub mod repository;
pub mod service;
pub mod tokens;
pub mod repo;

pub use service::AuthService;

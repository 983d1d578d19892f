//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations with no business meaning:
//! - Clock abstraction (system clock, manual clock for tests)
//! - Random bytes and digits, constant-time comparison
//! - Bearer credential extraction from request headers
//! - Password hashing (Argon2id)

pub mod bearer;
pub mod clock;
pub mod crypto;
pub mod password;

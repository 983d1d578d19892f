//! Value Objects

pub mod account_role;
pub mod email;
pub mod nickname;

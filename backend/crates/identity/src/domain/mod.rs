//! Domain Layer
//!
//! Entities, value objects, collaborator traits and the authorization rules.

pub mod authorization;
pub mod entity;
pub mod repository;
pub mod value_object;

pub use entity::{account::Account, pending_code::PendingCode, principal::Principal};
pub use repository::{AccountRepository, NotificationTransport};

//! Infrastructure Layer
//!
//! Database implementations and external service integrations.

pub mod memory;
pub mod notification;
pub mod postgres;

pub use memory::InMemoryAccountRepository;
pub use notification::{RecordingTransport, SentNotification, TracingTransport};
pub use postgres::PgAccountRepository;

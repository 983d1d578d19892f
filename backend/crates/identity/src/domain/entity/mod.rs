pub mod account;
pub mod pending_code;
pub mod principal;

//! Domain rules for the bartender ordering service.
//!
//! Everything in this crate is pure: validation, status machines, naming
//! conventions for stored objects, and retry timing. I/O lives in the
//! `db`, `cloud`, `pipeline`, `events`, and `api` crates.

pub mod error;
pub mod images;
pub mod lenient;
pub mod order;
pub mod recipe;
pub mod registration;
pub mod retry;
pub mod roles;
pub mod types;

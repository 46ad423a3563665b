//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` request DTOs where the API accepts that entity
//! - Joined read models used by list endpoints

pub mod drink;
pub mod order;
pub mod refresh_token;
pub mod registration_code;
pub mod section;
pub mod user;

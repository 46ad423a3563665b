//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` (or an open transaction) as the first argument.

pub mod drink_repo;
pub mod order_repo;
pub mod refresh_token_repo;
pub mod registration_code_repo;
pub mod section_repo;
pub mod user_repo;

pub use drink_repo::DrinkRepo;
pub use order_repo::OrderRepo;
pub use refresh_token_repo::RefreshTokenRepo;
pub use registration_code_repo::RegistrationCodeRepo;
pub use section_repo::SectionRepo;
pub use user_repo::UserRepo;

pub mod auth;
pub mod drinks;
pub mod images;
pub mod orders;
pub mod registration;
pub mod sections;

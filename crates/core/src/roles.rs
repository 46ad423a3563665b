//! Well-known identity-provider group and role names.

/// Group (or `custom:role` value) that grants access to the admin routes.
pub const ROLE_ADMIN: &str = "admin";

//! Registration rules: usernames, registration-code limits, and status filters.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;
use crate::types::DbId;

/// Minimum username length, in characters, after trimming.
pub const USERNAME_MIN_LEN: usize = 3;

/// Maximum username length, in characters, after trimming.
pub const USERNAME_MAX_LEN: usize = 100;

/// Default lifetime of a freshly issued registration code.
pub const DEFAULT_CODE_EXPIRY_HOURS: i64 = 24;

/// Longest allowed registration-code lifetime (7 days).
pub const MAX_CODE_EXPIRY_HOURS: i64 = 168;

/// Default number of registrations one code allows.
pub const DEFAULT_CODE_MAX_USES: i64 = 1;

/// Upper bound for `max_uses` on a single code.
pub const MAX_CODE_USES: i64 = 25;

/// Maximum number of codes returned by the admin listing.
pub const CODE_LIST_LIMIT: i64 = 100;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-ZåäöÅÄÖ0-9 _-]+$").expect("valid username regex"));

/// Validate a username and return its trimmed form.
pub fn validate_username(raw: &str) -> Result<String, CoreError> {
    let username = raw.trim();
    if username.is_empty() {
        return Err(CoreError::Validation("Username is required".into()));
    }

    let len = username.chars().count();
    if len < USERNAME_MIN_LEN {
        return Err(CoreError::Validation(format!(
            "Username must be at least {USERNAME_MIN_LEN} characters"
        )));
    }
    if len > USERNAME_MAX_LEN {
        return Err(CoreError::Validation(format!(
            "Username must not exceed {USERNAME_MAX_LEN} characters"
        )));
    }
    if !USERNAME_RE.is_match(username) {
        return Err(CoreError::Validation(
            "Username contains invalid characters".into(),
        ));
    }

    Ok(username.to_string())
}

/// Apply the default and range check to a requested code lifetime.
pub fn validate_expiry_hours(requested: Option<i64>) -> Result<i64, CoreError> {
    let hours = requested.unwrap_or(DEFAULT_CODE_EXPIRY_HOURS);
    if !(1..=MAX_CODE_EXPIRY_HOURS).contains(&hours) {
        return Err(CoreError::Validation(format!(
            "expires_in_hours must be between 1 and {MAX_CODE_EXPIRY_HOURS} (7 days)"
        )));
    }
    Ok(hours)
}

/// Apply the default and range check to a requested use count.
pub fn validate_max_uses(requested: Option<i64>) -> Result<i64, CoreError> {
    let uses = requested.unwrap_or(DEFAULT_CODE_MAX_USES);
    if !(1..=MAX_CODE_USES).contains(&uses) {
        return Err(CoreError::Validation(format!(
            "max_uses must be between 1 and {MAX_CODE_USES}"
        )));
    }
    Ok(uses)
}

/// Shareable link a guest opens to register with `code`.
pub fn registration_url(frontend_url: &str, code: DbId) -> String {
    format!("{}/register?code={code}", frontend_url.trim_end_matches('/'))
}

/// Filter for the admin registration-code listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeStatusFilter {
    /// Not exhausted and not expired.
    Active,
    /// Exhausted: `use_count` has reached `max_uses`.
    Used,
    /// Not exhausted, but past its expiry time.
    Expired,
}

impl FromStr for CodeStatusFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(CodeStatusFilter::Active),
            "used" => Ok(CodeStatusFilter::Used),
            "expired" => Ok(CodeStatusFilter::Expired),
            _ => Err(CoreError::Validation(
                "Invalid status filter. Must be one of: active, used, expired".into(),
            )),
        }
    }
}

//! Registration-code gate for `POST /register`.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use bartender_core::error::CoreError;
use bartender_core::types::DbId;
use bartender_db::models::registration_code::RegistrationCode;
use bartender_db::repositories::RegistrationCodeRepo;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the registration code.
pub const REGISTRATION_CODE_HEADER: &str = "x-registration-code";

/// A registration code that exists, has uses left, and has not expired.
///
/// The code is checked again when it is consumed, so a code exhausted by a
/// concurrent registration is still caught.
pub struct ValidRegistrationCode(pub RegistrationCode);

impl FromRequestParts<AppState> for ValidRegistrationCode {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let invalid =
            || AppError::Core(CoreError::Unauthorized("Invalid registration code".into()));

        let code = parts
            .headers
            .get(REGISTRATION_CODE_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<DbId>().ok())
            .ok_or_else(invalid)?;

        let found = RegistrationCodeRepo::find_valid(&state.pool, code)
            .await?
            .ok_or_else(invalid)?;

        Ok(ValidRegistrationCode(found))
    }
}

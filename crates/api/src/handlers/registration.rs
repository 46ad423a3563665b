//! Handlers for guest registration and admin management of registration
//! codes.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use bartender_core::error::CoreError;
use bartender_core::lenient::int_field;
use bartender_core::registration::{
    registration_url, validate_expiry_hours, validate_max_uses, validate_username,
    CodeStatusFilter,
};
use bartender_core::types::{DbId, Timestamp};
use bartender_db::models::refresh_token::CreateRefreshToken;
use bartender_db::models::registration_code::{
    CreateRegistrationCode, RegistrationCode, RegistrationCodeInput, RegistrationCodeListParams,
};
use bartender_db::repositories::user_repo::RegistrationOutcome;
use bartender_db::repositories::{RegistrationCodeRepo, UserRepo};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::user_token::{generate_access_token, generate_refresh_token};
use crate::error::{AppError, AppResult};
use crate::extract::LenientJson;
use crate::middleware::admin::RequireAdmin;
use crate::middleware::registration::ValidRegistrationCode;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `POST /register`.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
}

/// Tokens issued to a freshly registered guest.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_key: DbId,
    pub username: String,
    pub access_token: String,
    pub refresh_token: String,
    pub access_token_expires_at: Timestamp,
    pub refresh_token_expires_at: Timestamp,
}

/// A registration code with its shareable link.
#[derive(Debug, Serialize)]
pub struct RegistrationCodeView {
    #[serde(flatten)]
    pub code: RegistrationCode,
    pub registration_url: String,
}

impl RegistrationCodeView {
    fn new(code: RegistrationCode, frontend_url: &str) -> Self {
        let registration_url = registration_url(frontend_url, code.code);
        Self {
            code,
            registration_url,
        }
    }
}

// ---------------------------------------------------------------------------
// Guest registration
// ---------------------------------------------------------------------------

/// POST /api/v1/register
///
/// Requires a valid `X-Registration-Code`. Creates the guest, consumes one
/// use of the code, and returns an access/refresh token pair.
pub async fn register(
    ValidRegistrationCode(code): ValidRegistrationCode,
    State(state): State<AppState>,
    headers: HeaderMap,
    LenientJson(input): LenientJson<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    let username = validate_username(input.username.as_deref().unwrap_or_default())?;

    let (refresh_token, token_hash) = generate_refresh_token();
    let refresh_token_expires_at = state.config.user_tokens.refresh_token_expires_at();

    let outcome = UserRepo::register(
        &state.pool,
        &username,
        code.code,
        &CreateRefreshToken {
            user_key: DbId::nil(),
            token_hash,
            expires_at: refresh_token_expires_at,
            device_info: Some(device_info(&headers)),
        },
    )
    .await?;

    let user = match outcome {
        RegistrationOutcome::Registered(user) => user,
        RegistrationOutcome::UsernameTaken => {
            return Err(CoreError::Conflict("Username already exists".into()).into());
        }
        RegistrationOutcome::CodeUnavailable => {
            return Err(CoreError::Unauthorized("Invalid registration code".into()).into());
        }
    };

    let access = generate_access_token(user.user_key, &user.username, &state.config.user_tokens)
        .map_err(|e| AppError::InternalError(format!("Failed to sign access token: {e}")))?;

    tracing::info!(user_key = %user.user_key, username = %user.username, "Guest registered");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: RegisterResponse {
                user_key: user.user_key,
                username: user.username,
                access_token: access.token,
                refresh_token,
                access_token_expires_at: access.expires_at,
                refresh_token_expires_at,
            },
        }),
    ))
}

/// Client details stored alongside a refresh token.
fn device_info(headers: &HeaderMap) -> Value {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let ip = header("x-forwarded-for")
        .and_then(|v| v.split(',').next().map(|s| s.trim().to_string()))
        .filter(|s| !s.is_empty());

    json!({
        "user_agent": header("user-agent"),
        "ip": ip,
        "timestamp": Utc::now(),
    })
}

// ---------------------------------------------------------------------------
// Admin: registration codes
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/registration-codes?status=
///
/// Newest first. `status` is one of `active`, `used`, `expired`.
pub async fn list_codes(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<RegistrationCodeListParams>,
) -> AppResult<impl IntoResponse> {
    let filter = params
        .status
        .as_deref()
        .map(str::parse::<CodeStatusFilter>)
        .transpose()?;

    let codes = RegistrationCodeRepo::list(&state.pool, filter).await?;
    let frontend_url = &state.config.frontend_url;
    let data: Vec<RegistrationCodeView> = codes
        .into_iter()
        .map(|code| RegistrationCodeView::new(code, frontend_url))
        .collect();

    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/admin/registration-codes
///
/// `expires_in_hours` (1..=168, default 24), `max_uses` (1..=25, default 1)
/// and `notes` are all optional.
pub async fn create_code(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    LenientJson(input): LenientJson<RegistrationCodeInput>,
) -> AppResult<impl IntoResponse> {
    let hours = validate_expiry_hours(int_field(
        input.expires_in_hours.as_ref(),
        "expires_in_hours",
    )?)?;
    let max_uses = validate_max_uses(int_field(input.max_uses.as_ref(), "max_uses")?)?;
    let notes = input
        .notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    let code = RegistrationCodeRepo::create(
        &state.pool,
        &CreateRegistrationCode {
            created_by: admin.display_name.clone(),
            expires_at: Utc::now() + Duration::hours(hours),
            max_uses: max_uses as i32,
            notes,
        },
    )
    .await?;

    tracing::info!(
        code = %code.code,
        max_uses,
        expires_at = %code.expires_at,
        admin = %admin.display_name,
        "Registration code created",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: RegistrationCodeView::new(code, &state.config.frontend_url),
        }),
    ))
}

/// DELETE /api/v1/admin/registration-codes/{code}
pub async fn delete_code(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(code): Path<DbId>,
) -> AppResult<StatusCode> {
    if !RegistrationCodeRepo::delete(&state.pool, code).await? {
        return Err(CoreError::NotFound {
            entity: "Registration code",
            id: code,
        }
        .into());
    }

    tracing::info!(%code, admin = %admin.display_name, "Registration code deleted");
    Ok(StatusCode::NO_CONTENT)
}

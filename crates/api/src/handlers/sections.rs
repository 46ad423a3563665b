//! Handlers for menu sections: the public listing and admin management.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use bartender_core::error::CoreError;
use bartender_core::lenient::int_field;
use bartender_core::types::DbId;
use bartender_db::models::section::{CreateSection, SectionInput, UpdateSection};
use bartender_db::repositories::section_repo::SectionDeletion;
use bartender_db::repositories::SectionRepo;

use crate::error::{AppError, AppResult};
use crate::extract::LenientJson;
use crate::middleware::admin::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

const DUPLICATE_ORDER: &str = "A section with this display order already exists";

// ---------------------------------------------------------------------------
// Public
// ---------------------------------------------------------------------------

/// GET /api/v1/sections
///
/// All sections ordered by display order, then name. Cached.
pub async fn list_sections(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let body = state
        .cache
        .get_or_load("sections".into(), || async {
            let sections = SectionRepo::list(&state.pool).await?;
            Ok::<_, AppError>(DataResponse { data: sections })
        })
        .await?;

    Ok(Json(body))
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/sections
///
/// Requires `name` and `display_order` (an integer or numeric string).
pub async fn create_section(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    LenientJson(input): LenientJson<SectionInput>,
) -> AppResult<impl IntoResponse> {
    let name = input
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| CoreError::Validation("name is required".into()))?
        .to_string();

    let display_order = display_order_field(&input)?
        .ok_or_else(|| CoreError::Validation("display_order is required".into()))?;

    if SectionRepo::display_order_taken(&state.pool, display_order, None).await? {
        return Err(CoreError::Conflict(DUPLICATE_ORDER.into()).into());
    }

    let section = SectionRepo::create(
        &state.pool,
        &CreateSection {
            name,
            display_order,
        },
    )
    .await?;

    state.cache.flush();
    tracing::info!(
        section_id = %section.id,
        name = %section.name,
        display_order = section.display_order,
        admin = %admin.display_name,
        "Section created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: section })))
}

/// PUT /api/v1/admin/sections/{id}
///
/// Partial update of `name` and/or `display_order`.
pub async fn update_section(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    LenientJson(input): LenientJson<SectionInput>,
) -> AppResult<impl IntoResponse> {
    let name = match input.name.as_deref().map(str::trim) {
        Some("") => {
            return Err(CoreError::Validation("name must not be empty".into()).into());
        }
        other => other.map(str::to_string),
    };
    let update = UpdateSection {
        name,
        display_order: display_order_field(&input)?,
    };
    if update.is_empty() {
        return Err(CoreError::Validation("No fields to update".into()).into());
    }

    SectionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Section",
            id,
        })?;

    if let Some(order) = update.display_order {
        if SectionRepo::display_order_taken(&state.pool, order, Some(id)).await? {
            return Err(CoreError::Conflict(DUPLICATE_ORDER.into()).into());
        }
    }

    let section = SectionRepo::update(&state.pool, id, &update)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Section",
            id,
        })?;

    state.cache.flush();
    tracing::info!(section_id = %id, admin = %admin.display_name, "Section updated");

    Ok(Json(DataResponse { data: section }))
}

/// DELETE /api/v1/admin/sections/{id}
///
/// Refused with 409 while drinks still belong to the section.
pub async fn delete_section(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let section = match SectionRepo::delete_if_empty(&state.pool, id).await? {
        SectionDeletion::Deleted(section) => section,
        SectionDeletion::NotEmpty {
            section,
            drink_count,
        } => {
            return Err(AppError::Core(CoreError::SectionNotEmpty {
                section_name: section.name,
                drink_count,
            }));
        }
        SectionDeletion::NotFound => {
            return Err(CoreError::NotFound {
                entity: "Section",
                id,
            }
            .into());
        }
    };

    state.cache.flush();
    tracing::info!(section_id = %id, name = %section.name, admin = %admin.display_name, "Section deleted");

    Ok(StatusCode::NO_CONTENT)
}

fn display_order_field(input: &SectionInput) -> Result<Option<i32>, CoreError> {
    int_field(input.display_order.as_ref(), "display_order")?
        .map(|n| {
            i32::try_from(n)
                .map_err(|_| CoreError::Validation("display_order must be an integer".into()))
        })
        .transpose()
}

//! Handlers for drinks: the public menu and admin management.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use bartender_cloud::{delete_drink_images, ObjectStorage};
use bartender_core::error::CoreError;
use bartender_core::recipe::validate_recipe;
use bartender_core::types::DbId;
use bartender_db::models::drink::{AdminDrinkListParams, CreateDrink, DrinkInput, DrinkListParams};
use bartender_db::repositories::{DrinkRepo, SectionRepo};
use bartender_events::{DomainEvent, EventKind};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::extract::LenientJson;
use crate::middleware::admin::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Public
// ---------------------------------------------------------------------------

/// GET /api/v1/drinks?section_id=
///
/// Active drinks without recipes, ordered by name. Cached.
pub async fn list_drinks(
    State(state): State<AppState>,
    Query(params): Query<DrinkListParams>,
) -> AppResult<impl IntoResponse> {
    let key = match params.section_id {
        Some(id) => format!("drinks:{id}"),
        None => "drinks:all".to_string(),
    };
    let body = state
        .cache
        .get_or_load(key, || async {
            let drinks = DrinkRepo::list_active(&state.pool, params.section_id).await?;
            Ok::<_, AppError>(DataResponse { data: drinks })
        })
        .await?;

    Ok(Json(body))
}

/// GET /api/v1/drinks/{id}
///
/// A single active drink including its recipe. Cached.
pub async fn get_drink(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let body = state
        .cache
        .get_or_load(format!("drink:{id}"), || async {
            let drink = DrinkRepo::find_active(&state.pool, id)
                .await?
                .ok_or(CoreError::NotFound {
                    entity: "Drink",
                    id,
                })?;
            Ok::<_, AppError>(DataResponse { data: drink })
        })
        .await?;

    Ok(Json(body))
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/drinks?section_id=&include_inactive=
///
/// Every drink with its section name. Inactive drinks are included unless
/// `include_inactive` is given with any value other than `true`.
pub async fn list_drinks_admin(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<AdminDrinkListParams>,
) -> AppResult<impl IntoResponse> {
    let drinks = DrinkRepo::list_admin(
        &state.pool,
        params.section_id,
        params.include_inactive.unwrap_or(true),
    )
    .await?;

    Ok(Json(DataResponse { data: drinks }))
}

/// POST /api/v1/admin/drinks
///
/// Requires `name` and `section_id`. Publishes `DRINK_CREATED`.
pub async fn create_drink(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    LenientJson(input): LenientJson<DrinkInput>,
) -> AppResult<impl IntoResponse> {
    let name = input
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| CoreError::Validation("name is required".into()))?
        .to_string();
    let section_id = input
        .section_id
        .ok_or_else(|| CoreError::Validation("section_id is required".into()))?;

    let recipe = match &input.recipe {
        Some(Some(value)) => validate_recipe(value)?,
        _ => None,
    };

    SectionRepo::find_by_id(&state.pool, section_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Section",
            id: section_id,
        })?;

    let drink = DrinkRepo::create(
        &state.pool,
        &CreateDrink {
            section_id,
            name,
            description: input.description.unwrap_or_default(),
            ingredients: input.ingredients.unwrap_or_else(|| json!([])),
            recipe,
            image_url: input.image_url.unwrap_or_default(),
            is_active: input.is_active.unwrap_or(true),
        },
    )
    .await?;

    state.cache.flush();
    state.event_bus.publish(
        DomainEvent::new(EventKind::DrinkCreated).with_payload(json!({
            "drink_id": drink.id,
            "name": drink.name,
            "description": drink.description,
            "ingredients": drink.ingredients,
        })),
    );
    tracing::info!(drink_id = %drink.id, name = %drink.name, admin = %admin.display_name, "Drink created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: drink })))
}

/// PUT /api/v1/admin/drinks/{id}
///
/// Partial update. `recipe: null` clears the recipe. Changing `image_url`
/// away from a non-empty value deletes the drink's stored images.
pub async fn update_drink(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    LenientJson(input): LenientJson<DrinkInput>,
) -> AppResult<impl IntoResponse> {
    if input.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(CoreError::Validation("name must not be empty".into()).into());
    }

    let recipe = match &input.recipe {
        None => None,
        Some(None) => Some(None),
        Some(Some(value)) => Some(validate_recipe(value)?),
    };

    let existing = DrinkRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Drink",
            id,
        })?;

    if let Some(section_id) = input.section_id.filter(|s| *s != existing.section_id) {
        SectionRepo::find_by_id(&state.pool, section_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Section",
                id: section_id,
            })?;
    }

    let mut merged = existing.merged(&input, recipe);
    merged.name = merged.name.trim().to_string();

    let drink = DrinkRepo::update(&state.pool, id, &merged)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Drink",
            id,
        })?;

    let image_changed = !existing.image_url.is_empty()
        && input
            .image_url
            .as_deref()
            .is_some_and(|url| url != existing.image_url);
    if image_changed {
        tracing::info!(
            drink_id = %id,
            old_url = %existing.image_url,
            new_url = %drink.image_url,
            "Image URL changed, removing stored images",
        );
        remove_stored_images(state.storage.as_deref(), id).await;
    }

    state.cache.flush();
    tracing::info!(drink_id = %id, admin = %admin.display_name, "Drink updated");

    Ok(Json(DataResponse { data: drink }))
}

/// DELETE /api/v1/admin/drinks/{id}
///
/// Deletes the drink and its stored images.
pub async fn delete_drink(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let drink = DrinkRepo::delete(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Drink",
            id,
        })?;

    remove_stored_images(state.storage.as_deref(), id).await;

    state.cache.flush();
    tracing::info!(drink_id = %id, name = %drink.name, admin = %admin.display_name, "Drink deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Best-effort removal of a drink's originals and optimized variants.
/// Never fails the request. Per-key outcomes are logged by
/// [`delete_drink_images`]; only an unreachable store is logged here.
async fn remove_stored_images(storage: Option<&dyn ObjectStorage>, drink_id: DbId) {
    let Some(storage) = storage else {
        return;
    };
    if let Err(e) = delete_drink_images(storage, drink_id).await {
        tracing::error!(%drink_id, error = %e, "Failed to delete drink images");
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use bartender_cloud::{DeleteReport, StorageError};

    use super::*;

    /// Storage whose deletes report every key as failed.
    struct StuckStorage;

    #[async_trait]
    impl ObjectStorage for StuckStorage {
        fn bucket(&self) -> &str {
            "stuck"
        }

        async fn put_object(
            &self,
            _key: &str,
            _body: Vec<u8>,
            _content_type: &str,
            _cache_control: Option<&str>,
        ) -> Result<(), StorageError> {
            Ok(())
        }

        async fn get_object(&self, key: &str) -> Result<Vec<u8>, StorageError> {
            Err(StorageError::NotFound(key.to_string()))
        }

        async fn list_keys(&self, _prefix: &str) -> Result<Vec<String>, StorageError> {
            Ok(Vec::new())
        }

        async fn delete_objects(&self, keys: &[String]) -> Result<DeleteReport, StorageError> {
            Ok(DeleteReport {
                deleted: Vec::new(),
                failed: keys
                    .iter()
                    .map(|k| (k.clone(), "AccessDenied".to_string()))
                    .collect(),
            })
        }

        async fn presign_put(
            &self,
            _key: &str,
            _content_type: &str,
            _expires_in: Duration,
        ) -> Result<String, StorageError> {
            Err(StorageError::InvalidRequest("read-only".into()))
        }
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn each_failed_image_key_is_logged_once() {
        let logs = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer({
                let logs = logs.clone();
                move || logs.clone()
            })
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let drink_id = DbId::new_v4();
        remove_stored_images(Some(&StuckStorage), drink_id).await;

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        let failures = output
            .lines()
            .filter(|line| line.contains("Failed to delete drink image"))
            .count();
        // One line per optimized variant, no originals listed.
        assert_eq!(failures, bartender_core::images::ImageSize::ALL.len());
    }

    #[tokio::test]
    async fn missing_storage_is_a_no_op() {
        remove_stored_images(None, DbId::new_v4()).await;
    }
}


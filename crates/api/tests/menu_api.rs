//! HTTP-level tests for the menu: public section and drink listings, admin
//! section and drink management, and the response cache.

mod common;

use axum::http::StatusCode;
use bartender_core::types::DbId;
use bartender_db::models::drink::{CreateDrink, Drink};
use bartender_db::models::section::{CreateSection, Section};
use bartender_db::repositories::{DrinkRepo, SectionRepo};
use common::{
    admin_token, body_json, delete_auth, get, get_auth, post_json, post_json_auth, put_json_auth,
    staff_token,
};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_section(pool: &PgPool, name: &str, display_order: i32) -> Section {
    SectionRepo::create(
        pool,
        &CreateSection {
            name: name.to_string(),
            display_order,
        },
    )
    .await
    .expect("section creation should succeed")
}

async fn seed_drink(pool: &PgPool, section_id: DbId, name: &str, is_active: bool) -> Drink {
    DrinkRepo::create(
        pool,
        &CreateDrink {
            section_id,
            name: name.to_string(),
            description: format!("A {name}"),
            ingredients: json!(["Gin", "Vermouth"]),
            recipe: Some(json!({ "steps": [{ "order": 1, "instruction": "Stir" }] })),
            image_url: String::new(),
            is_active,
        },
    )
    .await
    .expect("drink creation should succeed")
}

// ---------------------------------------------------------------------------
// Public listings
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_sections_are_ordered_by_display_order(pool: PgPool) {
    seed_section(&pool, "Sours", 2).await;
    seed_section(&pool, "Classics", 1).await;
    let app = common::build_test_app(pool);

    let response = get(app, "/api/v1/sections").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let names: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Classics", "Sours"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_public_drinks_hide_inactive_and_recipes(pool: PgPool) {
    let section = seed_section(&pool, "Classics", 1).await;
    seed_drink(&pool, section.id, "Negroni", true).await;
    seed_drink(&pool, section.id, "Martinez", false).await;
    let app = common::build_test_app(pool);

    let json = body_json(get(app, "/api/v1/drinks").await).await;
    let drinks = json["data"].as_array().unwrap();
    assert_eq!(drinks.len(), 1);
    assert_eq!(drinks[0]["name"], "Negroni");
    assert!(drinks[0].get("recipe").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_drinks_filter_by_section(pool: PgPool) {
    let classics = seed_section(&pool, "Classics", 1).await;
    let sours = seed_section(&pool, "Sours", 2).await;
    seed_drink(&pool, classics.id, "Negroni", true).await;
    seed_drink(&pool, sours.id, "Whiskey Sour", true).await;
    let app = common::build_test_app(pool);

    let uri = format!("/api/v1/drinks?section_id={}", sours.id);
    let json = body_json(get(app, &uri).await).await;
    let drinks = json["data"].as_array().unwrap();
    assert_eq!(drinks.len(), 1);
    assert_eq!(drinks[0]["name"], "Whiskey Sour");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_drink_includes_recipe(pool: PgPool) {
    let section = seed_section(&pool, "Classics", 1).await;
    let drink = seed_drink(&pool, section.id, "Negroni", true).await;
    let app = common::build_test_app(pool);

    let response = get(app, &format!("/api/v1/drinks/{}", drink.id)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["recipe"]["steps"][0]["instruction"], "Stir");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_inactive_drink_is_404(pool: PgPool) {
    let section = seed_section(&pool, "Classics", 1).await;
    let drink = seed_drink(&pool, section.id, "Martinez", false).await;
    let app = common::build_test_app(pool);

    let response = get(app, &format!("/api/v1/drinks/{}", drink.id)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Admin authentication
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_routes_require_token(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(app, "/api/v1/admin/sections", json!({ "name": "X" })).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_routes_reject_non_admin(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/admin/drinks", &staff_token()).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Admin role required");
}

// ---------------------------------------------------------------------------
// Admin sections
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_section_accepts_numeric_string_order(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/v1/admin/sections",
        &admin_token(),
        json!({ "name": "  Tiki ", "display_order": "3" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Tiki");
    assert_eq!(json["data"]["display_order"], 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_section_rejects_duplicate_order(pool: PgPool) {
    seed_section(&pool, "Classics", 1).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/v1/admin/sections",
        &admin_token(),
        json!({ "name": "Sours", "display_order": 1 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_section_requires_fields(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/v1/admin/sections",
        &admin_token(),
        json!({ "name": "Sours" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_section_without_fields_is_400(pool: PgPool) {
    let section = seed_section(&pool, "Classics", 1).await;
    let app = common::build_test_app(pool);

    let response = put_json_auth(
        app,
        &format!("/api/v1/admin/sections/{}", section.id),
        &admin_token(),
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "No fields to update");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_section_renames(pool: PgPool) {
    let section = seed_section(&pool, "Classics", 1).await;
    let app = common::build_test_app(pool);

    let response = put_json_auth(
        app,
        &format!("/api/v1/admin/sections/{}", section.id),
        &admin_token(),
        json!({ "name": "Old Fashioneds" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Old Fashioneds");
    assert_eq!(json["data"]["display_order"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_section_to_taken_order_is_conflict(pool: PgPool) {
    seed_section(&pool, "Classics", 1).await;
    let sours = seed_section(&pool, "Sours", 2).await;
    let app = common::build_test_app(pool.clone());

    let response = put_json_auth(
        app,
        &format!("/api/v1/admin/sections/{}", sours.id),
        &admin_token(),
        json!({ "display_order": 1 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");
    assert_eq!(json["error"], "A section with this display order already exists");

    let unchanged = SectionRepo::find_by_id(&pool, sours.id).await.unwrap().unwrap();
    assert_eq!(unchanged.display_order, 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_section_with_drinks_is_conflict(pool: PgPool) {
    let section = seed_section(&pool, "Classics", 1).await;
    seed_drink(&pool, section.id, "Negroni", true).await;
    seed_drink(&pool, section.id, "Martinez", false).await;
    let app = common::build_test_app(pool);

    let response = delete_auth(
        app,
        &format!("/api/v1/admin/sections/{}", section.id),
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let json = body_json(response).await;
    assert_eq!(json["code"], "SECTION_NOT_EMPTY");
    assert_eq!(json["drink_count"], 2);
    assert_eq!(json["section_name"], "Classics");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_empty_section(pool: PgPool) {
    let section = seed_section(&pool, "Classics", 1).await;
    let app = common::build_test_app(pool.clone());

    let response = delete_auth(
        app,
        &format!("/api/v1/admin/sections/{}", section.id),
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(SectionRepo::find_by_id(&pool, section.id).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Admin drinks
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_drink_applies_defaults(pool: PgPool) {
    let section = seed_section(&pool, "Classics", 1).await;
    let test_app = common::spawn_app(pool);
    let mut events = test_app.state.event_bus.subscribe();

    let response = post_json_auth(
        test_app.router,
        "/api/v1/admin/drinks",
        &admin_token(),
        json!({ "name": "Gimlet", "section_id": section.id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["description"], "");
    assert_eq!(json["data"]["ingredients"], json!([]));
    assert_eq!(json["data"]["image_url"], "");
    assert_eq!(json["data"]["is_active"], true);
    assert!(json["data"]["recipe"].is_null());

    let event = events.try_recv().expect("DRINK_CREATED should be published");
    assert_eq!(event.kind.as_str(), "DRINK_CREATED");
    assert_eq!(event.payload["name"], "Gimlet");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_drink_stores_empty_recipe_as_null(pool: PgPool) {
    let section = seed_section(&pool, "Classics", 1).await;
    let app = common::build_test_app(pool.clone());

    let response = post_json_auth(
        app,
        "/api/v1/admin/drinks",
        &admin_token(),
        json!({ "name": "Gimlet", "section_id": section.id, "recipe": {} }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert!(json["data"]["recipe"].is_null());

    let stored: Option<serde_json::Value> =
        sqlx::query_scalar("SELECT recipe FROM drinks WHERE name = 'Gimlet'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(stored.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_drink_accepts_double_encoded_body(pool: PgPool) {
    let section = seed_section(&pool, "Classics", 1).await;
    let app = common::build_test_app(pool);

    let inner = json!({
        "name": "Negroni",
        "section_id": section.id,
        "recipe": r#"{"ingredients":[{"name":"Gin","amount":"3 cl"}]}"#,
    });
    let response = post_json_auth(
        app,
        "/api/v1/admin/drinks",
        &admin_token(),
        serde_json::Value::String(inner.to_string()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["recipe"]["ingredients"][0]["amount"], "3 cl");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_drink_validates_recipe(pool: PgPool) {
    let section = seed_section(&pool, "Classics", 1).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/v1/admin/drinks",
        &admin_token(),
        json!({
            "name": "Negroni",
            "section_id": section.id,
            "recipe": { "steps": [{ "instruction": "Stir" }] },
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().starts_with("Invalid recipe:"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_drink_unknown_section_is_404(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/v1/admin/drinks",
        &admin_token(),
        json!({ "name": "Negroni", "section_id": DbId::new_v4() }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_list_includes_inactive_with_section_name(pool: PgPool) {
    let section = seed_section(&pool, "Classics", 1).await;
    seed_drink(&pool, section.id, "Negroni", true).await;
    seed_drink(&pool, section.id, "Martinez", false).await;
    let app = common::build_test_app(pool);

    let json = body_json(get_auth(app.clone(), "/api/v1/admin/drinks", &admin_token()).await).await;
    let drinks = json["data"].as_array().unwrap();
    assert_eq!(drinks.len(), 2);
    assert!(drinks.iter().all(|d| d["section_name"] == "Classics"));

    let json = body_json(
        get_auth(
            app,
            "/api/v1/admin/drinks?include_inactive=false",
            &admin_token(),
        )
        .await,
    )
    .await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_list_treats_non_true_flag_as_false(pool: PgPool) {
    let section = seed_section(&pool, "Classics", 1).await;
    seed_drink(&pool, section.id, "Negroni", true).await;
    seed_drink(&pool, section.id, "Martinez", false).await;
    let app = common::build_test_app(pool);

    for flag in ["False", "0"] {
        let response = get_auth(
            app.clone(),
            &format!("/api/v1/admin/drinks?include_inactive={flag}"),
            &admin_token(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"].as_array().unwrap().len(), 1);
    }

    let json = body_json(
        get_auth(app, "/api/v1/admin/drinks?include_inactive=TRUE", &admin_token()).await,
    )
    .await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_drink_clears_recipe_with_null(pool: PgPool) {
    let section = seed_section(&pool, "Classics", 1).await;
    let drink = seed_drink(&pool, section.id, "Negroni", true).await;
    let app = common::build_test_app(pool);

    let response = put_json_auth(
        app,
        &format!("/api/v1/admin/drinks/{}", drink.id),
        &admin_token(),
        json!({ "recipe": null, "description": "Bitter" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["data"]["recipe"].is_null());
    assert_eq!(json["data"]["description"], "Bitter");
    assert_eq!(json["data"]["name"], "Negroni");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_drink_unknown_section_is_404(pool: PgPool) {
    let section = seed_section(&pool, "Classics", 1).await;
    let drink = seed_drink(&pool, section.id, "Negroni", true).await;
    let app = common::build_test_app(pool);

    let response = put_json_auth(
        app,
        &format!("/api/v1/admin/drinks/{}", drink.id),
        &admin_token(),
        json!({ "section_id": DbId::new_v4() }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_changing_image_url_removes_stored_images(pool: PgPool) {
    let section = seed_section(&pool, "Classics", 1).await;
    let drink = seed_drink(&pool, section.id, "Negroni", true).await;
    DrinkRepo::set_image_url(&pool, drink.id, "https://cdn.test/old.webp")
        .await
        .unwrap();

    let test_app = common::spawn_app(pool);
    let original = format!("original/{}/image.jpg", drink.id);
    let medium = format!("images/optimized/medium/{}.webp", drink.id);
    for key in [&original, &medium] {
        bartender_cloud::ObjectStorage::put_object(
            test_app.storage.as_ref(),
            key,
            vec![1, 2, 3],
            "image/jpeg",
            None,
        )
        .await
        .unwrap();
    }

    let response = put_json_auth(
        test_app.router,
        &format!("/api/v1/admin/drinks/{}", drink.id),
        &admin_token(),
        json!({ "image_url": "" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(test_app.storage.keys().await.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_drink(pool: PgPool) {
    let section = seed_section(&pool, "Classics", 1).await;
    let drink = seed_drink(&pool, section.id, "Negroni", true).await;
    let app = common::build_test_app(pool);
    let uri = format!("/api/v1/admin/drinks/{}", drink.id);

    let response = delete_auth(app.clone(), &uri, &admin_token()).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete_auth(app, &uri, &admin_token()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Response cache
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_public_listing_is_cached_until_admin_change(pool: PgPool) {
    let section = seed_section(&pool, "Classics", 1).await;
    seed_drink(&pool, section.id, "Negroni", true).await;
    let app = common::build_test_app(pool.clone());

    let json = body_json(get(app.clone(), "/api/v1/drinks").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    // A write behind the API's back is not visible while cached.
    seed_drink(&pool, section.id, "Boulevardier", true).await;
    let json = body_json(get(app.clone(), "/api/v1/drinks").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    // Any admin mutation flushes.
    let response = post_json_auth(
        app.clone(),
        "/api/v1/admin/drinks",
        &admin_token(),
        json!({ "name": "Americano", "section_id": section.id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(get(app, "/api/v1/drinks").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 3);
}

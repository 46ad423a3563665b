//! HTTP-level tests for guest orders and the admin order queue.

mod common;

use axum::http::StatusCode;
use bartender_core::order::OrderStatus;
use bartender_core::types::DbId;
use bartender_db::models::drink::{CreateDrink, Drink};
use bartender_db::models::section::CreateSection;
use bartender_db::repositories::{DrinkRepo, OrderRepo, SectionRepo};
use common::{
    admin_token, body_json, get, get_auth, post_json_auth, put_json_auth, user_token,
};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_guest(pool: &PgPool, username: &str) -> (DbId, String) {
    let user_key: DbId =
        sqlx::query_scalar("INSERT INTO app_users (username) VALUES ($1) RETURNING user_key")
            .bind(username)
            .fetch_one(pool)
            .await
            .expect("user insert should succeed");
    (user_key, user_token(user_key, username))
}

async fn seed_drink(pool: &PgPool, name: &str, is_active: bool) -> Drink {
    let section = match SectionRepo::list(pool).await.unwrap().into_iter().next() {
        Some(section) => section,
        None => SectionRepo::create(
            pool,
            &CreateSection {
                name: "Classics".into(),
                display_order: 1,
            },
        )
        .await
        .unwrap(),
    };
    DrinkRepo::create(
        pool,
        &CreateDrink {
            section_id: section.id,
            name: name.to_string(),
            description: String::new(),
            ingredients: json!([]),
            recipe: None,
            image_url: format!("https://cdn.test/{name}.webp"),
            is_active,
        },
    )
    .await
    .expect("drink creation should succeed")
}

// ---------------------------------------------------------------------------
// Guest orders
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_orders_require_guest_token(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app.clone(), "/api/v1/orders").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Authentication required");

    let response = get_auth(app, "/api/v1/orders", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid or expired token");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_place_order_embeds_drink_and_publishes(pool: PgPool) {
    let drink = seed_drink(&pool, "Negroni", true).await;
    let (user_key, token) = seed_guest(&pool, "alice").await;
    let test_app = common::spawn_app(pool);
    let mut events = test_app.state.event_bus.subscribe();

    let response = post_json_auth(
        test_app.router,
        "/api/v1/orders",
        &token,
        json!({ "drink_id": drink.id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "pending");
    assert_eq!(json["data"]["drink"]["name"], "Negroni");
    assert_eq!(json["data"]["drink"]["image_url"], "https://cdn.test/Negroni.webp");

    let event = events.try_recv().expect("ORDER_CREATED should be published");
    assert_eq!(event.kind.as_str(), "ORDER_CREATED");
    assert_eq!(event.user_key, Some(user_key));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_second_active_order_is_conflict(pool: PgPool) {
    let negroni = seed_drink(&pool, "Negroni", true).await;
    let sour = seed_drink(&pool, "Sour", true).await;
    let (_, token) = seed_guest(&pool, "alice").await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app.clone(),
        "/api/v1/orders",
        &token,
        json!({ "drink_id": negroni.id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json_auth(app, "/api/v1/orders", &token, json!({ "drink_id": sour.id })).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["error"], "You already have an active order");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_orders_for_one_guest_admit_exactly_one(pool: PgPool) {
    let negroni = seed_drink(&pool, "Negroni", true).await;
    let sour = seed_drink(&pool, "Sour", true).await;
    let (user_key, token) = seed_guest(&pool, "alice").await;
    let app = common::build_test_app(pool.clone());

    let (first, second) = tokio::join!(
        post_json_auth(
            app.clone(),
            "/api/v1/orders",
            &token,
            json!({ "drink_id": negroni.id }),
        ),
        post_json_auth(app, "/api/v1/orders", &token, json!({ "drink_id": sour.id })),
    );

    let mut statuses = vec![first.status(), second.status()];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::CONFLICT]);

    let active: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM orders WHERE user_key = $1 AND status IN ('pending', 'in_progress')",
    )
    .bind(user_key)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(active, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_order_for_inactive_drink_is_404(pool: PgPool) {
    let drink = seed_drink(&pool, "Martinez", false).await;
    let (_, token) = seed_guest(&pool, "alice").await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(app, "/api/v1/orders", &token, json!({ "drink_id": drink.id })).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_order_requires_drink_id(pool: PgPool) {
    let (_, token) = seed_guest(&pool, "alice").await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(app, "/api/v1/orders", &token, json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_my_orders_hide_completed_unless_asked(pool: PgPool) {
    let drink = seed_drink(&pool, "Negroni", true).await;
    let (user_key, token) = seed_guest(&pool, "alice").await;
    let first = OrderRepo::create(&pool, drink.id, user_key).await.unwrap();
    OrderRepo::update_status(&pool, first.id, OrderStatus::Completed)
        .await
        .unwrap();
    OrderRepo::create(&pool, drink.id, user_key).await.unwrap();
    let app = common::build_test_app(pool);

    let json = body_json(get_auth(app.clone(), "/api/v1/orders", &token).await).await;
    let orders = json["data"].as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["status"], "pending");

    let json = body_json(
        get_auth(app, "/api/v1/orders?include_completed=true", &token).await,
    )
    .await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_other_users_order_is_forbidden(pool: PgPool) {
    let drink = seed_drink(&pool, "Negroni", true).await;
    let (alice, alice_token) = seed_guest(&pool, "alice").await;
    let (_, bob_token) = seed_guest(&pool, "bob").await;
    let order = OrderRepo::create(&pool, drink.id, alice).await.unwrap();
    let app = common::build_test_app(pool);
    let uri = format!("/api/v1/orders/{}", order.id);

    let response = get_auth(app.clone(), &uri, &alice_token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(app.clone(), &uri, &bob_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["error"], "You do not have permission to view this order");

    let response = get_auth(app, &format!("/api/v1/orders/{}", DbId::new_v4()), &bob_token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Admin queue
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_queue_lists_in_progress_then_limited_pending(pool: PgPool) {
    let drink = seed_drink(&pool, "Negroni", true).await;
    let mut orders = Vec::new();
    for name in ["ann", "ben", "cid", "dot"] {
        let (user_key, _) = seed_guest(&pool, name).await;
        orders.push(OrderRepo::create(&pool, drink.id, user_key).await.unwrap());
    }
    OrderRepo::update_status(&pool, orders[3].id, OrderStatus::InProgress)
        .await
        .unwrap();
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/admin/orders?pending_limit=2", &admin_token()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 3);
    assert_eq!(data[0]["id"], json!(orders[3].id));
    assert_eq!(data[0]["status"], "in_progress");
    assert_eq!(data[1]["id"], json!(orders[0].id));
    assert_eq!(data[2]["id"], json!(orders[1].id));
    assert_eq!(data[1]["username"], "ann");

    assert_eq!(json["metadata"]["pending_count"], 3);
    assert_eq!(json["metadata"]["in_progress_count"], 1);
    assert_eq!(json["metadata"]["completed_24h_count"], 0);
    assert_eq!(json["metadata"]["pending_returned"], 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_queue_ignores_non_numeric_limit(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/admin/orders?pending_limit=lots", &admin_token()).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_complete_order_publishes_completion(pool: PgPool) {
    let drink = seed_drink(&pool, "Negroni", true).await;
    let (user_key, _) = seed_guest(&pool, "alice").await;
    let order = OrderRepo::create(&pool, drink.id, user_key).await.unwrap();
    let test_app = common::spawn_app(pool);
    let mut events = test_app.state.event_bus.subscribe();

    let response = put_json_auth(
        test_app.router,
        &format!("/api/v1/admin/orders/{}", order.id),
        &admin_token(),
        json!({ "status": "completed" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "completed");
    assert!(json["data"]["completed_at"].is_string());

    let event = events.try_recv().expect("ORDER_COMPLETED should be published");
    assert_eq!(event.kind.as_str(), "ORDER_COMPLETED");
    assert_eq!(event.payload["previous_status"], "pending");
    assert_eq!(event.user_key, Some(user_key));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_status_is_rejected(pool: PgPool) {
    let drink = seed_drink(&pool, "Negroni", true).await;
    let (user_key, _) = seed_guest(&pool, "alice").await;
    let order = OrderRepo::create(&pool, drink.id, user_key).await.unwrap();
    let app = common::build_test_app(pool);

    let response = put_json_auth(
        app,
        &format!("/api/v1/admin/orders/{}", order.id),
        &admin_token(),
        json!({ "status": "served" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().starts_with("Invalid status"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_status_update_for_missing_order_is_404(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = put_json_auth(
        app,
        &format!("/api/v1/admin/orders/{}", DbId::new_v4()),
        &admin_token(),
        json!({ "status": "cancelled" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reopening_order_for_guest_with_active_order_is_conflict(pool: PgPool) {
    let negroni = seed_drink(&pool, "Negroni", true).await;
    let sour = seed_drink(&pool, "Sour", true).await;
    let (user_key, _) = seed_guest(&pool, "alice").await;
    let served = OrderRepo::create(&pool, negroni.id, user_key).await.unwrap();
    OrderRepo::update_status(&pool, served.id, OrderStatus::Completed)
        .await
        .unwrap();
    let active = OrderRepo::create(&pool, sour.id, user_key).await.unwrap();
    let app = common::build_test_app(pool.clone());

    let response = put_json_auth(
        app,
        &format!("/api/v1/admin/orders/{}", served.id),
        &admin_token(),
        json!({ "status": "pending" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["error"], "This guest already has another active order");
    assert_eq!(json["code"], "CONFLICT");

    let still_active = OrderRepo::find_with_drink(&pool, active.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(still_active.status, OrderStatus::Pending);
}

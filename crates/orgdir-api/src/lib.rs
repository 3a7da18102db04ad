//! JSON REST API for the organization directory.
//!
//! Exposes an axum [`Router`] backed by any
//! [`orgdir_core::store::DirectoryStore`]. Every route requires the
//! `X-API-Token` header; TLS and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", orgdir_api::api_router(index, ApiToken::new(&secret)))
//! ```

pub mod activities;
pub mod auth;
pub mod buildings;
pub mod error;
pub mod extract;
pub mod organizations;

use std::sync::Arc;

use axum::{Router, middleware, routing::get};
use orgdir_core::{index::OrganizationIndex, store::DirectoryStore};

pub use auth::ApiToken;
pub use error::ApiError;

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub index: OrganizationIndex<S>,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self { Self { index: self.index.clone() } }
}

/// Build a fully-materialised API router over `index`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(index: OrganizationIndex<S>, token: ApiToken) -> Router<()>
where
  S: DirectoryStore + 'static,
{
  Router::new()
    // Activities
    .route("/activities", get(activities::list::<S>).post(activities::create::<S>))
    .route("/activities/{id}", get(activities::get_one::<S>))
    // Buildings
    .route("/buildings", get(buildings::list::<S>).post(buildings::create::<S>))
    .route("/buildings/{id}", get(buildings::get_one::<S>))
    // Organizations
    .route(
      "/organizations",
      get(organizations::list::<S>).post(organizations::create::<S>),
    )
    .route("/organizations/{id}", get(organizations::get_one::<S>))
    .route(
      "/organizations/by-building/{id}",
      get(organizations::by_building::<S>),
    )
    .route(
      "/organizations/by-activity/{id}",
      get(organizations::by_activity::<S>),
    )
    .route("/organizations/by-radius", get(organizations::by_radius::<S>))
    .layer(middleware::from_fn_with_state(Arc::new(token), auth::require_token))
    .with_state(ApiState { index })
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
  };
  use orgdir_core::index::{EmptyResultPolicy, IndexOptions};
  use orgdir_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::*;

  const TOKEN: &str = "test-token";

  async fn app_with(options: IndexOptions) -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let index = OrganizationIndex::new(Arc::new(store), options);
    api_router(index, ApiToken::new(TOKEN))
  }

  async fn app() -> Router { app_with(IndexOptions::default()).await }

  async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder()
      .method(method)
      .uri(uri)
      .header(auth::TOKEN_HEADER, TOKEN);
    let body = match body {
      Some(v) => {
        builder = builder.header("content-type", "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let resp = app
      .clone()
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
  }

  async fn create(app: &Router, uri: &str, body: Value) -> Value {
    let (status, value) = call(app, "POST", uri, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{uri}: {value}");
    value
  }

  fn id(v: &Value) -> &str { v["id"].as_str().unwrap() }

  // ── Auth ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn missing_token_is_401() {
    let app = app().await;
    let req = Request::builder()
      .uri("/activities")
      .body(Body::empty())
      .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({ "error": "invalid token" }));
  }

  #[tokio::test]
  async fn wrong_token_is_401() {
    let app = app().await;
    let req = Request::builder()
      .uri("/organizations")
      .header(auth::TOKEN_HEADER, "nope")
      .body(Body::empty())
      .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  // ── Activities ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn activity_depth_is_enforced() {
    let app = app().await;
    let food = create(&app, "/activities", json!({ "name": "Food" })).await;
    let meat = create(
      &app,
      "/activities",
      json!({ "name": "Meat", "parent_id": id(&food) }),
    )
    .await;
    let poultry = create(
      &app,
      "/activities",
      json!({ "name": "Poultry", "parent_id": id(&meat) }),
    )
    .await;

    let (status, body) = call(
      &app,
      "POST",
      "/activities",
      Some(json!({ "name": "Chicken", "parent_id": id(&poultry) })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("depth"));

    let (status, list) = call(&app, "GET", "/activities", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 3);
  }

  #[tokio::test]
  async fn unknown_ids_are_404() {
    let app = app().await;
    let missing = uuid::Uuid::new_v4();
    for uri in [
      format!("/activities/{missing}"),
      format!("/buildings/{missing}"),
      format!("/organizations/{missing}"),
    ] {
      let (status, body) = call(&app, "GET", &uri, None).await;
      assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
      assert!(body["error"].is_string());
    }
  }

  // ── Buildings ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn building_coordinates_are_validated() {
    let app = app().await;
    let (status, _) = call(
      &app,
      "POST",
      "/buildings",
      Some(json!({ "address": "Nowhere", "latitude": 91.0, "longitude": 0.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let b = create(
      &app,
      "/buildings",
      json!({ "address": "Red Square", "latitude": 55.7558, "longitude": 37.6176 }),
    )
    .await;
    let (status, fetched) = call(&app, "GET", &format!("/buildings/{}", id(&b)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["address"], "Red Square");
  }

  // ── Organizations ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn organization_facets() {
    let app = app().await;
    let food = create(&app, "/activities", json!({ "name": "Food" })).await;
    let meat = create(
      &app,
      "/activities",
      json!({ "name": "Meat", "parent_id": id(&food) }),
    )
    .await;
    let b = create(
      &app,
      "/buildings",
      json!({ "address": "Red Square", "latitude": 55.7558, "longitude": 37.6176 }),
    )
    .await;
    let shop = create(
      &app,
      "/organizations",
      json!({
        "name": "ShopA",
        "building_id": id(&b),
        "phone_numbers": ["2-222-222"],
        "activity_ids": [id(&meat)],
      }),
    )
    .await;
    assert_eq!(shop["phones"][0]["phone"], "2-222-222");

    let (status, list) = call(
      &app,
      "GET",
      &format!("/organizations/by-activity/{}?with_children=true", id(&food)),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list[0]["name"], "ShopA");

    let (status, _) = call(
      &app,
      "GET",
      &format!("/organizations/by-activity/{}", id(&food)),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, list) = call(
      &app,
      "GET",
      &format!("/organizations/by-building/{}", id(&b)),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, list) = call(
      &app,
      "GET",
      "/organizations/by-radius?latitude=55.7558&longitude=37.6176&radius_km=1",
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list[0]["name"], "ShopA");

    let (status, _) = call(
      &app,
      "GET",
      "/organizations/by-radius?latitude=60.25&longitude=37.6176&radius_km=1",
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
      &app,
      "GET",
      "/organizations/by-radius?latitude=55.7558&longitude=37.6176&radius_km=0",
      None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, list) = call(&app, "GET", "/organizations?name=shop", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, list) = call(&app, "GET", "/organizations?name=bakery", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(list.as_array().unwrap().is_empty());
  }

  // ── Malformed requests ──────────────────────────────────────────────────────

  async fn assert_json_400(app: &Router, method: &str, uri: &str, body: Option<Value>) {
    let (status, value) = call(app, method, uri, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}: {value}");
    assert!(value["error"].is_string(), "{uri}: {value}");
  }

  #[tokio::test]
  async fn unparseable_path_id_is_json_400() {
    let app = app().await;
    assert_json_400(&app, "GET", "/organizations/not-a-uuid", None).await;
    assert_json_400(&app, "GET", "/activities/42", None).await;
    assert_json_400(&app, "GET", "/organizations/by-building/xyz", None).await;
  }

  #[tokio::test]
  async fn unparseable_query_is_json_400() {
    let app = app().await;
    assert_json_400(
      &app,
      "GET",
      "/organizations/by-radius?latitude=abc&longitude=37.6&radius_km=1",
      None,
    )
    .await;
    assert_json_400(&app, "GET", "/organizations/by-radius?latitude=55.7", None).await;
  }

  #[tokio::test]
  async fn malformed_bodies_are_json_400() {
    let app = app().await;
    assert_json_400(&app, "POST", "/activities", Some(json!({ "parent_id": null }))).await;
    assert_json_400(
      &app,
      "POST",
      "/organizations",
      Some(json!({ "building_id": "00000000-0000-0000-0000-000000000000" })),
    )
    .await;
    assert_json_400(
      &app,
      "POST",
      "/buildings",
      Some(json!({ "address": "Red Square", "latitude": "north" })),
    )
    .await;

    let req = Request::builder()
      .method("POST")
      .uri("/activities")
      .header(auth::TOKEN_HEADER, TOKEN)
      .header("content-type", "application/json")
      .body(Body::from("{not json"))
      .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn lenient_policy_returns_empty_lists() {
    let app = app_with(IndexOptions {
      empty_results: EmptyResultPolicy::lenient(),
      ..IndexOptions::default()
    })
    .await;
    let missing = uuid::Uuid::new_v4();
    let (status, list) = call(
      &app,
      "GET",
      &format!("/organizations/by-building/{missing}"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([]));
  }

  #[tokio::test]
  async fn organization_validation_errors_are_400() {
    let app = app().await;
    let b = create(
      &app,
      "/buildings",
      json!({ "address": "Red Square", "latitude": 55.7558, "longitude": 37.6176 }),
    )
    .await;

    let (status, _) = call(
      &app,
      "POST",
      "/organizations",
      Some(json!({
        "name": "Bad Phone",
        "building_id": id(&b),
        "phone_numbers": ["call me"],
      })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
      &app,
      "POST",
      "/organizations",
      Some(json!({ "name": "Homeless", "building_id": uuid::Uuid::new_v4() })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }
}

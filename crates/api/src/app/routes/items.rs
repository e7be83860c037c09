use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use pricelens_core::ItemId;
use pricelens_infra::PageRequest;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_item).get(list_items))
        .route("/:id", get(get_item).put(update_item).delete(delete_item))
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::ItemRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::rejection_to_response(rejection),
    };

    match services.items.create(body.into(), Utc::now()).await {
        Ok(item) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "id": item.id.get(),
                "message": "item created",
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::ListItemsQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(rejection) => return errors::rejection_to_response(rejection),
    };

    let request = match PageRequest::new(query.page, query.size) {
        Ok(r) => r,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.items.list(request).await {
        Ok(page) => Json(dto::item_page_to_json(&page)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match id.parse::<ItemId>() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.items.get(id).await {
        Ok(item) => Json(dto::item_to_json(&item)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::ItemRequest>, JsonRejection>,
) -> axum::response::Response {
    let id = match id.parse::<ItemId>() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::rejection_to_response(rejection),
    };

    match services.items.update(id, body.into(), Utc::now()).await {
        Ok(item) => Json(dto::item_to_json(&item)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match id.parse::<ItemId>() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.items.delete(id).await {
        Ok(()) => Json(serde_json::json!({
            "id": id.get(),
            "message": "item deleted",
        }))
        .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

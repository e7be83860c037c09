use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/lowest-by-category", get(lowest_by_category))
        .route("/lowest-brand", get(lowest_brand))
        .route("/lowest-highest", get(lowest_highest))
}

pub async fn categories(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.prices.categories().await {
        Ok(categories) => Json(serde_json::json!({ "categories": categories })).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn lowest_by_category(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.prices.cheapest_per_category().await {
        Ok(result) => Json(dto::cheapest_per_category_to_json(&result)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn lowest_brand(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.prices.cheapest_full_coverage_brand().await {
        Ok(coverage) => Json(dto::lowest_brand_to_json(coverage.as_ref())).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn lowest_highest(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::CategoryQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(rejection) => return errors::rejection_to_response(rejection),
    };

    let Some(category) = query.category else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "category: query parameter is required",
        );
    };

    match services.prices.category_min_max(&category).await {
        Ok(range) => Json(dto::price_range_to_json(&range)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

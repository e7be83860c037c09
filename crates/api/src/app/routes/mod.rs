use axum::{routing::get, Router};

pub mod items;
pub mod prices;
pub mod system;

/// Router for every catalog endpoint.
pub fn router() -> Router {
    Router::new()
        .route("/categories", get(prices::categories))
        .nest("/prices", prices::router())
        .nest("/items", items::router())
}

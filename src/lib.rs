use axum::{Extension, Router};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod auth;
pub mod error;
pub mod models;
pub mod schema;
pub mod store;

use store::SharedStore;

pub fn app(store: SharedStore) -> Router {
    Router::new()
        .nest("/api", api::app())
        .layer(Extension(store))
        .layer(TraceLayer::new_for_http())
}

//! Route handlers

pub mod health;
pub mod task;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full REST application
pub fn app(state: AppState, cors: bool) -> Router {
    let app = Router::new()
        .merge(health::router())
        .merge(task::router())
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if cors {
        app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        app
    }
}

use axum::Router;

use crate::AppState;

mod auth;
mod error;
mod handlers;
mod routes;

pub use auth::Identity;
pub use error::AppError;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health())
        .merge(routes::users())
        .merge(routes::posts())
        .merge(routes::feed())
        .merge(routes::social())
        .merge(routes::dashboard())
        .merge(routes::assistant())
        .merge(routes::media(state.upload_max_bytes))
        .with_state(state)
}

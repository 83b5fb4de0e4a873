use axum::Router;

pub mod orders;
pub mod system;

/// All protected routes (identity middleware is layered on top in `build_app`).
pub fn router() -> Router {
    Router::new().merge(orders::router())
}

use axum::{
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use mesa_core::UserId;

use crate::context::CallerContext;

/// Header carrying the gateway-verified user id.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the gateway-verified role.
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Inject the `CallerContext` from the identity headers set by the gateway.
pub async fn identity_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let caller = caller_from_headers(req.headers())?;
    req.extensions_mut().insert(caller);
    Ok(next.run(req).await)
}

fn caller_from_headers(headers: &HeaderMap) -> Result<CallerContext, StatusCode> {
    let raw = headers
        .get(USER_ID_HEADER)
        .ok_or(StatusCode::UNAUTHORIZED)?
        .to_str()
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let user_id: UserId = raw.parse().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let admin = headers
        .get(USER_ROLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|role| role.eq_ignore_ascii_case("admin"))
        .unwrap_or(false);

    Ok(CallerContext::new(user_id, admin))
}

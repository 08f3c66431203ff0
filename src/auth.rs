use crate::{configuration::Configuration, error::BookingError};
use axum::{
    body::Body,
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::warn;

pub const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";

/// Exact, case-sensitive comparison against the configured secret.
pub fn is_admitted(credential: Option<&str>, secret: &str) -> bool {
    credential == Some(secret)
}

fn credential_from(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(ADMIN_PASSWORD_HEADER)
        .and_then(|value| value.to_str().ok())
}

/// Rejects the request before it reaches an admin handler.
pub async fn admin_auth<C: Configuration>(
    State(configuration): State<C>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, BookingError> {
    if !is_admitted(credential_from(request.headers()), &configuration.password()) {
        warn!(method = %request.method(), uri = %request.uri(), "Admin request rejected");
        return Err(BookingError::Auth);
    }
    Ok(next.run(request).await)
}

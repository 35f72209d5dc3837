//! Extractor for the authenticated user.

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{instrument, trace};

use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session,
    errors::{Error, Result},
};

/// Extract the user from the JWT session cookie if present and valid.
///
/// Returns:
/// - None: no session cookie present
/// - Some(Ok(user)): valid JWT found and verified
/// - Some(Err(error)): cookie header present but unreadable
fn try_jwt_session_auth(parts: &Parts, config: &crate::config::Config) -> Option<Result<CurrentUser>> {
    let cookie_header = parts.headers.get(axum::http::header::COOKIE)?;

    let cookie_str = match cookie_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::Validation {
                message: format!("Invalid cookie header: {e}"),
                details: vec![],
            }));
        }
    };
    let cookie_name = &config.auth.session.cookie_name;

    for cookie in cookie_str.split(';') {
        let cookie = cookie.trim();
        if let Some((name, value)) = cookie.split_once('=')
            && name == cookie_name
        {
            match session::verify_session_token(value, config) {
                Ok(user) => return Some(Ok(user)),
                // Expired or stale tokens are expected; keep scanning in case
                // another cookie under the same name verifies.
                Err(_) => continue,
            }
        }
    }
    None
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        match try_jwt_session_auth(parts, &state.config) {
            Some(Ok(user)) => {
                trace!("Found session-authenticated user: {}", user.id);
                Ok(user)
            }
            Some(Err(e)) => Err(e),
            None => Err(Error::Unauthenticated {
                message: Some("Authentication required".to_string()),
            }),
        }
    }
}

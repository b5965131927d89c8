//! Auth gate for the note routes.
//!
//! Every note request must carry an `authorization` header. Its raw value is
//! the caller's identity: it scopes `GET` listings and, in
//! [`AuthMode::AdminList`], must appear in the admin registry.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::AuthMode;
use crate::error::NoteError;
use crate::note_server::AppState;
use crate::validation::validate_identity;
use crate::IDENTITY_SHORT_LEN;

/// Identity of an authenticated request, inserted into request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity(pub String);

impl Identity {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Truncated form for log lines, cut at a character boundary
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(IDENTITY_SHORT_LEN) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

/// Check the identity against the configured auth mode.
pub(crate) fn authorize(state: &AppState, identity: &Identity) -> Result<(), NoteError> {
    match state.auth_mode() {
        AuthMode::Presence => Ok(()),
        AuthMode::AdminList => {
            if state.admins().is_admin(identity.as_str())? {
                Ok(())
            } else {
                tracing::warn!("Rejected identity {}... not in admin list", identity.short());
                Err(NoteError::Unauthorized)
            }
        }
    }
}

/// Middleware rejecting requests without a usable authorization header.
pub async fn auth_gate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .map(|v| v.as_bytes());

    let identity = match validate_identity(header_value) {
        Ok(identity) => Identity(identity),
        Err(e) => {
            let reason = match header_value {
                None => "missing",
                Some(_) => "empty",
            };
            tracing::warn!(
                "{} {} rejected: {} authorization",
                request.method(),
                request.uri().path(),
                reason
            );
            return e.into_response();
        }
    };

    if let Err(e) = authorize(&state, &identity) {
        return e.into_response();
    }

    request.extensions_mut().insert(identity);
    next.run(request).await
}

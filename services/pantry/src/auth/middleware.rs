//! Session resolution middleware.
//!
//! Looks for a session token in `Authorization: Bearer` or in the session
//! cookie, verifies it and attaches the resulting [`SessionContext`] to the
//! request. It never rejects: a request without a valid token simply reaches
//! the handler without a session, and the handler answers 401.
use crate::auth::session::SessionContext;
use crate::auth::token::SessionKeys;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct SessionResolver {
    pub keys: SessionKeys,
    pub cookie_name: String,
}

pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))?
        .trim();
    (!token.is_empty()).then_some(token)
}

pub fn extract_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

impl SessionResolver {
    pub fn resolve(&self, headers: &HeaderMap) -> Option<SessionContext> {
        let token =
            extract_bearer(headers).or_else(|| extract_cookie(headers, &self.cookie_name))?;
        match self.keys.verify(token) {
            Ok(claims) => Some(claims.into_session()),
            Err(err) => {
                tracing::debug!(error = %err, "rejected session token");
                None
            }
        }
    }
}

pub async fn attach_session(
    State(resolver): State<Arc<SessionResolver>>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(session) = resolver.resolve(request.headers()) {
        request.extensions_mut().insert(session);
    }
    next.run(request).await
}

//! Connects the route table to axum as a single fallback handler.

use std::sync::Arc;

use axum::{
    extract::{FromRef, Request, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};

use crate::{AppState, Error, router::RequestContext, routing::AppRouter};

/// Request bodies larger than this are rejected.
pub(crate) const MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

/// The state for [dispatch_request]: the app state and the route table.
#[derive(Debug, Clone)]
pub struct DispatchState {
    /// The shared application state.
    pub app: AppState,
    /// The routes, built once at startup.
    pub routes: Arc<AppRouter>,
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<DispatchState> for Key {
    fn from_ref(state: &DispatchState) -> Self {
        state.app.cookie_key.clone()
    }
}

/// Feed an axum request into the route table and turn the result into a response.
///
/// Cookie changes made by middleware or the handler, including the session,
/// are sent back with the response, even when the handler fails.
pub async fn dispatch_request(
    State(state): State<DispatchState>,
    jar: PrivateCookieJar,
    request: Request,
) -> Response {
    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, MAX_BODY_SIZE).await {
        Ok(body) => body,
        Err(error) => {
            tracing::warn!("Could not read request body: {error}");
            return Error::InvalidRequestBody(error.to_string()).into_response();
        }
    };

    let mut context = RequestContext::new(
        parts.method.clone(),
        &parts.uri,
        parts.headers,
        body,
        jar,
        state.app.clone(),
    );

    let response = match state
        .routes
        .dispatch(&parts.method, parts.uri.path(), &mut context)
    {
        Ok(response) => response,
        Err(error) => error.into_response(),
    };

    (context.into_cookie_jar(), response).into_response()
}

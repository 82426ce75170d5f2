use axum::{
    body::Bytes,
    http::{HeaderMap, HeaderValue, Method, Uri, header::CONTENT_TYPE},
};
use axum_extra::extract::PrivateCookieJar;
use rusqlite::Connection;

use crate::{
    AppState,
    auth::{Admin, PasswordHash, ValidatedPassword, create_admin},
    pagination::PaginationConfig,
    router::RequestContext,
};

/// An app state backed by a fresh in-memory database.
pub(crate) fn get_test_app_state() -> AppState {
    AppState::new(
        Connection::open_in_memory().expect("Could not open database in memory."),
        "foobar",
        PaginationConfig::default(),
    )
    .expect("Could not create app state.")
}

/// A request context with an empty cookie jar.
///
/// Bodies that start with `{` are sent as JSON, everything else has no content type.
#[track_caller]
pub(crate) fn request_context(
    state: &AppState,
    method: Method,
    uri: &str,
    body: &str,
) -> RequestContext {
    let uri: Uri = uri.parse().expect("Could not parse URI.");
    let mut headers = HeaderMap::new();

    if body.trim_start().starts_with('{') {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    RequestContext::new(
        method,
        &uri,
        headers,
        Bytes::copy_from_slice(body.as_bytes()),
        PrivateCookieJar::new(state.cookie_key.clone()),
        state.clone(),
    )
}

/// Store an admin with a cheaply hashed password.
#[track_caller]
pub(crate) fn create_test_admin(state: &AppState, username: &str, password: &str) -> Admin {
    let password_hash = PasswordHash::new(ValidatedPassword::new_unchecked(password), 4)
        .expect("Could not hash password.");
    let connection = state.db_connection.lock().unwrap();

    create_admin(username, password_hash, &connection).expect("Could not create test admin.")
}

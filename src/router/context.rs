//! The per-request value passed through middleware and handlers.

use std::sync::MutexGuard;

use axum::{
    body::Bytes,
    http::{HeaderMap, Method, Uri, header::CONTENT_TYPE},
};
use axum_extra::extract::PrivateCookieJar;
use rusqlite::Connection;
use serde::de::DeserializeOwned;

use crate::{AppState, Error, auth::Session};

/// Everything a handler may need to know about the request it is serving.
///
/// The session is loaded from the private cookie jar when the context is
/// created and is written back to the jar by [RequestContext::into_cookie_jar]
/// if a middleware or handler changed it.
#[derive(Debug)]
pub struct RequestContext {
    /// The HTTP method of the request.
    pub method: Method,
    /// The path of the request, without the query string.
    pub path: String,
    /// The raw query string, if any.
    pub query: Option<String>,
    /// The request headers.
    pub headers: HeaderMap,
    /// The full request body.
    pub body: Bytes,
    /// The admin session for the client.
    pub session: Session,
    /// The private cookies sent by the client, plus any changes to send back.
    pub cookies: PrivateCookieJar,
    /// The shared application state.
    pub state: AppState,
}

impl RequestContext {
    /// Build the context for a request and load its session.
    pub fn new(
        method: Method,
        uri: &Uri,
        headers: HeaderMap,
        body: Bytes,
        cookies: PrivateCookieJar,
        state: AppState,
    ) -> Self {
        let session = Session::from_cookies(&cookies);

        Self {
            method,
            path: uri.path().to_owned(),
            query: uri.query().map(str::to_owned),
            headers,
            body,
            session,
            cookies,
            state,
        }
    }

    /// Parse the request body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidRequestBody] if the body is not valid JSON for `T`.
    pub fn json_body<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_json::from_slice(&self.body).map_err(|error| {
            tracing::debug!("Could not parse JSON body for {}: {error}", self.path);
            Error::InvalidRequestBody(error.to_string())
        })
    }

    /// Parse the request body as a URL encoded form.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidRequestBody] if the body is not a valid form for `T`.
    pub fn form_body<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_urlencoded::from_bytes(&self.body).map_err(|error| {
            tracing::debug!("Could not parse form body for {}: {error}", self.path);
            Error::InvalidRequestBody(error.to_string())
        })
    }

    /// Parse the request body as JSON or as a form, based on the content type.
    ///
    /// Bodies without a form content type are treated as JSON.
    pub fn body<T: DeserializeOwned>(&self) -> Result<T, Error> {
        let is_form = self
            .headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            self.form_body()
        } else {
            self.json_body()
        }
    }

    /// Parse the query string, treating a missing query string as empty.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidRequestBody] if the query string is not valid for `T`.
    pub fn query_params<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_urlencoded::from_str(self.query.as_deref().unwrap_or_default())
            .map_err(|error| Error::InvalidRequestBody(error.to_string()))
    }

    /// Lock the database connection.
    ///
    /// # Errors
    ///
    /// Returns [Error::DatabaseLockError] if the lock is poisoned.
    pub fn db_connection(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.state.db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })
    }

    /// Consume the context, returning the cookie jar with the session saved if it changed.
    pub fn into_cookie_jar(self) -> PrivateCookieJar {
        self.session.save(self.cookies)
    }
}

#[cfg(test)]
mod request_context_tests {
    use axum::{
        body::Bytes,
        http::{HeaderMap, HeaderValue, Method, Uri, header::CONTENT_TYPE},
    };
    use axum_extra::extract::PrivateCookieJar;
    use rusqlite::Connection;
    use serde::Deserialize;

    use crate::{AppState, Error, pagination::PaginationConfig, router::RequestContext};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Body {
        id: i64,
    }

    fn context(uri: &str, headers: HeaderMap, body: &'static str) -> RequestContext {
        let state = AppState::new(
            Connection::open_in_memory().unwrap(),
            "foobar",
            PaginationConfig::default(),
        )
        .unwrap();
        let jar = PrivateCookieJar::new(state.cookie_key.clone());
        let uri: Uri = uri.parse().unwrap();

        RequestContext::new(
            Method::POST,
            &uri,
            headers,
            Bytes::from_static(body.as_bytes()),
            jar,
            state,
        )
    }

    #[test]
    fn splits_path_and_query() {
        let context = context("/listProducts?page=2&sort=desc", HeaderMap::new(), "");

        assert_eq!(context.path, "/listProducts");
        assert_eq!(context.query.as_deref(), Some("page=2&sort=desc"));
    }

    #[test]
    fn parses_json_body() {
        let context = context("/deleteCategory", HeaderMap::new(), r#"{"id": 3}"#);

        assert_eq!(context.body::<Body>(), Ok(Body { id: 3 }));
    }

    #[test]
    fn parses_form_body() {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        let context = context("/deleteCategory", headers, "id=4");

        assert_eq!(context.body::<Body>(), Ok(Body { id: 4 }));
    }

    #[test]
    fn invalid_json_is_invalid_request_body() {
        let context = context("/deleteCategory", HeaderMap::new(), "{");

        assert!(matches!(
            context.json_body::<Body>(),
            Err(Error::InvalidRequestBody(_))
        ));
    }

    #[test]
    fn missing_query_parses_as_empty() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Query {
            page: Option<u64>,
        }

        let context = context("/listProducts", HeaderMap::new(), "");

        assert_eq!(context.query_params::<Query>(), Ok(Query { page: None }));
    }
}

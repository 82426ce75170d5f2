//! Defines the app level error type, its taxonomy, and conversions to HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;

use crate::{category::CategoryId, endpoints, error_page::ErrorPage, product::ProductId};

/// The broad class of an [Error], used to decide how it is reported to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing input, e.g. a duplicate code or a missing category.
    Validation,
    /// The request is valid but conflicts with the current state of the data.
    Conflict,
    /// No registered route matches the request.
    RouteNotFound,
    /// The client is not logged in.
    Authentication,
    /// The client is not allowed to perform the request.
    Authorization,
    /// Anything else. Details are logged and never shown to the client.
    Internal,
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The category code is already used by another category.
    #[error("the category code \"{0}\" already exists")]
    DuplicateCategoryCode(String),

    /// An empty string was used as a category code.
    #[error("category code cannot be empty")]
    EmptyCategoryCode,

    /// An empty string was used as a category title.
    #[error("category title cannot be empty")]
    EmptyCategoryTitle,

    /// The category ID does not refer to a stored category.
    #[error("category {0} could not be found")]
    CategoryNotFound(CategoryId),

    /// Tried to make a category the parent of itself.
    #[error("category {0} cannot be its own parent")]
    SelfParent(CategoryId),

    /// Tried to delete a category that still has products.
    #[error("category {0} has products and cannot be deleted")]
    CategoryHasProducts(CategoryId),

    /// The SKU is already used by another product.
    #[error("the SKU \"{0}\" already exists")]
    DuplicateSku(String),

    /// An empty string was used as a product SKU.
    #[error("product SKU cannot be empty")]
    EmptySku,

    /// An empty string was used as a product title.
    #[error("product title cannot be empty")]
    EmptyProductTitle,

    /// A product price was negative or not a number.
    #[error("product price must be a non-negative number")]
    InvalidPrice,

    /// The product ID does not refer to a stored product.
    #[error("product {0} could not be found")]
    ProductNotFound(ProductId),

    /// The request body could not be parsed.
    #[error("invalid request body: {0}")]
    InvalidRequestBody(String),

    /// A captured path parameter could not be parsed.
    #[error("invalid value for path parameter \"{0}\"")]
    InvalidPathParameter(String),

    /// No registered route matches the method and path.
    #[error("no route matches {method} {path}")]
    RouteNotFound {
        /// The HTTP method of the request.
        method: String,
        /// The path of the request.
        path: String,
    },

    /// The client has neither a logged-in session nor a valid remember-me token.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The client is not allowed to access the resource.
    #[error("access denied")]
    Forbidden,

    /// The username is already used by another admin.
    #[error("the username \"{0}\" already exists")]
    DuplicateUsername(String),

    /// The log-in form failed validation. The string explains why.
    #[error("{0}")]
    InvalidLogInData(String),

    /// The admin provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl Error {
    /// The class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::DuplicateCategoryCode(_)
            | Error::EmptyCategoryCode
            | Error::EmptyCategoryTitle
            | Error::CategoryNotFound(_)
            | Error::SelfParent(_)
            | Error::DuplicateSku(_)
            | Error::EmptySku
            | Error::EmptyProductTitle
            | Error::InvalidPrice
            | Error::ProductNotFound(_)
            | Error::InvalidRequestBody(_)
            | Error::InvalidPathParameter(_)
            | Error::DuplicateUsername(_)
            | Error::InvalidLogInData(_)
            | Error::TooWeak(_)
            | Error::NotFound => ErrorKind::Validation,
            Error::CategoryHasProducts(_) => ErrorKind::Conflict,
            Error::RouteNotFound { .. } => ErrorKind::RouteNotFound,
            Error::NotAuthenticated => ErrorKind::Authentication,
            Error::Forbidden => ErrorKind::Authorization,
            Error::HashingError(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError => ErrorKind::Internal,
        }
    }

    /// The HTTP status code used when reporting this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::CategoryNotFound(_)
            | Error::ProductNotFound(_)
            | Error::NotFound
            | Error::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            error => match error.kind() {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::RouteNotFound => StatusCode::NOT_FOUND,
                ErrorKind::Authentication => StatusCode::SEE_OTHER,
                ErrorKind::Authorization => StatusCode::FORBIDDEN,
                ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn into_json_response(self) -> Response {
        (self.status_code(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Returns true if `error` is a failed UNIQUE constraint on `column`,
/// e.g. "category.code".
pub(crate) fn is_unique_violation(error: &rusqlite::Error, column: &str) -> bool {
    // Code 2067 occurs when a UNIQUE constraint failed.
    matches!(
        error,
        rusqlite::Error::SqliteFailure(sql_error, Some(desc))
            if sql_error.extended_code == 2067 && desc.ends_with(column)
    )
}

/// Returns true if `error` is a failed FOREIGN KEY constraint.
pub(crate) fn is_foreign_key_violation(error: &rusqlite::Error) -> bool {
    // Code 787 occurs when a FOREIGN KEY constraint failed.
    matches!(
        error,
        rusqlite::Error::SqliteFailure(sql_error, _) if sql_error.extended_code == 787
    )
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self.kind() {
            ErrorKind::Validation | ErrorKind::Conflict | ErrorKind::Authorization => {
                self.into_json_response()
            }
            ErrorKind::RouteNotFound => ErrorPage::not_found().into_response(),
            ErrorKind::Authentication => Redirect::to(endpoints::LOG_IN_VIEW).into_response(),
            // Internal errors are not intended to be shown to the client.
            ErrorKind::Internal => {
                tracing::error!("An unexpected error occurred: {}", self);
                ErrorPage::internal_server_error().into_response()
            }
        }
    }
}

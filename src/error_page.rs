//! The HTML pages shown for errors that are not reported as JSON.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

/// A full page describing an error and how to get past it.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorPage<'a> {
    status: StatusCode,
    title: &'a str,
    description: &'a str,
    fix: &'a str,
}

impl ErrorPage<'_> {
    /// The page for a request that no route matches.
    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            title: "Not Found",
            description: "Page not found.",
            fix: "Check the address or go back to the homepage.",
        }
    }

    /// The page for an unexpected server side failure.
    pub fn internal_server_error() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            title: "Internal Server Error",
            description: "Sorry, something went wrong.",
            fix: "Try again later or check the server logs",
        }
    }
}

impl IntoResponse for ErrorPage<'_> {
    fn into_response(self) -> Response {
        let header = self.status.as_u16().to_string();
        let page = error_view(self.title, &header, self.description, self.fix);

        (self.status, Html(page.into_string())).into_response()
    }
}

#[cfg(test)]
mod error_page_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{
        error_page::ErrorPage,
        test_utils::{assert_valid_html, parse_html_document},
    };

    #[tokio::test]
    async fn not_found_page_shows_status() {
        let response = ErrorPage::not_found().into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let h1 = scraper::Selector::parse("h1").unwrap();
        let header = html.select(&h1).next().expect("No h1 found");
        assert_eq!(header.text().collect::<String>().trim(), "404");
    }

    #[test]
    fn internal_server_error_page_has_500_status() {
        let response = ErrorPage::internal_server_error().into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

#![allow(missing_docs)]

pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;
pub(crate) mod state;

pub(crate) use form::{assert_form_error_message, assert_form_input, must_get_form};
pub(crate) use html::{assert_valid_html, parse_html_document};
pub(crate) use http::get_header;
pub(crate) use state::{create_test_admin, get_test_app_state, request_context};

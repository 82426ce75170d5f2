//! This file defines the handlers for displaying the log-in page and handling log-in requests.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    auth::{get_admin_by_username, issue_remember_me_token},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base},
    router::{RequestContext, RouteParams},
};

/// The shortest password accepted by the log-in form.
const MIN_PASSWORD_LENGTH: usize = 8;

pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Invalid username or password";

/// The raw data entered in the log-in form.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct LogInData {
    /// Username entered during log-in.
    #[serde(default)]
    pub username: String,
    /// Password entered during log-in.
    #[serde(default)]
    pub password: String,
    /// Whether to issue a remember-me cookie.
    ///
    /// This value comes from a checkbox, so it either has a string value or is not set.
    /// The `Some` variant should be interpreted as `true` irregardless of the
    /// string value, and the `None` variant should be interpreted as `false`.
    pub keep_logged_in: Option<String>,
}

/// Check that the form is filled in and the password has the required shape.
///
/// # Errors
///
/// Returns [Error::InvalidLogInData] with a message for the first problem found.
pub fn validate_log_in_data(data: &LogInData) -> Result<(), Error> {
    if data.username.trim().is_empty() {
        return Err(Error::InvalidLogInData("Username is required.".to_owned()));
    }

    let password = &data.password;

    if password.is_empty() {
        return Err(Error::InvalidLogInData("Password is required.".to_owned()));
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(Error::InvalidLogInData(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long."
        )));
    }

    let has_upper = password.chars().any(|c| c.is_uppercase());
    let has_lower = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| !c.is_alphanumeric() || c == '_');

    if !(has_upper && has_lower && has_digit && has_special) {
        return Err(Error::InvalidLogInData(
            "Password must contain at least one uppercase letter, one lowercase letter, \
            one number, and one special character."
                .to_owned(),
        ));
    }

    Ok(())
}

fn log_in_form(username: &str, error_message: Option<&str>) -> Markup {
    html! {
        form
            method="post"
            action=(endpoints::LOG_IN_VIEW)
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="username" class=(FORM_LABEL_STYLE) { "Username" }

                input
                    id="username"
                    type="text"
                    name="username"
                    value=(username)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="password" class=(FORM_LABEL_STYLE) { "Password" }

                input
                    id="password"
                    type="password"
                    name="password"
                    required
                    minlength=(MIN_PASSWORD_LENGTH)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="flex items-center gap-x-3"
            {
                input
                    type="checkbox"
                    name="keep_logged_in"
                    id="keep_logged_in"
                    class="rounded-xs";

                label for="keep_logged_in" class=(FORM_LABEL_STYLE)
                {
                    "Keep me logged in for 30 days"
                }
            }

            @if let Some(error_message) = error_message {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Log in" }
        }
    }
}

fn log_in_view(username: &str, error_message: Option<&str>) -> Markup {
    let content = html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-6 text-2xl font-semibold" { "Log in to the admin dashboard" }

            (log_in_form(username, error_message))
        }
    };

    base("Log In", &content)
}

fn log_in_error_response(status: StatusCode, username: &str, error_message: &str) -> Response {
    (status, log_in_view(username, Some(error_message))).into_response()
}

/// Display the log-in page, or go straight to the dashboard if already logged in.
pub fn get_log_in_page(context: &mut RequestContext, _: &RouteParams) -> Result<Response, Error> {
    if context.session.is_logged_in() {
        return Ok(Redirect::to(endpoints::DASHBOARD_VIEW).into_response());
    }

    Ok(log_in_view("", None).into_response())
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, the session is marked as logged in and the
/// client is redirected to the dashboard page. Otherwise, the form is
/// returned with an error message explaining the problem.
///
/// # Errors
///
/// Returns an error only for internal failures, e.g. the database lock or
/// the hashing library failing.
pub fn post_log_in(context: &mut RequestContext, _: &RouteParams) -> Result<Response, Error> {
    let data: LogInData = match context.form_body() {
        Ok(data) => data,
        Err(error) => {
            return Ok(log_in_error_response(
                StatusCode::BAD_REQUEST,
                "",
                &error.to_string(),
            ));
        }
    };

    if let Err(error) = validate_log_in_data(&data) {
        return Ok(log_in_error_response(
            StatusCode::BAD_REQUEST,
            &data.username,
            &error.to_string(),
        ));
    }

    let admin = {
        let connection = context.db_connection()?;

        match get_admin_by_username(data.username.trim(), &connection) {
            Ok(admin) => admin,
            Err(Error::NotFound) => {
                tracing::info!("Log-in attempt for unknown admin {:?}", data.username);
                return Ok(log_in_error_response(
                    StatusCode::UNAUTHORIZED,
                    &data.username,
                    INVALID_CREDENTIALS_ERROR_MSG,
                ));
            }
            Err(error) => return Err(error),
        }
    };

    let is_password_valid = admin.password_hash.verify(&data.password).map_err(|error| {
        tracing::error!("Unhandled error while verifying credentials: {error}");
        Error::HashingError(error.to_string())
    })?;

    if !is_password_valid {
        tracing::info!("Wrong password for admin {}", admin.id);
        return Ok(log_in_error_response(
            StatusCode::UNAUTHORIZED,
            &data.username,
            INVALID_CREDENTIALS_ERROR_MSG,
        ));
    }

    context.session.log_in(admin.id);

    if data.keep_logged_in.is_some() {
        let jar = {
            let connection = context.db_connection()?;
            issue_remember_me_token(admin.id, context.cookies.clone(), &connection)?
        };
        context.cookies = jar;
    }

    tracing::info!("Admin {} logged in", admin.id);

    Ok(Redirect::to(endpoints::DASHBOARD_VIEW).into_response())
}

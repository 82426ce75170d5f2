//! Log-out route handler that ends the session and forgets the remember-me token.

use axum::response::{IntoResponse, Redirect, Response};

use crate::{
    Error,
    auth::{admin::set_token_digest, invalidate_remember_me_cookie},
    endpoints,
    router::{RequestContext, RouteParams},
};

/// Log out the current admin and redirect the client to the log-in page.
pub fn get_log_out(context: &mut RequestContext, _: &RouteParams) -> Result<Response, Error> {
    if let Some(admin_id) = context.session.admin_id() {
        let connection = context.db_connection()?;
        set_token_digest(admin_id, None, &connection)?;
        tracing::info!("Admin {admin_id} logged out");
    }

    context.session.log_out();
    context.cookies = invalidate_remember_me_cookie(context.cookies.clone());

    Ok(Redirect::to(endpoints::LOG_IN_VIEW).into_response())
}

#[cfg(test)]
mod log_out_tests {
    use axum::http::{Method, StatusCode};

    use crate::{
        auth::{
            get_log_out, issue_remember_me_token, remember_me::COOKIE_KEEP_LOGGED_IN,
            validate_remember_me_token,
        },
        endpoints,
        router::RouteParams,
        test_utils::{create_test_admin, get_header, get_test_app_state, request_context},
    };

    #[test]
    fn log_out_ends_session_and_redirects() {
        let state = get_test_app_state();
        let admin = create_test_admin(&state, "admin", "Sup3r$ecret");
        let mut context = request_context(&state, Method::GET, endpoints::LOG_OUT, "");
        context.session.log_in(admin.id);

        let response = get_log_out(&mut context, &RouteParams::default()).unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(get_header(&response, "location"), endpoints::LOG_IN_VIEW);
        assert!(!context.session.is_logged_in());
    }

    #[test]
    fn log_out_revokes_remember_me_token() {
        let state = get_test_app_state();
        let admin = create_test_admin(&state, "admin", "Sup3r$ecret");
        let mut context = request_context(&state, Method::GET, endpoints::LOG_OUT, "");
        context.session.log_in(admin.id);
        let old_jar = {
            let connection = state.db_connection.lock().unwrap();
            issue_remember_me_token(admin.id, context.cookies.clone(), &connection).unwrap()
        };
        context.cookies = old_jar.clone();

        get_log_out(&mut context, &RouteParams::default()).unwrap();

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(validate_remember_me_token(&old_jar, &connection), Ok(None));
        let cookie = context.cookies.get(COOKIE_KEEP_LOGGED_IN).unwrap();
        assert_eq!(cookie.value(), "");
    }

    #[test]
    fn log_out_without_session_still_redirects() {
        let state = get_test_app_state();
        let mut context = request_context(&state, Method::GET, endpoints::LOG_OUT, "");

        let response = get_log_out(&mut context, &RouteParams::default()).unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }
}

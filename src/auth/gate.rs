//! Middleware that only lets logged in admins through.

use crate::{Error, auth::validate_remember_me_token, router::RequestContext};

/// Check the session, falling back to the remember-me cookie.
///
/// A valid remember-me token logs the session in, so later requests skip the
/// token lookup.
fn authenticate(context: &mut RequestContext) -> Result<bool, Error> {
    if context.session.is_logged_in() {
        return Ok(true);
    }

    let admin_id = {
        let connection = context.db_connection()?;
        validate_remember_me_token(&context.cookies, &connection)?
    };

    match admin_id {
        Some(admin_id) => {
            tracing::info!("Restored session for admin {admin_id} from remember-me token");
            context.session.log_in(admin_id);
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Gate for admin pages.
///
/// # Errors
///
/// Returns [Error::NotAuthenticated], which redirects to the log-in page, if
/// the client is not logged in.
pub fn admin_gate(context: &mut RequestContext) -> Result<(), Error> {
    if authenticate(context)? {
        Ok(())
    } else {
        tracing::debug!("Redirecting unauthenticated request for {}", context.path);
        Err(Error::NotAuthenticated)
    }
}

/// Gate for the JSON API.
///
/// # Errors
///
/// Returns [Error::Forbidden] if the client is not logged in.
pub fn admin_api_gate(context: &mut RequestContext) -> Result<(), Error> {
    if authenticate(context)? {
        Ok(())
    } else {
        tracing::debug!("Rejecting unauthenticated API request for {}", context.path);
        Err(Error::Forbidden)
    }
}

//! "Keep me logged in" tokens.
//!
//! The client holds a random token in a private cookie. The admin table only
//! stores the SHA-512 digest of the token.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{
    Error,
    auth::{
        AdminId,
        admin::{get_admin_id_by_token_digest, set_token_digest},
    },
};

pub(crate) const COOKIE_KEEP_LOGGED_IN: &str = "keep_logged_in";

/// How long a remember-me cookie lasts.
pub const REMEMBER_ME_DURATION: Duration = Duration::days(30);

/// The hex encoded SHA-512 digest of `token`.
pub(crate) fn digest_token(token: &str) -> String {
    format!("{:x}", Sha512::digest(token.as_bytes()))
}

/// Create a new token for `admin_id`, store its digest and add the cookie to `jar`.
///
/// Any previous token for the admin stops working.
pub fn issue_remember_me_token(
    admin_id: AdminId,
    jar: PrivateCookieJar,
    connection: &Connection,
) -> Result<PrivateCookieJar, Error> {
    let token = Uuid::new_v4().simple().to_string();
    set_token_digest(admin_id, Some(&digest_token(&token)), connection)?;

    Ok(jar.add(
        Cookie::build((COOKIE_KEEP_LOGGED_IN, token))
            .path("/")
            .expires(OffsetDateTime::now_utc() + REMEMBER_ME_DURATION)
            .max_age(REMEMBER_ME_DURATION)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    ))
}

/// The admin that the remember-me cookie in `jar` belongs to, if the token is valid.
pub fn validate_remember_me_token(
    jar: &PrivateCookieJar,
    connection: &Connection,
) -> Result<Option<AdminId>, Error> {
    let Some(cookie) = jar.get(COOKIE_KEEP_LOGGED_IN) else {
        return Ok(None);
    };

    let token = cookie.value_trimmed();
    if token.is_empty() {
        return Ok(None);
    }

    get_admin_id_by_token_digest(&digest_token(token), connection)
}

/// Set the remember-me cookie to an invalid value with a max age of zero,
/// which deletes it on the client side.
pub fn invalidate_remember_me_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_KEEP_LOGGED_IN, ""))
            .path("/")
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

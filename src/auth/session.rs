//! The admin session, stored as JSON in an encrypted cookie.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use serde::{Deserialize, Serialize};

use crate::auth::AdminId;

pub(crate) const COOKIE_SESSION: &str = "session";

/// Whether the client is logged in, and as whom.
///
/// The session is only written back to the cookie jar when it changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    admin_id: Option<AdminId>,
    logged_in: bool,
    #[serde(skip)]
    modified: bool,
}

impl Session {
    /// Read the session from `jar`.
    ///
    /// A missing or unreadable session cookie gives an empty, logged out session.
    pub fn from_cookies(jar: &PrivateCookieJar) -> Self {
        let Some(cookie) = jar.get(COOKIE_SESSION) else {
            return Self::default();
        };

        serde_json::from_str(cookie.value_trimmed()).unwrap_or_else(|error| {
            tracing::warn!("Could not parse session cookie, starting a new session: {error}");
            Self::default()
        })
    }

    /// Mark the session as logged in as `admin_id`.
    pub fn log_in(&mut self, admin_id: AdminId) {
        self.admin_id = Some(admin_id);
        self.logged_in = true;
        self.modified = true;
    }

    /// Forget the logged in admin.
    pub fn log_out(&mut self) {
        self.admin_id = None;
        self.logged_in = false;
        self.modified = true;
    }

    /// Whether an admin is logged in.
    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    /// The logged in admin, if any.
    pub fn admin_id(&self) -> Option<AdminId> {
        self.admin_id
    }

    /// Write the session to `jar` if it changed.
    pub fn save(&self, jar: PrivateCookieJar) -> PrivateCookieJar {
        if !self.modified {
            return jar;
        }

        let value = match serde_json::to_string(self) {
            Ok(value) => value,
            Err(error) => {
                tracing::error!("Could not serialize session: {error}");
                return jar;
            }
        };

        jar.add(
            Cookie::build((COOKIE_SESSION, value))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Strict)
                .secure(true),
        )
    }
}

#[cfg(test)]
mod session_tests {
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use sha2::{Digest, Sha512};

    use crate::auth::{
        AdminId, Session,
        session::COOKIE_SESSION,
    };

    fn get_jar() -> PrivateCookieJar {
        let hash = Sha512::digest(b"foobar");
        let key = Key::from(&hash);

        PrivateCookieJar::new(key)
    }

    #[test]
    fn empty_jar_gives_logged_out_session() {
        let session = Session::from_cookies(&get_jar());

        assert!(!session.is_logged_in());
        assert_eq!(session.admin_id(), None);
    }

    #[test]
    fn unmodified_session_is_not_saved() {
        let jar = Session::default().save(get_jar());

        assert!(jar.get(COOKIE_SESSION).is_none());
    }

    #[test]
    fn logged_in_session_round_trips_through_jar() {
        let mut session = Session::default();
        session.log_in(AdminId::new(3));

        let jar = session.save(get_jar());
        let loaded = Session::from_cookies(&jar);

        assert!(loaded.is_logged_in());
        assert_eq!(loaded.admin_id(), Some(AdminId::new(3)));
    }

    #[test]
    fn log_out_clears_session() {
        let mut session = Session::default();
        session.log_in(AdminId::new(3));
        let jar = session.save(get_jar());

        let mut session = Session::from_cookies(&jar);
        session.log_out();
        let jar = session.save(jar);

        assert!(!Session::from_cookies(&jar).is_logged_in());
    }

    #[test]
    fn serializes_without_modified_flag() {
        let mut session = Session::default();
        session.log_in(AdminId::new(1));

        let json = serde_json::to_string(&session).unwrap();

        assert_eq!(json, r#"{"admin_id":1,"logged_in":true}"#);
    }
}

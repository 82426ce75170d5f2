pub(crate) mod admin;
mod gate;
mod log_in;
mod log_out;
mod password;
pub(crate) mod remember_me;
mod session;

pub use admin::{Admin, AdminId, create_admin, create_admin_table, get_admin_by_username};
pub use gate::{admin_api_gate, admin_gate};
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use password::{PasswordHash, ValidatedPassword};
pub use remember_me::{
    invalidate_remember_me_cookie, issue_remember_me_token, validate_remember_me_token,
};
pub use session::Session;

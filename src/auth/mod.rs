//! User accounts, password hashing, cookie sessions and the log-in, sign-up
//! and log-out pages.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod redirect;
mod sign_up;
mod token;
mod user;

pub use cookie::{COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{auth_guard, auth_guard_hx};
pub use password::{PASSWORD_MIN_LENGTH, PasswordHash, ValidatedPassword};
pub use redirect::normalize_redirect_url;
pub use sign_up::{get_sign_up_page, post_sign_up};
pub use token::Token;
pub use user::{User, UserID, create_user, create_user_table, get_user_by_email};

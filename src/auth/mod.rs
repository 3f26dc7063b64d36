//! Password hashing and bearer-token auth.

pub mod password;
pub mod token;

pub use password::PasswordService;
pub use token::{require_auth, Claims, TokenService};

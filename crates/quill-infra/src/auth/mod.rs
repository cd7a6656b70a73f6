//! Authentication implementations.

mod google;
mod password;

pub use google::{GoogleConfig, GoogleIdentityProvider};
pub use password::Argon2PasswordService;

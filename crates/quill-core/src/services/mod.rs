//! Application services - use cases composed from ports.

mod accounts;
mod posts;

pub use accounts::AccountService;
pub use posts::PostService;

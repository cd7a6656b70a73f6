//! Domain entities - the core business objects.

mod feed;
mod post;
mod user;

pub use feed::{MAX_PAGE, PAGE_SIZE, Page, PageRequest, PostFilter, SearchTerm};
pub use post::Post;
pub use user::User;

//! # Quill Shared
//!
//! Wire types shared by the server and any client: form bodies, query strings,
//! page view models and the response envelopes.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};

mod attachments;
mod auth;
pub mod dto;
mod folders;
pub mod response;
mod router;

pub use auth::RequireAuth;
pub use router::{AppState, create_router};

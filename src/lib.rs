pub mod authority;
pub mod config;
pub mod cookies;
pub mod db;
pub mod models;
pub mod permissions;
pub mod responses;
pub mod routes;
pub mod session;
pub mod state;
pub mod utils;

pub use authority::{authority, init_authority, SessionAuthority};
pub use cookies::domain::resolve_cookie_domain;
pub use permissions::has_permission;
pub use session::{verify_session_token, SessionRecord};
pub use state::AppState;

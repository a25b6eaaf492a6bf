pub mod login;
pub mod logout;
pub mod session;

pub use login::{handle_login, handle_session};
pub use logout::handle_logout;
pub use session::{require_permission, AuthSession};

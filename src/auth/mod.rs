pub mod admin;
pub mod authentication;
pub mod authority;
pub mod password;
pub mod session;

pub use admin::*;
pub use authority::*;
pub use password::*;
pub use session::*;

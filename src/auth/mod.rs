pub mod password;
pub mod session;

pub use password::{PasswordHasher, DUMMY_PASSWORD_HASH};
pub use session::{Claims, IssuedToken, Session, SessionContext, SessionError, SessionKeys};

pub mod errors;
pub mod id;

pub use errors::{ConfigError, DuetError, MediaError};
pub use id::{new_id, ConnectionId, SessionId};

pub type Result<T> = std::result::Result<T, DuetError>;

pub mod config_value;
pub mod role;
pub mod session;

pub use config_value::{ConfigEntry, ConfigKind, ConfigValue, ConfigValueError};
pub use role::Role;
pub use session::SessionUser;

mod init;
mod passwd;
mod users;

pub use init::cmd_init;
pub use passwd::cmd_passwd;
pub use users::{cmd_link, cmd_users};

use crate::config::Config;

/// Base URL for printed magic links outside of a request.
fn link_base(config: &Config) -> String {
    config.server.public_url.as_deref().map_or_else(
        || format!("http://localhost:{}", config.server.port),
        |url| url.trim_end_matches('/').to_string(),
    )
}

pub mod prelude;

pub mod site_config;
pub mod users;

pub use super::site_config::Entity as SiteConfig;
pub use super::users::Entity as Users;

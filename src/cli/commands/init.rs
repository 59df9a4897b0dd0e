use crate::api::create_app_state_from_config;
use crate::config::Config;

pub async fn cmd_init(config: Config) -> anyhow::Result<()> {
    if Config::create_default_if_missing()? {
        println!("Wrote default config.toml");
    } else {
        println!("config.toml already exists, leaving it untouched");
    }

    let database = config.general.database_path.clone();
    let state = create_app_state_from_config(config, None).await?;
    let users = state.auth.list_users().await?;

    println!("Database ready at {database}");
    if users.iter().any(|u| u.must_change_password) {
        println!("Default admin login is admin/admin. Change it with `storypage passwd admin`.");
    }
    Ok(())
}

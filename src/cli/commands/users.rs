use super::link_base;
use crate::api::create_app_state_from_config;
use crate::config::Config;

pub async fn cmd_users(config: Config) -> anyhow::Result<()> {
    let base = link_base(&config);
    let state = create_app_state_from_config(config, None).await?;
    let users = state.auth.list_users().await?;

    if users.is_empty() {
        println!("No users.");
        return Ok(());
    }

    println!("{:<5} {:<24} {:<8} Magic link", "ID", "Username", "Role");
    println!("{:-<80}", "");

    for user in &users {
        let link = user
            .magic_token
            .as_deref()
            .map_or_else(|| "-".to_string(), |token| format!("{base}/magic/{token}"));
        let flag = if user.must_change_password { " *" } else { "" };
        println!(
            "{:<5} {:<24} {:<8} {link}",
            user.id,
            format!("{}{flag}", user.username),
            user.role.as_str(),
        );
    }

    if users.iter().any(|u| u.must_change_password) {
        println!();
        println!("* still uses the default password");
    }
    Ok(())
}

pub async fn cmd_link(config: Config, username: &str) -> anyhow::Result<()> {
    let base = link_base(&config);
    let state = create_app_state_from_config(config, None).await?;

    let user = state.auth.get_user(username).await?;
    let token = state.auth.regenerate_magic_token(user.id).await?;

    println!("New magic link for '{}':", user.username);
    println!("{base}/magic/{token}");
    Ok(())
}

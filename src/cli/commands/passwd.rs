use std::io::BufRead;

use crate::api::create_app_state_from_config;
use crate::config::Config;
use crate::constants::limits;

pub async fn cmd_passwd(config: Config, username: &str) -> anyhow::Result<()> {
    let state = create_app_state_from_config(config, None).await?;

    // Make sure the account exists before asking for input.
    state.auth.get_user(username).await?;

    println!(
        "New password for '{username}' (at least {} characters):",
        limits::MIN_PASSWORD_LENGTH
    );

    let password = read_password_line(std::io::stdin().lock())?;
    state.auth.change_password(username, &password).await?;

    println!("Password updated for '{username}'");
    Ok(())
}

fn read_password_line(mut input: impl BufRead) -> anyhow::Result<String> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

use super::{attr, flash_list, layout};

/// Login form. `username` is echoed back after a failed attempt.
#[must_use]
pub fn render_login(messages: &[String], username: &str) -> String {
    let body = format!(
        r#"<main class="login">
<h1>Login</h1>
{flash}
<form method="post" action="/login">
<label>Benutzername <input type="text" name="username" value="{username}" autocomplete="username" required></label>
<label>Passwort <input type="password" name="password" autocomplete="current-password" required></label>
<button type="submit">Einloggen</button>
</form>
</main>"#,
        flash = flash_list(messages),
        username = attr(username),
    );

    layout("Login", "login", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_login_shows_messages_and_username() {
        let html = render_login(&["Login fehlgeschlagen.".to_string()], "a\"b");
        assert!(html.contains("<li>Login fehlgeschlagen.</li>"));
        assert!(html.contains(r#"value="a&quot;b""#));
        assert!(html.contains(r#"action="/login""#));
    }
}

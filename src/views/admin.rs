use std::fmt::Write;

use super::{attr, flash_list, layout};
use crate::constants::form;
use crate::models::{ConfigEntry, ConfigKind, Role};
use crate::services::UserInfo;

pub struct AdminPage<'a> {
    pub entries: &'a [ConfigEntry],
    pub users: &'a [UserInfo],
    pub messages: &'a [String],
    /// Base URL magic links are printed with, without trailing slash.
    pub base_url: &'a str,
    pub current_user: &'a str,
}

fn entry_input(entry: &ConfigEntry) -> String {
    let name = format!("{}{}", form::CONFIG_FIELD_PREFIX, entry.key);
    let value = attr(&entry.value);

    match entry.kind {
        ConfigKind::Number => format!(
            r#"<input type="number" step="any" name="{name}" value="{value}">"#,
            name = attr(&name)
        ),
        ConfigKind::Image => {
            let preview = if entry.value.is_empty() {
                String::new()
            } else {
                format!(r#"<img class="preview" src="{value}" alt="">"#)
            };
            format!(
                r#"{preview}<input type="text" name="{name}" value="{value}"><input type="file" name="{file}" accept="image/*">"#,
                name = attr(&name),
                file = attr(&format!("{}{}", form::FILE_FIELD_PREFIX, entry.key)),
            )
        }
        ConfigKind::Text if entry.key.starts_with("show_") => {
            let checked = |v: &str| if entry.value == v { " selected" } else { "" };
            format!(
                r#"<select name="{name}"><option value="true"{t}>an</option><option value="false"{f}>aus</option></select>"#,
                name = attr(&name),
                t = checked("true"),
                f = checked("false"),
            )
        }
        ConfigKind::Text if entry.value.contains('\n') || entry.value.len() > 80 => format!(
            r#"<textarea name="{name}" rows="4">{text}</textarea>"#,
            name = attr(&name),
            text = html_escape::encode_text(&entry.value),
        ),
        ConfigKind::Text => format!(
            r#"<input type="text" name="{name}" value="{value}">"#,
            name = attr(&name)
        ),
    }
}

/// Renders the dashboard: config form, user list with magic links, user creation.
#[must_use]
pub fn render_admin(page: &AdminPage<'_>) -> String {
    let mut body = String::new();

    let _ = write!(
        body,
        r#"<nav class="topbar"><span>Angemeldet als {user}</span> <a href="/">Zur Story</a> <a href="/logout">Logout</a></nav>
<main class="admin">
<h1>Dashboard</h1>
{flash}
<form method="post" action="/admin" enctype="multipart/form-data">
<table class="config">
"#,
        user = html_escape::encode_text(page.current_user),
        flash = flash_list(page.messages),
    );

    for entry in page.entries {
        let _ = writeln!(
            body,
            r#"<tr><th><label>{key}</label><small>{kind}</small></th><td>{input}</td></tr>"#,
            key = html_escape::encode_text(&entry.key),
            kind = entry.kind,
            input = entry_input(entry),
        );
    }

    body.push_str(
        r#"</table>
<button type="submit">Speichern</button>
</form>
<h2>Benutzer</h2>
<table class="users">
<tr><th>Name</th><th>Rolle</th><th>Magic Link</th><th></th></tr>
"#,
    );

    for user in page.users {
        let link = user.magic_token.as_deref().map_or_else(String::new, |token| {
            let url = format!("{}/magic/{token}", page.base_url);
            format!(r#"<input type="text" readonly value="{}">"#, attr(&url))
        });
        let _ = writeln!(
            body,
            r#"<tr><td>{name}</td><td>{role}</td><td>{link}</td><td><a href="/admin/users/link/{id}">Neuer Link</a></td></tr>"#,
            name = html_escape::encode_text(&user.username),
            role = if user.role == Role::Admin { "Admin" } else { "Viewer" },
            id = user.id,
        );
    }

    body.push_str(
        r#"</table>
<form method="post" action="/admin/users/create" class="create-user">
<input type="text" name="username" placeholder="Benutzername" required>
<button type="submit">Benutzer erstellen</button>
</form>
</main>"#,
    );

    layout("Dashboard", "admin", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, value: &str, kind: ConfigKind) -> ConfigEntry {
        ConfigEntry {
            key: key.to_string(),
            value: value.to_string(),
            kind,
        }
    }

    #[test]
    fn test_inputs_follow_kind() {
        assert!(entry_input(&entry("years_count", "5", ConfigKind::Number)).contains(r#"type="number""#));

        let image = entry_input(&entry("img_now", "https://a.example/x.jpg", ConfigKind::Image));
        assert!(image.contains(r#"name="file_img_now""#));
        assert!(image.contains(r#"name="config_img_now""#));

        let toggle = entry_input(&entry("show_music", "false", ConfigKind::Text));
        assert!(toggle.contains(r#"<option value="false" selected>"#));

        let multiline = entry_input(&entry("wa_messages", "a\nb", ConfigKind::Text));
        assert!(multiline.starts_with("<textarea"));
    }

    #[test]
    fn test_render_admin_lists_magic_links() {
        let users = vec![UserInfo {
            id: 7,
            username: "lena".to_string(),
            role: Role::Viewer,
            magic_token: Some("abc123".to_string()),
            must_change_password: false,
            created_at: String::new(),
        }];

        let html = render_admin(&AdminPage {
            entries: &[],
            users: &users,
            messages: &[],
            base_url: "http://localhost:5000",
            current_user: "admin",
        });

        assert!(html.contains("http://localhost:5000/magic/abc123"));
        assert!(html.contains(r#"href="/admin/users/link/7""#));
    }
}

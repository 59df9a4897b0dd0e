//! Server-side HTML for the three pages of the site.

pub mod admin;
pub mod login;
pub mod story;

use std::fmt::Write;

pub use admin::{AdminPage, render_admin};
pub use login::render_login;
pub use story::render_story;

/// HTML-escapes `value`, keeping `<br>` line breaks authored in the dashboard.
#[must_use]
pub fn text(value: &str) -> String {
    html_escape::encode_text(value)
        .replace("&lt;br&gt;", "<br>")
        .replace("&lt;br/&gt;", "<br>")
        .replace("&lt;br /&gt;", "<br>")
}

/// Escapes `value` for use inside a double-quoted attribute.
#[must_use]
pub fn attr(value: &str) -> String {
    html_escape::encode_double_quoted_attribute(value).into_owned()
}

pub(crate) fn layout(title: &str, body_class: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="de">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="/assets/style.css">
</head>
<body class="{body_class}">
{body}
</body>
</html>
"#,
        title = html_escape::encode_text(title),
        body_class = attr(body_class),
    )
}

pub(crate) fn flash_list(messages: &[String]) -> String {
    if messages.is_empty() {
        return String::new();
    }

    let mut out = String::from(r#"<ul class="flash">"#);
    for message in messages {
        let _ = write!(out, "<li>{}</li>", html_escape::encode_text(message));
    }
    out.push_str("</ul>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_escapes_but_keeps_line_breaks() {
        assert_eq!(text("UNSERE<br>STORY"), "UNSERE<br>STORY");
        assert_eq!(text("a<br />b"), "a<br>b");
        assert_eq!(
            text("<script>alert(1)</script>"),
            "&lt;script&gt;alert(1)&lt;/script&gt;"
        );
    }

    #[test]
    fn test_attr_escapes_quotes() {
        assert_eq!(attr(r#"x" onload="y"#), "x&quot; onload=&quot;y");
    }

    #[test]
    fn test_flash_list() {
        assert_eq!(flash_list(&[]), "");
        assert_eq!(
            flash_list(&["<b>ok</b>".to_string()]),
            r#"<ul class="flash"><li>&lt;b&gt;ok&lt;/b&gt;</li></ul>"#
        );
    }
}

use std::collections::BTreeMap;
use std::fmt::Write;

use super::{attr, layout, text};

/// One row of `chat_stats_config` (`icon|count|label`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatStat<'a> {
    pub icon: &'a str,
    pub count: &'a str,
    pub label: &'a str,
}

/// Read-only view over the config snapshot. Missing keys read as "".
struct Page<'a> {
    config: &'a BTreeMap<String, String>,
}

impl<'a> Page<'a> {
    fn get(&self, key: &str) -> &'a str {
        self.config.get(key).map_or("", String::as_str)
    }

    fn shows(&self, section: &str) -> bool {
        self.get(&format!("show_{section}")).trim() == "true"
    }

    fn text(&self, key: &str) -> String {
        text(self.get(key))
    }

    fn attr(&self, key: &str) -> String {
        attr(self.get(key))
    }
}

#[must_use]
pub fn parse_chat_stats(raw: &str) -> Vec<ChatStat<'_>> {
    raw.lines()
        .filter_map(|line| {
            let mut parts = line.trim().splitn(3, '|');
            let icon = parts.next()?.trim();
            let count = parts.next()?.trim();
            let label = parts.next()?.trim();
            Some(ChatStat { icon, count, label })
        })
        .collect()
}

/// Non-empty trimmed items of a comma-separated list.
#[must_use]
pub fn split_list(raw: &str) -> Vec<&str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty()).collect()
}

/// Non-empty trimmed lines.
#[must_use]
pub fn split_lines(raw: &str) -> Vec<&str> {
    raw.lines().map(str::trim).filter(|s| !s.is_empty()).collect()
}

fn gallery(urls: &[&str]) -> String {
    let mut out = String::from(r#"<div class="gallery">"#);
    for url in urls {
        let _ = write!(out, r#"<img src="{}" alt="" loading="lazy">"#, attr(url));
    }
    out.push_str("</div>");
    out
}

/// Renders the story page from the full config snapshot.
#[must_use]
pub fn render_story(config: &BTreeMap<String, String>, is_admin: bool) -> String {
    let page = Page { config };
    let mut body = String::new();

    let _ = write!(
        body,
        r#"<nav class="topbar">{admin}<a href="/logout">Logout</a></nav>
<section class="slide hero"><h1>{title}</h1><p>{intro}</p></section>
"#,
        admin = if is_admin {
            r#"<a href="/admin">Dashboard</a> "#
        } else {
            ""
        },
        title = page.text("title_main"),
        intro = page.text("intro_text"),
    );

    if page.shows("birthday") {
        let _ = write!(
            body,
            r#"<section class="slide birthday"><h2>{}</h2><div class="big-number" id="birthday_age">{}</div><p>{}</p></section>
"#,
            page.text("birthday_title"),
            page.text("birthday_age"),
            page.text("birthday_text"),
        );
    }

    if page.shows("stats") {
        let _ = write!(
            body,
            r#"<section class="slide stats"><h2>{}</h2><div class="stat-number" id="years_count">{}</div><div class="stat-number" id="days_count">{}</div><p>{}</p>"#,
            page.text("stats_title"),
            page.text("years_count"),
            page.text("days_count"),
            page.text("stats_subtitle"),
        );

        let _ = write!(body, "<h3>{}</h3><ul class=\"chat-stats\">", page.text("chat_stats_title"));
        for stat in parse_chat_stats(page.get("chat_stats_config")) {
            let _ = write!(
                body,
                r#"<li data-icon="{}"><strong>{}</strong> {}</li>"#,
                attr(stat.icon),
                text(stat.count),
                text(stat.label),
            );
        }
        body.push_str("</ul></section>\n");
    }

    if page.shows("whatsapp") {
        let _ = write!(
            body,
            r#"<section class="slide whatsapp"><h2>{}</h2><div class="bubbles">"#,
            page.text("wa_title")
        );
        for message in split_lines(page.get("wa_messages")) {
            let _ = write!(body, r#"<p class="bubble">{}</p>"#, text(message));
        }
        body.push_str("</div></section>\n");
    }

    if page.shows("development") {
        let _ = write!(
            body,
            r#"<section class="slide development"><h2>{}</h2><div class="then-now"><img src="{}" alt="Damals"><img src="{}" alt="Heute"></div></section>
"#,
            page.text("development_title"),
            page.attr("img_then"),
            page.attr("img_now"),
        );
    }

    if page.shows("chaos") {
        let _ = write!(
            body,
            r#"<section class="slide chaos"><h2>{}</h2>{}</section>
"#,
            page.text("chaos_title"),
            gallery(&split_list(page.get("gallery_memes"))),
        );
    }

    if page.shows("music") {
        let _ = write!(
            body,
            r#"<section class="slide music"><h2>{}</h2><img class="cover" src="{}" alt=""><h3>{}</h3><p>{}</p></section>
"#,
            page.text("music_title"),
            page.attr("song_cover"),
            page.text("song_title"),
            page.text("song_artist"),
        );
    }

    if page.shows("highlights") {
        let _ = write!(
            body,
            r#"<section class="slide highlights" style="background-image: url('{}')"><span class="label">{}</span><h2>{}</h2>{}<h3>{}</h3></section>
"#,
            page.attr("trip_bg").replace('\'', "%27"),
            page.text("highlight_label"),
            page.text("trip_city"),
            gallery(&split_list(page.get("gallery_paris"))),
            page.text("bucket_title"),
        );
    }

    if page.shows("character") {
        let _ = write!(
            body,
            r#"<section class="slide character"><p class="analyzing">{}</p><span class="label">{}</span><h2>{}</h2><p>{}</p></section>
"#,
            page.text("analyzing_text"),
            page.text("character_type_label"),
            page.text("character_type"),
            page.text("character_name"),
        );
    }

    if page.shows("postits") {
        let _ = write!(
            body,
            r#"<section class="slide postits"><h2>{}</h2><div class="notes">"#,
            page.text("postits_title")
        );
        for note in split_list(page.get("postits_content")) {
            let _ = write!(body, r#"<div class="note">{}</div>"#, text(note));
        }
        body.push_str("</div></section>\n");
    }

    let _ = write!(
        body,
        r#"<section class="slide final"><h2>{}</h2><p>{}</p><p class="sender">{}</p></section>"#,
        page.text("final_msg_title"),
        page.text("final_msg_text"),
        page.text("final_sender_name"),
    );

    layout(page.get("page_title"), "story", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_SITE_CONFIG;

    fn defaults() -> BTreeMap<String, String> {
        DEFAULT_SITE_CONFIG
            .iter()
            .map(|(k, v, _)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_parse_chat_stats() {
        let stats = parse_chat_stats("message-circle|45230|Nachrichten\nbroken line\n a | 1 | b|c ");
        assert_eq!(
            stats,
            vec![
                ChatStat {
                    icon: "message-circle",
                    count: "45230",
                    label: "Nachrichten"
                },
                ChatStat {
                    icon: "a",
                    count: "1",
                    label: "b|c"
                },
            ]
        );
    }

    #[test]
    fn test_split_list_and_lines() {
        assert_eq!(split_list("a, b,,c ,"), vec!["a", "b", "c"]);
        assert_eq!(split_lines("x\n\n y \n"), vec!["x", "y"]);
    }

    #[test]
    fn test_render_defaults() {
        let html = render_story(&defaults(), false);
        assert!(html.contains("<title>Unsere Story | Friendship Wrapped</title>"));
        assert!(html.contains("<h1>UNSERE<br>STORY</h1>"));
        assert!(html.contains(r#"id="years_count">5<"#));
        assert!(html.contains("Elite-Bestie"));
        assert!(!html.contains(r#"href="/admin""#));
    }

    #[test]
    fn test_toggles_hide_sections() {
        let mut config = defaults();
        config.insert("show_character".to_string(), "false".to_string());
        let html = render_story(&config, false);
        assert!(!html.contains("Elite-Bestie"));
    }

    #[test]
    fn test_missing_keys_render_empty() {
        let html = render_story(&BTreeMap::new(), true);
        assert!(html.contains("<h1></h1>"));
        assert!(html.contains(r#"href="/admin""#));
        assert!(!html.contains("class=\"slide stats\""));
    }

    #[test]
    fn test_values_are_escaped() {
        let mut config = defaults();
        config.insert("character_name".to_string(), "<script>x</script>".to_string());
        let html = render_story(&config, false);
        assert!(html.contains("&lt;script&gt;x&lt;/script&gt;"));
        assert!(!html.contains("<script>x"));
    }
}

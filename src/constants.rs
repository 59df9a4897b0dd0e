use crate::models::ConfigKind;

pub mod session {
    /// Session key holding the authenticated [`crate::models::SessionUser`].
    pub const USER_KEY: &str = "user";

    /// Session key holding pending flash messages.
    pub const FLASH_KEY: &str = "_flash";
}

pub mod form {
    /// Prefix of dashboard fields that update a config entry.
    pub const CONFIG_FIELD_PREFIX: &str = "config_";

    /// Prefix of dashboard fields that upload an image for a config entry.
    pub const FILE_FIELD_PREFIX: &str = "file_";
}

pub mod bootstrap {
    pub const ADMIN_USERNAME: &str = "admin";

    /// Well-known placeholder. Change it with `storypage passwd admin`.
    pub const ADMIN_PASSWORD: &str = "admin";
}

pub mod limits {
    pub const MIN_PASSWORD_LENGTH: usize = 8;

    pub const MAX_USERNAME_LENGTH: usize = 100;

    pub const MAX_CONFIG_KEY_LENGTH: usize = 100;
}

/// Page content seeded on first start. Existing values are never overwritten.
pub const DEFAULT_SITE_CONFIG: &[(&str, &str, ConfigKind)] = &[
    ("page_title", "Unsere Story | Friendship Wrapped", ConfigKind::Text),
    ("title_main", "UNSERE<br>STORY", ConfigKind::Text),
    ("intro_text", "Bereit für eine Zeitreise durch unsere Freundschaft?", ConfigKind::Text),
    ("birthday_title", "Happy Birthday!", ConfigKind::Text),
    ("birthday_age", "19", ConfigKind::Number),
    (
        "birthday_text",
        "Heute feiern wir dich und all die Jahre, die wir uns schon kennen!",
        ConfigKind::Text,
    ),
    ("stats_title", "Unsere Zeit", ConfigKind::Text),
    ("years_count", "5", ConfigKind::Number),
    ("days_count", "1825", ConfigKind::Number),
    ("stats_subtitle", "Tage voller Erinnerungen", ConfigKind::Text),
    ("chat_stats_title", "Einfach unzertrennlich", ConfigKind::Text),
    (
        "chat_stats_config",
        "message-circle|45230|Nachrichten\nphone-call|840|Stunden Telefonate\nimage|2150|Geteilte Medien",
        ConfigKind::Text,
    ),
    ("wa_title", "Deine legendären Nachrichten", ConfigKind::Text),
    (
        "wa_messages",
        "Hahahah ich kann nicht mehr 😂\nBin in 5 Minuten da! (Versprochen)\nWas essen wir heute? Ich sterbe 🍕\nGlaub nicht was gerade passiert ist...\nLove you Bestie! 💖✨",
        ConfigKind::Text,
    ),
    ("development_title", "Die Entwicklung", ConfigKind::Text),
    (
        "img_then",
        "https://images.unsplash.com/photo-1543269865-cbf427effbad?w=800",
        ConfigKind::Image,
    ),
    (
        "img_now",
        "https://images.unsplash.com/photo-1529156069898-49953e39b3ac?w=800",
        ConfigKind::Image,
    ),
    ("chaos_title", "Unsere Chaos-Momente", ConfigKind::Text),
    ("music_title", "Euer All-Time Favorit", ConfigKind::Text),
    ("song_title", "Friendship Anthem", ConfigKind::Text),
    ("song_artist", "Dauerschleife", ConfigKind::Text),
    (
        "song_cover",
        "https://images.unsplash.com/photo-1470225620780-dba8ba36b745?w=400",
        ConfigKind::Image,
    ),
    ("highlight_label", "Das Highlight", ConfigKind::Text),
    ("trip_city", "Paris Vibes", ConfigKind::Text),
    (
        "trip_bg",
        "https://images.unsplash.com/photo-1502602898657-3e91760cbb34?auto=format&fit=crop&w=1200",
        ConfigKind::Image,
    ),
    (
        "gallery_paris",
        "https://images.unsplash.com/photo-1511739001486-6bfe10ce785f?w=600,https://images.unsplash.com/photo-1549144511-f099e773c147?w=600,https://images.unsplash.com/photo-1503917988258-f87a78e3c995?w=600,https://images.unsplash.com/photo-1502602898657-3e91760cbb34?w=600",
        ConfigKind::Text,
    ),
    (
        "gallery_memes",
        "https://images.unsplash.com/photo-1531928351158-2f7360b94b51?w=600,https://images.unsplash.com/photo-1506863530036-1efeddceb993?w=600,https://images.unsplash.com/photo-1543332164-6e82f355badc?w=600",
        ConfigKind::Text,
    ),
    ("bucket_title", "Was wir noch erleben", ConfigKind::Text),
    ("analyzing_text", "Analysiere Freundschaft...", ConfigKind::Text),
    ("character_type_label", "Charakter-Typ", ConfigKind::Text),
    ("character_type", "Elite-Bestie", ConfigKind::Text),
    ("character_name", "Simon", ConfigKind::Text),
    ("postits_title", "Gründe, warum du toll bist", ConfigKind::Text),
    (
        "postits_content",
        "Du bist die Beste!,Dein Lachen ist ansteckend,Beste Reisebegleitung,Immer ein offenes Ohr,Chaos-Queen (positiv!),Einfach du selbst ❤️",
        ConfigKind::Text,
    ),
    ("final_msg_title", "Bestie Forever.", ConfigKind::Text),
    (
        "final_msg_text",
        "Danke für jeden einzelnen Moment. Du bist Familie. Auf ewig!",
        ConfigKind::Text,
    ),
    ("final_sender_name", "Deine [Dein Name]", ConfigKind::Text),
    ("show_birthday", "true", ConfigKind::Text),
    ("show_stats", "true", ConfigKind::Text),
    ("show_whatsapp", "true", ConfigKind::Text),
    ("show_development", "true", ConfigKind::Text),
    ("show_chaos", "true", ConfigKind::Text),
    ("show_music", "true", ConfigKind::Text),
    ("show_highlights", "true", ConfigKind::Text),
    ("show_postits", "true", ConfigKind::Text),
    ("show_character", "true", ConfigKind::Text),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_keys_are_unique() {
        let keys: HashSet<_> = DEFAULT_SITE_CONFIG.iter().map(|(k, _, _)| *k).collect();
        assert_eq!(keys.len(), DEFAULT_SITE_CONFIG.len());
    }

    #[test]
    fn test_defaults_are_valid_for_their_kind() {
        for (key, value, kind) in DEFAULT_SITE_CONFIG {
            assert!(
                kind.validate(value, "/static/uploads").is_ok(),
                "default for {key} does not match its kind"
            );
        }
    }
}

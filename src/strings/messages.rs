//! # Messages
//!
//! Constant strings and format functions for user-facing chat replies.
//! Values are plain text; callers escape them for the target markup.

pub const FEEDS_HEADER: &str = "Verfügbare (Podcast) Feeds:";

pub const SEARCH_USAGE: &str = concat!(
    "Zur Stichwortsuche verwende:\n",
    "/findeStichwort FeedNummer Stichwort\n",
    "Alle Feed Nummern werden von /feeds aufgelistet."
);

pub const SEARCH_HITS_HEADER: &str = "Die besten 3 Treffer sind die Episoden:";
pub const SEARCH_NO_HITS: &str = "Keine passenden Episoden gefunden.";

pub const EPISODE_NUMBER_ERROR: &str = concat!(
    "Es gab einen Fehler mit der Episodennummer.\n",
    "Stelle sicher, dass du eine Zahl angegeben hast!"
);

pub const TOPICS_NOT_FOUND: &str = concat!(
    "Themen nicht gefunden.\n",
    "Wahrscheinlich Nobelpreis/Jahresrückblick-Folge"
);

pub const NO_EPISODES: &str = "Dieser Feed enthält keine Episoden.";
pub const COOKIE_CRUMBS: &str = "Keine Kekse mehr da.";
pub const CROW_SILENT: &str = "Die Krähe schweigt heute. (cowsay/fortune nicht verfügbar)";

pub fn episode_not_found(number: usize) -> String {
    format!("Folge {number} nicht gefunden.")
}

pub fn cookie(title: &str) -> String {
    format!("\u{1F36A} {title} \u{1F36A}")
}

pub fn debug_check_started(max_age_secs: i64) -> String {
    format!("Prüfe alle Feeds auf Episoden der letzten {max_age_secs} Sekunden.")
}

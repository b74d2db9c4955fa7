//! # Episode Topics
//!
//! Extracts the "Thema N" sections from the show notes of a Methodisch
//! inkorrekt episode, addressed by its episode number.
//!
//! The feed lists the newest episode first and contains both a 12a and a 12b,
//! so numbers from 13 on are shifted by one and 12 yields both parts.

use crate::domain::markup::{self, Markup};
use crate::domain::types::FeedSnapshot;
use crate::strings::messages;
use regex::Regex;
use std::sync::LazyLock;

static TOPIC_START: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Thema [1-4]").unwrap());

const SPLIT_EPISODE: usize = 12;
const SPLIT_EPISODE_TITLE: &str = "12a Du wirst wieder angerufen! & 12b Previously (on) Lost";

/// Show notes without the WordPress block markers.
fn clean_content(content: &str) -> String {
    content
        .replace("<!-- /wp:paragraph -->", "")
        .replace("<!-- wp:paragraph -->", "")
}

/// Feed position of episode `number`, newest first.
fn episode_index(number: usize, len: usize) -> Option<usize> {
    let offset = if number > SPLIT_EPISODE { 2 } else { 1 };
    len.checked_sub(offset)?.checked_sub(number)
}

/// Reply text for the topics of episode `arg`, rendered in `markup`.
pub fn topics_of_episode(snapshot: &FeedSnapshot, arg: &str, markup: Markup) -> String {
    let arg = arg.trim();
    if arg.is_empty() || !arg.chars().all(|c| c.is_ascii_digit()) {
        return markup::escape(markup, messages::EPISODE_NUMBER_ERROR);
    }
    let Ok(number) = arg.parse::<usize>() else {
        return markup::escape(markup, messages::EPISODE_NUMBER_ERROR);
    };
    let episodes = &snapshot.episodes;
    let not_found = || markup::escape(markup, &messages::episode_not_found(number));

    let Some(index) = episode_index(number, episodes.len()) else {
        return not_found();
    };

    let (title, notes) = if number == SPLIT_EPISODE {
        let Some(first) = index.checked_sub(1) else {
            return not_found();
        };
        let notes = [index, first]
            .iter()
            .map(|&i| format!("{}{}", episodes[i].title, clean_content(&episodes[i].content)))
            .collect::<Vec<_>>()
            .join(" ");
        (SPLIT_EPISODE_TITLE.to_string(), notes)
    } else {
        let episode = &episodes[index];
        (
            episode.title.clone(),
            format!("{} {}", episode.title, clean_content(&episode.content)),
        )
    };

    let topics: Vec<String> = TOPIC_START
        .find_iter(&notes)
        .map(|m| {
            let rest = &notes[m.start()..];
            let end = rest.find('\n').unwrap_or(rest.len());
            markup::html_to_markup(markup, &rest[..end])
        })
        .collect();

    if topics.is_empty() {
        return markup::escape(markup, messages::TOPICS_NOT_FOUND);
    }

    format!(
        "Die Themen von Folge {} sind:\n{}",
        markup::escape(markup, &title),
        topics.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{episode, snapshot};

    /// Episodes 0..=18 plus 12b, newest first.
    fn feed() -> FeedSnapshot {
        let mut numbers: Vec<String> = (0..=18).map(|n| n.to_string()).collect();
        numbers.insert(13, "12b".to_string());
        let episodes = numbers
            .iter()
            .rev()
            .map(|n| {
                let mut e = episode(&format!("Mi{n}"), "Mon, 01 Jan 2024 10:00:00 +0000");
                e.content = format!(
                    "<!-- wp:paragraph --><p><strong>Thema 1: Eins aus {n}</strong></p>\n\
                     <p><strong>Thema 2: Zwei</strong> mit <a href=\"https://example.org/{n}\">Link</a></p>\n"
                );
                e
            })
            .collect();
        snapshot("Methodisch inkorrekt!", episodes)
    }

    #[test]
    fn index_mapping() {
        assert_eq!(episode_index(0, 20), Some(19));
        assert_eq!(episode_index(12, 20), Some(7));
        assert_eq!(episode_index(13, 20), Some(5));
        assert_eq!(episode_index(18, 20), Some(0));
        assert_eq!(episode_index(19, 20), None);
    }

    #[test]
    fn topics_of_regular_episode() {
        let reply = topics_of_episode(&feed(), "13", Markup::Markdown);
        assert_eq!(
            reply,
            "Die Themen von Folge Mi13 sind:\n\
             Thema 1: Eins aus 13\n\
             Thema 2: Zwei mit [Link](https://example.org/13)"
        );
        assert!(topics_of_episode(&feed(), "5", Markup::Markdown).contains("Eins aus 5"));
    }

    #[test]
    fn episode_twelve_includes_both_parts() {
        let reply = topics_of_episode(&feed(), "12", Markup::TelegramV2);
        assert!(reply.starts_with(r"Die Themen von Folge 12a Du wirst wieder angerufen\! & 12b Previously \(on\) Lost sind:"));
        let first = reply.find("Eins aus 12\n").unwrap();
        let second = reply.find("Eins aus 12b").unwrap();
        assert!(first < second);
    }

    #[test]
    fn invalid_numbers() {
        assert_eq!(
            topics_of_episode(&feed(), "zwölf", Markup::Markdown),
            markup::escape(Markup::Markdown, messages::EPISODE_NUMBER_ERROR)
        );
        assert!(topics_of_episode(&feed(), "400", Markup::Markdown).contains("400"));
        for arg in ["+5", "-1", "5.0", ""] {
            assert_eq!(
                topics_of_episode(&feed(), arg, Markup::Markdown),
                markup::escape(Markup::Markdown, messages::EPISODE_NUMBER_ERROR),
                "{arg}"
            );
        }
    }

    #[test]
    fn notes_without_topics() {
        let mut feed = feed();
        for e in &mut feed.episodes {
            e.content = "<p>Nobelpreis Spezial</p>".to_string();
        }
        assert_eq!(
            topics_of_episode(&feed, "3", Markup::Markdown),
            markup::escape(Markup::Markdown, messages::TOPICS_NOT_FOUND)
        );
    }
}

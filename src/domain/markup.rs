//! # Markup
//!
//! Escaping and formatting helpers for the two markup dialects the bot speaks:
//! Telegram `MarkdownV2` and CommonMark (Matrix).
//!
//! Backslash escapes of ASCII punctuation are valid in both dialects, so the
//! escaped text is shared and only bold and code blocks differ.
//! See: https://core.telegram.org/bots/api#markdownv2-style

use regex::Regex;
use std::sync::LazyLock;

static SPECIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([_*\[\]()~`>#+\-=|{}.!\\])").unwrap());
static HTML_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>|[^<]+|<").unwrap());
static HTML_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static TAG_NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^<\s*(/?)\s*([a-zA-Z0-9]+)").unwrap());
static HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)href\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap());
static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Markup {
    /// Telegram `MarkdownV2`
    TelegramV2,
    /// CommonMark
    Markdown,
}

/// Escapes every character with a special meaning in the markup.
pub fn escape(_markup: Markup, text: &str) -> String {
    SPECIAL.replace_all(text, r"\$1").into_owned()
}

/// Escapes text placed inside a fenced code block.
pub fn escape_code(markup: Markup, text: &str) -> String {
    match markup {
        Markup::TelegramV2 => text.replace('\\', "\\\\").replace('`', "\\`"),
        Markup::Markdown => text.to_string(),
    }
}

/// Escapes a link target placed inside `(...)`.
pub fn escape_url(_markup: Markup, url: &str) -> String {
    url.replace('\\', "\\\\").replace(')', "\\)")
}

pub fn bold(markup: Markup, text: &str) -> String {
    match markup {
        Markup::TelegramV2 => format!("*{text}*"),
        Markup::Markdown => format!("**{text}**"),
    }
}

pub fn link(markup: Markup, text: &str, url: &str) -> String {
    format!("[{}]({})", text, escape_url(markup, url))
}

pub fn code_block(markup: Markup, text: &str) -> String {
    format!("```\n{}\n```", escape_code(markup, text))
}

/// Decodes the HTML entities found in feed show notes.
pub fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures| {
            let name = &caps[1];
            let decoded = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match name {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some(' '),
                    "ndash" => Some('–'),
                    "mdash" => Some('—'),
                    "hellip" => Some('…'),
                    "auml" => Some('ä'),
                    "ouml" => Some('ö'),
                    "uuml" => Some('ü'),
                    "Auml" => Some('Ä'),
                    "Ouml" => Some('Ö'),
                    "Uuml" => Some('Ü'),
                    "szlig" => Some('ß'),
                    _ => None,
                }
            };
            decoded
                .map(|c| c.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Strips all tags and decodes entities, leaving plain text.
pub fn strip_html(html: &str) -> String {
    let without_comments = HTML_COMMENT.replace_all(html, "");
    let mut out = String::new();
    for token in HTML_TOKEN.find_iter(&without_comments) {
        let token = token.as_str();
        if token.starts_with('<') && token.len() > 1 {
            if TAG_NAME
                .captures(token)
                .is_some_and(|c| c[2].eq_ignore_ascii_case("br") || c[2].eq_ignore_ascii_case("p"))
            {
                out.push('\n');
            }
            continue;
        }
        out.push_str(&decode_entities(token));
    }
    out
}

/// Converts a show-notes HTML fragment to the given markup.
///
/// Links, bold, italics and line breaks are kept; every other tag is dropped.
pub fn html_to_markup(markup: Markup, html: &str) -> String {
    let bold_marker = match markup {
        Markup::TelegramV2 => "*",
        Markup::Markdown => "**",
    };
    let without_comments = HTML_COMMENT.replace_all(html, "");
    let mut out = String::new();
    let mut bold_open = false;
    let mut italic_open = false;
    let mut open_links: Vec<Option<String>> = Vec::new();

    // Fragments may be cut out of a larger document, so unmatched tags are
    // ignored and anything still open is closed at the end.
    for token in HTML_TOKEN.find_iter(&without_comments) {
        let token = token.as_str();
        let Some(tag) = TAG_NAME.captures(token).filter(|_| token.starts_with('<')) else {
            out.push_str(&escape(markup, &decode_entities(token)));
            continue;
        };
        let closing = !tag[1].is_empty();
        match tag[2].to_ascii_lowercase().as_str() {
            "strong" | "b" if closing == bold_open => {
                out.push_str(bold_marker);
                bold_open = !bold_open;
            }
            "em" | "i" if closing == italic_open => {
                out.push('_');
                italic_open = !italic_open;
            }
            "br" => out.push('\n'),
            "a" if !closing => {
                let href = HREF
                    .captures(token)
                    .and_then(|c| c.get(1).or_else(|| c.get(2)))
                    .map(|m| decode_entities(m.as_str()));
                if href.is_some() {
                    out.push('[');
                }
                open_links.push(href);
            }
            "a" => {
                if let Some(Some(href)) = open_links.pop() {
                    out.push_str(&format!("]({})", escape_url(markup, &href)));
                }
            }
            _ => {}
        }
    }

    while let Some(href) = open_links.pop() {
        if let Some(href) = href {
            out.push_str(&format!("]({})", escape_url(markup, &href)));
        }
    }
    let mut out = out.trim().to_string();
    if italic_open {
        out.push('_');
    }
    if bold_open {
        out.push_str(bold_marker);
    }
    out
}

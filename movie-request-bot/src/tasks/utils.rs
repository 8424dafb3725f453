use chat_flow::{Button, Keyboard, Reply};

use super::types::{messages, tokens};
use crate::models::{MovieDetails, MovieSummary};

/// Telegram rejects photo captions longer than this
pub const MAX_CAPTION_CHARS: usize = 1024;

/// `Title (Year)`, or just the title when the year is unknown
pub fn listing_label(summary: &MovieSummary) -> String {
    if summary.release_year.is_empty() {
        summary.title.clone()
    } else {
        format!("{} ({})", summary.title, summary.release_year)
    }
}

/// One search hit: poster with caption when there is a poster, text otherwise
pub fn render_summary(summary: &MovieSummary) -> Reply {
    let buttons = vec![vec![Button::new(
        messages::SELECT,
        tokens::selection(summary.id),
    )]];
    let label = listing_label(summary);

    match &summary.poster_url {
        Some(url) => Reply::photo(url, label, buttons),
        None => Reply::text_with_buttons(label, buttons),
    }
}

pub fn details_text(details: &MovieDetails) -> String {
    format!(
        "Title: {}\nRelease Date: {}\nOverview: {}",
        details.title, details.release_date, details.overview
    )
}

pub fn render_details(details: &MovieDetails) -> Reply {
    let text = details_text(details);
    match &details.poster_url {
        Some(url) => Reply::photo(url, truncate_chars(&text, MAX_CAPTION_CHARS), Vec::new()),
        None => Reply::text(text),
    }
}

pub fn confirmation_prompt(details: &MovieDetails) -> Reply {
    let buttons: Keyboard = vec![vec![
        Button::new(messages::YES, tokens::confirm(details.id)),
        Button::new(messages::NO, tokens::CANCEL),
    ]];
    Reply::text_with_buttons(messages::CONFIRM_PROMPT, buttons)
}

pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(poster: Option<&str>, year: &str) -> MovieSummary {
        MovieSummary {
            id: 438631,
            title: "Dune".to_string(),
            release_year: year.to_string(),
            poster_url: poster.map(str::to_string),
        }
    }

    #[test]
    fn summary_without_poster_falls_back_to_text_with_same_button() {
        let with_poster = render_summary(&summary(Some("https://img/p.jpg"), "2021"));
        let without = render_summary(&summary(None, "2021"));

        assert!(matches!(with_poster, Reply::Photo { .. }));
        assert!(matches!(without, Reply::Text { .. }));
        assert_eq!(with_poster.buttons(), without.buttons());
        assert_eq!(without.buttons()[0][0].token, "438631");
        assert_eq!(without.body(), "Dune (2021)");
    }

    #[test]
    fn empty_year_renders_title_only() {
        assert_eq!(listing_label(&summary(None, "")), "Dune");
    }

    #[test]
    fn long_captions_are_cut() {
        let details = MovieDetails {
            id: 1,
            title: "Long".to_string(),
            release_date: "2000-01-01".to_string(),
            overview: "é".repeat(2000),
            poster_url: Some("https://img/p.jpg".to_string()),
        };

        let rendered = render_details(&details);
        assert_eq!(rendered.body().chars().count(), MAX_CAPTION_CHARS);
        assert!(rendered.body().ends_with('…'));
    }
}

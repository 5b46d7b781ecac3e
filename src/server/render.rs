//! HTML rendering for recommendation responses.
//!
//! Every dynamic value (user text, tags, destination fields) goes through
//! [`html_escape`] before it is written into markup.

use crate::models::{Destination, Recommendation, TagSet};

const BACK_LINK: &str = "<a href=\"/\">← Back</a>";

/// Placeholder shown instead of user text for image-only requests.
pub const IMAGE_ONLY: &str = "[image only]";

/// Message shown when no tags could be derived.
pub const NO_TAGS_MESSAGE: &str = "No tags detected. Please enter text or upload an image.";

/// Message shown when the query returned nothing (or failed).
pub const NO_SUGGESTIONS_MESSAGE: &str = "No suggestions found.";

pub(crate) fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Render any recommendation outcome.
pub fn render_recommendation(recommendation: &Recommendation) -> String {
    match recommendation {
        Recommendation::NoTags => render_no_tags(),
        Recommendation::Suggestions {
            said,
            tags,
            destinations,
        } => render_suggestions(said.as_deref(), tags, destinations),
    }
}

pub fn render_no_tags() -> String {
    format!("{}<h2>{}</h2>", BACK_LINK, NO_TAGS_MESSAGE)
}

fn render_suggestions(said: Option<&str>, tags: &TagSet, destinations: &[Destination]) -> String {
    let said = said.map(html_escape).unwrap_or_else(|| IMAGE_ONLY.to_string());

    let mut html = format!("{}<br><br>", BACK_LINK);
    html.push_str(&format!("<p><strong>You said:</strong> {}</p>", said));
    html.push_str(&format!(
        "<p><strong>Tags:</strong> {}</p>",
        html_escape(&tags.joined())
    ));
    html.push_str("<p><strong>Suggested Places:</strong></p>");

    if destinations.is_empty() {
        html.push_str(&format!("<p>{}</p>", NO_SUGGESTIONS_MESSAGE));
        return html;
    }

    html.push_str("<ul>");
    for destination in destinations {
        html.push_str(&format!(
            "<li><strong>{}</strong>: {}</li>",
            html_escape(&destination.name),
            html_escape(&destination.description)
        ));
    }
    html.push_str("</ul>");

    html
}

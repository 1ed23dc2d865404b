//! Plain text to HTML conversion for model replies.
//!
//! Model output is mostly prose with the occasional `**bold**` span or a
//! bullet/numbered list. The result is always a single top-level `<p>`,
//! `<ul>` or `<ol>` element.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

const BREAK: &str = "<br>";

/// Replies larger than this are not worth running through the regex chain.
pub const MAX_INPUT_BYTES: usize = 1024 * 1024;

static BOLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern must compile"));

static BULLET_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[*-]\s+(.*)$").expect("bullet pattern must compile"));

static NUMBERED_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[1-9]\d*\.\s+(.*)$").expect("numbered pattern must compile"));

static REPEATED_BREAKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:<br>){2,}").expect("break pattern must compile"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("input of {len} bytes exceeds the {limit} byte formatting limit")]
    TooLarge { len: usize, limit: usize },
}

/// Convert a model reply into an HTML fragment.
///
/// Steps, in order: newlines become `<br>`, `**x**` within a single line
/// becomes `<strong>x</strong>`, list lines (`*`, `-`, `N.`) are gathered into one
/// `<ul>`/`<ol>`, anything else is wrapped in `<p>`, and runs of `<br>` are
/// collapsed.
pub fn format_response(text: &str) -> Result<String, FormatError> {
    if text.len() > MAX_INPUT_BYTES {
        return Err(FormatError::TooLarge {
            len: text.len(),
            limit: MAX_INPUT_BYTES,
        });
    }

    let text = text.replace("\r\n", "\n").replace('\n', BREAK);
    // Bold is matched per line so a `<strong>` never straddles a list item.
    let lines: Vec<String> = text
        .split(BREAK)
        .map(|line| BOLD.replace_all(line, "<strong>$1</strong>").into_owned())
        .collect();

    let html = match collect_list(&lines) {
        Some(list) => list,
        None => wrap_paragraph(&lines.join(BREAK)),
    };

    Ok(REPEATED_BREAKS.replace_all(&html, BREAK).into_owned())
}

/// HTML to show when formatting failed: the raw reply, escaped, behind a
/// visible marker.
pub fn render_format_fallback(text: &str) -> String {
    format!(
        "<p><i>Error formatting response.</i>{}{}</p>",
        BREAK,
        escape_html(text)
    )
}

pub(crate) fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Build a list element from the list lines, or `None` when there are no
/// non-empty list items.
///
/// Indented lines directly after an item continue it. Every other non-list
/// line is discarded once a list is emitted: an intro such as "Here are the
/// steps:" or a closing remark after the last item does not appear in the
/// output at all.
fn collect_list(lines: &[String]) -> Option<String> {
    let mut items: Vec<String> = Vec::new();
    let mut ordered = false;
    let mut in_item = false;

    for line in lines {
        if let Some(caps) = NUMBERED_ITEM.captures(line) {
            ordered = true;
            items.push(caps[1].trim().to_string());
            in_item = true;
        } else if let Some(caps) = BULLET_ITEM.captures(line) {
            items.push(caps[1].trim().to_string());
            in_item = true;
        } else if in_item && line.starts_with(char::is_whitespace) && !line.trim().is_empty() {
            if let Some(last) = items.last_mut() {
                if !last.is_empty() {
                    last.push(' ');
                }
                last.push_str(line.trim());
            }
        } else {
            in_item = false;
        }
    }

    let body: String = items
        .iter()
        .filter(|item| !item.is_empty())
        .map(|item| format!("<li>{}</li>", item))
        .collect();

    if body.is_empty() {
        return None;
    }

    let tag = if ordered { "ol" } else { "ul" };
    Some(format!("<{tag}>{body}</{tag}>"))
}

fn wrap_paragraph(text: &str) -> String {
    let mut inner = text;
    while let Some(rest) = inner.strip_prefix(BREAK) {
        inner = rest;
    }
    while let Some(rest) = inner.strip_suffix(BREAK) {
        inner = rest;
    }
    format!("<p>{}</p>", inner)
}

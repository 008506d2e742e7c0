//! One `<Slot>: <value>` line.
//!
//! Handles the decorations models like to add: bullets, numbered lists,
//! markdown bold around the label, and asides such as "Layering (if
//! applicable)". Slot names are open vocabulary in any script.

use ootd_core::{Slot, split_leading_item};
use regex::Regex;
use std::sync::LazyLock;

const MAX_LABEL_CHARS: usize = 40;
const MAX_LABEL_WORDS: usize = 5;

static SLOT_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^[\s\-*•>]*",
        r"(?:\d+[.)]\s+)?",
        r"(?:\*\*|__)?",
        r"(?P<label>[^:]*?)",
        r"(?:\*\*|__)?\s*:",
        r"(?P<value>.*)$"
    ))
    .unwrap()
});

static ASIDE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)]*\)").unwrap());

static LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\p{L}[\p{L}\p{M}\p{N} &/'’\-]*$").unwrap());

/// Parse a single line into a slot.
///
/// `None` for lines that are not slot lines, and for slot lines whose value
/// is empty. A value starting with `Item <n>` becomes the item reference and
/// the rest of the line its note; a value with a malformed or overflowing
/// number stays free text.
///
/// A label too long to be a slot name is normally prose and the line is
/// skipped. When the value is an item reference the line is kept anyway,
/// keyed by the last word before the colon.
pub fn parse_slot_line(line: &str) -> Option<Slot> {
    let caps = SLOT_LINE_RE.captures(line)?;
    let value = clean_text(&caps["value"]);
    if value.is_empty() {
        return None;
    }
    let leading = split_leading_item(value);

    let key = match clean_label(&caps["label"]) {
        Some(key) => key,
        None if leading.is_some() => last_word(&caps["label"])?,
        None => return None,
    };

    match leading {
        Some((id, rest)) => {
            let note = clean_note(rest);
            Some(Slot {
                key,
                cloth_id: Some(id),
                suggestion: (!note.is_empty()).then(|| note.to_string()),
            })
        }
        None => Some(Slot {
            key,
            cloth_id: None,
            suggestion: Some(value.to_string()),
        }),
    }
}

fn strip_asides(raw: &str) -> String {
    ASIDE_RE.replace_all(raw, " ").into_owned()
}

fn clean_label(raw: &str) -> Option<String> {
    let stripped = strip_asides(raw);
    let words: Vec<&str> = stripped.split_whitespace().collect();
    if words.is_empty() || words.len() > MAX_LABEL_WORDS {
        return None;
    }
    let label = words.join(" ");
    if label.chars().count() > MAX_LABEL_CHARS || !LABEL_RE.is_match(&label) {
        return None;
    }
    Some(label)
}

/// Last word of the label with surrounding punctuation trimmed.
fn last_word(raw: &str) -> Option<String> {
    strip_asides(raw)
        .split_whitespace()
        .rev()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .find(|w| w.chars().next().is_some_and(char::is_alphabetic))
        .map(str::to_string)
}

fn clean_text(raw: &str) -> &str {
    raw.trim().trim_matches(|c| c == '*' || c == '_').trim()
}

/// Text after an item token: drop separators like " - ", ", " or ":".
fn clean_note(raw: &str) -> &str {
    clean_text(raw)
        .trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '–' | '—' | ':' | ',' | ';' | '.'))
        .trim()
}

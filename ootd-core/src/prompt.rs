//! Prompt composition. Pure: no I/O, same inputs give the same prompt.
//!
//! The reply format requested here (`OUTFIT OPTION <n>:` headings, one
//! `<Slot>: Item <n>` line per slot) is what `ootd-parse` reads back. The
//! model is not guaranteed to follow it.

use crate::item_ref::format_item_token;
use crate::outfit::{OptionSet, Slot};
use crate::profile::Demographic;
use crate::snapshot::WardrobeSnapshot;

const TASK: &str = "Based on the wardrobe above, pick outfits that follow current fashion trends, \
suit the season and keep a cohesive colour palette. Use the category and sub-category of each \
item, since descriptions do not always classify an item correctly. Apply layering and accessory \
pairing where it fits.";

const FORMAT: &str = "Response format: give at least two outfit options. Use exactly this layout, \
one slot per line, and refer to wardrobe items only as \"Item <number>\" from the list above.

OUTFIT OPTION 1:
- Top: Item <number>
- Bottom: Item <number>
- Layering: Item <number>, only when layering is among the preferences
- Accessories: Item <number> if a suitable one exists, otherwise a short alternative
- Footwear: Item <number> if a matching one exists, otherwise a short alternative
- Styling suggestions: one or two sentences on colour, fit and accessorizing

OUTFIT OPTION 2:
- Top: Item <number>
- Bottom: Item <number>
- Layering: Item <number>, only when layering is among the preferences
- Accessories: Item <number> or a short alternative
- Footwear: Item <number> or a short alternative
- Styling suggestions: one or two sentences

Guidelines:
- Every option must differ from the others.
- Keep the colour palette coordinated with the preferences.
- Only add layering when the preferences ask for it.
- Balance casual, formal and seasonal needs, and mind how fabrics combine.";

const AVOID: &str = "Avoid repeating these combinations. Aim for fresh suggestions.";

/// Everything the prompt is built from.
#[derive(Debug, Clone, Copy)]
pub struct PromptParts<'a> {
    pub snapshot: &'a WardrobeSnapshot,
    pub demographic: Option<&'a Demographic>,
    /// Output of `normalize_preferences`.
    pub preferences: &'a str,
    /// Previously returned option sets, most recent last.
    pub history: &'a [OptionSet],
}

pub fn compose_prompt(parts: &PromptParts<'_>) -> String {
    let mut out = String::with_capacity(parts.snapshot.text.len() + 2048);
    out.push_str(&parts.snapshot.text);

    out.push_str("\nTask: ");
    if let Some(preamble) = demographic_preamble(parts.demographic) {
        out.push_str(&preamble);
        out.push(' ');
    }
    out.push_str(TASK);

    out.push_str("\n\nPreferences to consider:\n");
    let prefs = parts.preferences.trim();
    out.push_str(if prefs.is_empty() { "none" } else { prefs });

    out.push_str("\n\n");
    out.push_str(FORMAT);

    let history = render_history(parts.history);
    if !history.is_empty() {
        out.push_str("\n\nAlready suggested outfit combinations:\n");
        out.push_str(&history);
        out.push('\n');
        out.push_str(AVOID);
    }

    out.push('\n');
    out
}

/// "Hi, I am a <gender>, age <age>." with whichever parts are known.
pub fn demographic_preamble(demographic: Option<&Demographic>) -> Option<String> {
    let d = demographic?;
    match (d.gender.as_deref(), d.age) {
        (Some(g), Some(a)) => Some(format!("Hi, I am a {g}, age {a}.")),
        (Some(g), None) => Some(format!("Hi, I am a {g}.")),
        (None, Some(a)) => Some(format!("Hi, I am age {a}.")),
        (None, None) => None,
    }
}

/// One line per previously suggested option:
/// `Option 1: Top: Item 17 | Bottom: Item 19 | Accessories: a belt`.
pub fn render_history(history: &[OptionSet]) -> String {
    let many = history.len() > 1;
    let mut lines = Vec::new();
    for (k, set) in history.iter().enumerate() {
        for (label, option) in set.labeled() {
            if option.is_empty() {
                continue;
            }
            let slots: Vec<String> = option.slots.iter().map(render_slot).collect();
            let label = if many { format!("Set {} {}", k + 1, label) } else { label };
            lines.push(format!("{}: {}", label, slots.join(" | ")));
        }
    }
    lines.join("\n")
}

fn render_slot(slot: &Slot) -> String {
    match (slot.cloth_id, slot.suggestion.as_deref()) {
        (Some(id), Some(note)) => format!("{}: {} ({})", slot.key, format_item_token(id), note),
        (Some(id), None) => format!("{}: {}", slot.key, format_item_token(id)),
        (None, Some(text)) => format!("{}: {}", slot.key, text),
        (None, None) => slot.key.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::garment::Garment;
    use crate::outfit::OutfitOption;

    fn snapshot() -> WardrobeSnapshot {
        WardrobeSnapshot::build(&[Garment::new(17, 1).with_category("Tops")]).unwrap()
    }

    fn previous() -> OptionSet {
        OptionSet::new(vec![OutfitOption::new(vec![
            Slot::item("Top", 17),
            Slot::item("Bottom", 19).with_note("cuffed"),
            Slot::text("Accessories", "a woven belt"),
        ])])
    }

    #[test]
    fn test_prompt_sections_in_order() {
        let snap = snapshot();
        let d = Demographic::new("female", 28);
        let history = vec![previous()];
        let prompt = compose_prompt(&PromptParts {
            snapshot: &snap,
            demographic: Some(&d),
            preferences: "Style: Casual",
            history: &history,
        });

        let idx = |needle: &str| prompt.find(needle).unwrap_or_else(|| panic!("missing {needle}"));
        assert!(prompt.starts_with("Wardrobe Details:\nItem 17\n"));
        assert!(idx("Hi, I am a female, age 28.") < idx("Preferences to consider:\nStyle: Casual"));
        assert!(idx("OUTFIT OPTION 1:") < idx("OUTFIT OPTION 2:"));
        assert!(idx("Already suggested outfit combinations:") > idx("OUTFIT OPTION 2:"));
        assert!(prompt.contains("Option 1: Top: Item 17 | Bottom: Item 19 (cuffed) | Accessories: a woven belt"));
        assert!(prompt.contains(AVOID));
    }

    #[test]
    fn test_missing_demographic_omits_preamble() {
        let snap = snapshot();
        let prompt = compose_prompt(&PromptParts {
            snapshot: &snap,
            demographic: None,
            preferences: "",
            history: &[],
        });
        assert!(!prompt.contains("Hi, I am"));
        assert!(prompt.contains("Task: Based on the wardrobe above"));
        assert!(prompt.contains("Preferences to consider:\nnone"));
        assert!(!prompt.contains("Already suggested"));
    }

    #[test]
    fn test_partial_demographic_preamble() {
        let d = Demographic {
            gender: None,
            age: Some(31),
        };
        assert_eq!(demographic_preamble(Some(&d)).as_deref(), Some("Hi, I am age 31."));
        assert_eq!(demographic_preamble(Some(&Demographic::default())), None);
    }

    #[test]
    fn test_history_with_several_sets_is_prefixed() {
        let rendered = render_history(&[previous(), OptionSet::new(vec![OutfitOption::default()])]);
        assert!(rendered.starts_with("Set 1 Option 1: Top: Item 17"));
        assert_eq!(rendered.lines().count(), 1);
    }
}

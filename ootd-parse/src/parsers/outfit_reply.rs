//! Whole-reply parser: split on `OUTFIT OPTION <n>` headings, read slot lines
//! in each segment.
//!
//! Expected reply (the model may add anything around it):
//!   Here are two looks for today!
//!   OUTFIT OPTION 1:
//!   - Top: Item 17
//!   - Accessories: none found, try a belt

use ootd_core::{OptionSet, OutfitOption};
use regex::Regex;
use std::sync::LazyLock;

use crate::parsers::slot_line::parse_slot_line;
use crate::types::ParsedReply;

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)OUTFIT\s+OPTION\s*#?\s*\d+\s*:?").unwrap());

/// Parse a model reply into outfit options, one per heading, labeled by
/// position ("Option 1" is the first heading found, whatever its number).
///
/// No headings means no options; that is a valid, empty result.
pub fn parse_outfit_reply(text: &str) -> OptionSet {
    parse_outfit_reply_detailed(text).options
}

pub fn parse_outfit_reply_detailed(text: &str) -> ParsedReply {
    let mut sections = HEADING_RE.split(text);
    let preamble = sections.next().unwrap_or("");

    let mut options = Vec::new();
    let mut unread_lines = 0;
    for section in sections {
        let mut slots = Vec::new();
        for line in section.lines() {
            match parse_slot_line(line) {
                Some(slot) => slots.push(slot),
                None if is_blank(line) => {}
                None => unread_lines += 1,
            }
        }
        options.push(OutfitOption::new(slots));
    }

    ParsedReply {
        options: OptionSet::new(options),
        preamble_lines: preamble.lines().filter(|l| !is_blank(l)).count(),
        unread_lines,
    }
}

/// Blank, or only markdown leftovers of a heading line (`**`, `---`).
fn is_blank(line: &str) -> bool {
    line.chars().all(|c| c.is_whitespace() || matches!(c, '*' | '_' | '-' | '#'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ootd_core::Slot;
    use serde_json::json;

    #[test]
    fn test_reference_reply() {
        let reply = "OUTFIT OPTION 1:\n- Top: Item 17\n- Bottom: Item 19\n- Accessories: none found, try a belt";
        let set = parse_outfit_reply(reply);
        assert_eq!(
            serde_json::to_value(&set).unwrap(),
            json!({
                "Option 1": [
                    {"key": "Top", "clothId": 17, "suggestion": null},
                    {"key": "Bottom", "clothId": 19, "suggestion": null},
                    {"key": "Accessories", "clothId": null, "suggestion": "none found, try a belt"}
                ]
            })
        );
    }

    #[test]
    fn test_no_headings_is_empty() {
        assert!(parse_outfit_reply("").is_empty());
        assert!(parse_outfit_reply("Top: Item 17\nBottom: Item 19").is_empty());
        assert!(parse_outfit_reply("Option 1:\n- Top: Item 17").is_empty());
    }

    #[test]
    fn test_preamble_discarded_and_counted() {
        let reply = "Sure! Here are some looks.\nNote: based on your wardrobe\n\nOUTFIT OPTION 1:\n- Top: Item 1";
        let parsed = parse_outfit_reply_detailed(reply);
        assert_eq!(parsed.preamble_lines, 2);
        assert_eq!(parsed.options.len(), 1);
        assert_eq!(parsed.slot_count(), 1);
    }

    #[test]
    fn test_empty_segment_kept() {
        let reply = "OUTFIT OPTION 1:\nnothing useful here\nOUTFIT OPTION 2:\n- Top: Item 3";
        let parsed = parse_outfit_reply_detailed(reply);
        let set = &parsed.options;
        assert_eq!(set.len(), 2);
        assert!(set.get("Option 1").unwrap().is_empty());
        assert_eq!(set.get("Option 2").unwrap().slots, vec![Slot::item("Top", 3)]);
        assert_eq!(parsed.unread_lines, 1);
    }

    #[test]
    fn test_heading_variants() {
        let reply = "### Outfit Option 1\n- Top: Item 1\n\n**outfit option 2:**\n- Top: Item 2\n\nOUTFIT OPTION #3 - Weekend\nTop: Item 3";
        let set = parse_outfit_reply(reply);
        assert_eq!(set.len(), 3);
        assert_eq!(set.options()[0].slots, vec![Slot::item("Top", 1)]);
        assert_eq!(set.options()[1].slots, vec![Slot::item("Top", 2)]);
        assert_eq!(set.options()[2].slots, vec![Slot::item("Top", 3)]);
    }

    #[test]
    fn test_labels_follow_position_not_heading_number() {
        let set = parse_outfit_reply("OUTFIT OPTION 4:\nTop: Item 1\nOUTFIT OPTION 9:\nTop: Item 2");
        let labels: Vec<String> = set.labeled().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["Option 1", "Option 2"]);
    }

    #[test]
    fn test_full_model_style_reply() {
        let reply = r#"Here are two fresh looks for today:

- OUTFIT OPTION 1:
    - Top: Item 17
    - Bottom: Item 19
    - Layering (if applicable): Not needed today.
    - Accessories: Item 23, Item 24
    - Footwear: White leather sneakers would complement this look.
    - Styling suggestions: Half-tuck the tee to define the waist.

- OUTFIT OPTION 2:
    - Top: Item 31 (linen shirt)
    - Bottom: Item 19
    - Footwear: Item abc
"#;
        let set = parse_outfit_reply(reply);
        assert_eq!(set.len(), 2);

        let first = &set.options()[0].slots;
        assert_eq!(first.len(), 6);
        assert_eq!(first[2], Slot::text("Layering", "Not needed today."));
        assert_eq!(first[3], Slot::item("Accessories", 23).with_note("Item 24"));
        assert_eq!(first[5].key, "Styling suggestions");

        let second = &set.options()[1].slots;
        assert_eq!(second[0], Slot::item("Top", 31).with_note("(linen shirt)"));
        assert_eq!(second[2], Slot::text("Footwear", "Item abc"));
        assert_eq!(set.item_refs().into_iter().collect::<Vec<_>>(), vec![17, 19, 23, 31]);
    }

    #[test]
    fn test_garbage_never_panics() {
        let inputs = [
            "OUTFIT OPTION",
            "OUTFIT OPTION 1",
            "OUTFIT OPTION 1:::::",
            ":\n:\n::",
            "OUTFIT OPTION 1:\n- : Item\n- Top: Item\n- Top: Item -1",
            "\u{0}\u{feff}OUTFIT OPTION 2:\r\n- Top: Item 5\r\n",
            "OUTFIT OPTION 1:\n- Top: Item 99999999999999999999999999999",
        ];
        for input in inputs {
            let parsed = parse_outfit_reply_detailed(input);
            assert!(parsed.options.len() <= 1, "{input:?}");
        }
        assert_eq!(
            parse_outfit_reply("\u{feff}OUTFIT OPTION 2:\r\n- Top: Item 5\r\n").options()[0].slots,
            vec![Slot::item("Top", 5)]
        );
    }
}

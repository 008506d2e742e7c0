//! The `Item <n>` token.
//!
//! The wardrobe snapshot labels every garment with this token, the model is
//! asked to answer with it, and both the reply parser and the resolver scan
//! for it. All three must agree on its shape, so it lives here once.
//!
//! Two readings exist. In the snapshot a token only counts at the start of a
//! line. In model prose a token counts anywhere, and the plural form lists
//! several ids: `Items 23 and 24`, `items 3, 5 & 8`.

use regex::Regex;
use std::sync::LazyLock;

use crate::garment::GarmentId;

/// `Item 17`, `item 17`, `Item #17`, `Item17`, opening a line.
static SNAPSHOT_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^Item\s*#?\s*(\d+)\b").unwrap());

/// A singular token anywhere, or `Items` followed by a list of numbers.
static MENTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)\bItem(?:",
        r"\s*#?\s*(?P<one>\d+)",
        r"|s\s*#?\s*(?P<many>\d+(?:(?:\s*[,&]\s*(?:and\s+)?|\s+and\s+)#?\s*\d+)*)",
        r")\b"
    ))
    .unwrap()
});

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Same token, anchored at the start of a slot value. Group 2 is whatever
/// follows the number on the same line.
static LEADING_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Item\s*#?\s*(\d+)\b(.*)$").unwrap());

/// Render the token for a garment id.
pub fn format_item_token(id: GarmentId) -> String {
    format!("Item {id}")
}

/// Garment ids labelled by line-opening `Item <n>` tokens, in order of
/// appearance: the ids a wardrobe snapshot renders. Numbers that do not fit a
/// `GarmentId` are skipped.
pub fn item_ids_in(text: &str) -> Vec<GarmentId> {
    SNAPSHOT_TOKEN_RE
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse().ok())
        .collect()
}

/// Every garment id mentioned in free text, singular or plural form, in order
/// of appearance.
pub fn mentioned_item_ids(text: &str) -> Vec<GarmentId> {
    MENTION_RE
        .captures_iter(text)
        .flat_map(|caps| mention_ids(&caps))
        .collect()
}

fn mention_ids(caps: &regex::Captures) -> Vec<GarmentId> {
    match (caps.name("one"), caps.name("many")) {
        (Some(one), _) => one.as_str().parse().ok().into_iter().collect(),
        (None, Some(many)) => NUMBER_RE
            .find_iter(many.as_str())
            .filter_map(|m| m.as_str().parse().ok())
            .collect(),
        (None, None) => Vec::new(),
    }
}

/// Split a slot value that starts with an item token into the id and the
/// trailing note.
///
/// Returns `None` when the value does not start with the token or the number
/// overflows; callers then treat the whole value as free text.
pub fn split_leading_item(value: &str) -> Option<(GarmentId, &str)> {
    let caps = LEADING_ITEM_RE.captures(value.trim_start())?;
    let id: GarmentId = caps.get(1)?.as_str().parse().ok()?;
    let rest = caps.get(2).map(|m| m.as_str()).unwrap_or("");
    Some((id, rest))
}

/// Replace every item mention in `text` using `lookup`.
///
/// A mention for which `lookup` finds nothing is left as written. In a plural
/// list each id is replaced on its own and the list is rejoined as
/// "a, b and c", with unresolved ids spelled `Item <n>`.
pub fn replace_item_tokens<F>(text: &str, mut lookup: F) -> String
where
    F: FnMut(GarmentId) -> Option<String>,
{
    MENTION_RE
        .replace_all(text, |caps: &regex::Captures| {
            let ids = mention_ids(caps);
            let parts: Vec<(GarmentId, Option<String>)> =
                ids.into_iter().map(|id| (id, lookup(id))).collect();
            if parts.iter().all(|(_, found)| found.is_none()) {
                return caps[0].to_string();
            }
            let parts: Vec<String> = parts
                .into_iter()
                .map(|(id, found)| found.unwrap_or_else(|| format_item_token(id)))
                .collect();
            join_list(&parts)
        })
        .into_owned()
}

fn join_list(parts: &[String]) -> String {
    match parts {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_ids_in_snapshot_lines_only() {
        let text = "Item 4\nCategory Tops\n\nitem #12\nItem19\n   Description: pairs with Item 7";
        assert_eq!(item_ids_in(text), vec![4, 12, 19]);
    }

    #[test]
    fn test_overflowing_number_is_skipped() {
        assert_eq!(item_ids_in("Item 99999999999999999999999\nItem 2"), vec![2]);
        assert_eq!(mentioned_item_ids("Item 99999999999999999999999 and Item 2"), vec![2]);
    }

    #[test]
    fn test_mentions_singular_and_plural() {
        assert_eq!(mentioned_item_ids("pair item #12 with Item19"), vec![12, 19]);
        assert_eq!(mentioned_item_ids("Items 23 and 24"), vec![23, 24]);
        assert_eq!(mentioned_item_ids("try items 3, 5 & 8, or Item 9"), vec![3, 5, 8, 9]);
        assert_eq!(mentioned_item_ids("Item 17, 2 pairs"), vec![17]);
        assert_eq!(mentioned_item_ids("Items you own"), Vec::<GarmentId>::new());
    }

    #[test]
    fn test_split_leading_item() {
        assert_eq!(split_leading_item("Item 17"), Some((17, "")));
        assert_eq!(split_leading_item("  Item 17 - the blue one"), Some((17, " - the blue one")));
        assert_eq!(split_leading_item("Item abc"), None);
        assert_eq!(split_leading_item("wear Item 17"), None);
        assert_eq!(split_leading_item("Item 17abc"), None);
    }

    #[test]
    fn test_replace_item_tokens_partial() {
        let out = replace_item_tokens("pair Item 3 with Item 8", |id| {
            (id == 3).then(|| "linen, summer".to_string())
        });
        assert_eq!(out, "pair linen, summer with Item 8");
    }

    #[test]
    fn test_replace_plural_mentions() {
        let tags = |id| match id {
            23 => Some("silver watch".to_string()),
            24 => Some("brown belt".to_string()),
            _ => None,
        };
        assert_eq!(
            replace_item_tokens("Accessories: Items 23 and 24", tags),
            "Accessories: silver watch and brown belt"
        );
        assert_eq!(
            replace_item_tokens("Items 23, 40 and 24", tags),
            "silver watch, Item 40 and brown belt"
        );
        assert_eq!(replace_item_tokens("Items 40 and 41", tags), "Items 40 and 41");
    }
}

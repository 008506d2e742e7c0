//! Preference normalization: `{category, tag}` pairs from the request body
//! into the compact fragment embedded in the prompt.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preference {
    pub category: String,
    pub tag: String,
}

impl Preference {
    pub fn new(category: &str, tag: &str) -> Self {
        Self {
            category: category.to_string(),
            tag: tag.to_string(),
        }
    }

    /// Parse a `Category=Tag` command-line pair.
    pub fn parse_pair(s: &str) -> anyhow::Result<Self> {
        let (category, tag) = s
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("expected Category=Tag, got '{s}'"))?;
        Ok(Self::new(category.trim(), tag.trim()))
    }
}

/// Group tags by category (first-seen order), join tags within a category
/// with `", "` and categories with `","`.
///
/// `[Style/Casual, Color/Blue, Style/Street]` becomes
/// `"Style: Casual, Street,Color: Blue"`. No validation: any category and
/// tag text passes through.
pub fn normalize_preferences(prefs: &[Preference]) -> String {
    let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
    for p in prefs {
        match groups.iter_mut().find(|(c, _)| *c == p.category) {
            Some((_, tags)) => tags.push(p.tag.as_str()),
            None => groups.push((p.category.as_str(), vec![p.tag.as_str()])),
        }
    }

    groups
        .iter()
        .map(|(c, tags)| format!("{}: {}", c, tags.join(", ")))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_by_category_in_first_seen_order() {
        let prefs = vec![
            Preference::new("Style", "Casual"),
            Preference::new("Color", "Blue"),
            Preference::new("Style", "Street"),
        ];
        assert_eq!(normalize_preferences(&prefs), "Style: Casual, Street,Color: Blue");
    }

    #[test]
    fn test_empty_preferences() {
        assert_eq!(normalize_preferences(&[]), "");
    }

    #[test]
    fn test_arbitrary_text_passes_through() {
        let prefs = vec![Preference::new("", "a, b"), Preference::new("Mood!", "")];
        assert_eq!(normalize_preferences(&prefs), ": a, b,Mood!: ");
    }

    #[test]
    fn test_parse_pair() {
        assert_eq!(Preference::parse_pair("Occasion = Office").unwrap(), Preference::new("Occasion", "Office"));
        assert!(Preference::parse_pair("Office").is_err());
    }

    #[test]
    fn test_request_body_shape() {
        let prefs: Vec<Preference> =
            serde_json::from_str(r#"[{"category":"Layering","tag":"Jacket"}]"#).unwrap();
        assert_eq!(prefs, vec![Preference::new("Layering", "Jacket")]);
    }
}

//! Outfit options: the typed form of a model reply, before and after
//! item references are resolved against the wardrobe.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeSet;

use crate::garment::{Garment, GarmentId};

/// One labeled component of an outfit ("Top", "Footwear", ...).
///
/// The label is open vocabulary: whatever the model wrote before the colon.
/// At least one of `cloth_id` and `suggestion` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub key: String,
    pub cloth_id: Option<GarmentId>,
    pub suggestion: Option<String>,
}

impl Slot {
    /// A slot pointing at a wardrobe item.
    pub fn item(key: &str, id: GarmentId) -> Self {
        Self {
            key: key.to_string(),
            cloth_id: Some(id),
            suggestion: None,
        }
    }

    /// A free-text slot with no item reference.
    pub fn text(key: &str, suggestion: &str) -> Self {
        Self {
            key: key.to_string(),
            cloth_id: None,
            suggestion: Some(suggestion.to_string()),
        }
    }

    pub fn with_note(mut self, note: &str) -> Self {
        self.suggestion = Some(note.to_string());
        self
    }
}

/// One suggested look: an ordered list of slots. May be empty when the model
/// emitted a heading with nothing we could read under it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutfitOption {
    pub slots: Vec<Slot>,
}

impl OutfitOption {
    pub fn new(slots: Vec<Slot>) -> Self {
        Self { slots }
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Label of the option at zero-based `index`: "Option 1", "Option 2", ...
pub fn option_label(index: usize) -> String {
    format!("Option {}", index + 1)
}

/// All options produced by one model reply, in heading order.
///
/// Serializes as a JSON object keyed by [`option_label`], keys in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSet {
    options: Vec<OutfitOption>,
}

impl OptionSet {
    pub fn new(options: Vec<OutfitOption>) -> Self {
        Self { options }
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn options(&self) -> &[OutfitOption] {
        &self.options
    }

    pub fn get(&self, label: &str) -> Option<&OutfitOption> {
        self.labeled().find(|(l, _)| l == label).map(|(_, o)| o)
    }

    pub fn labeled(&self) -> impl Iterator<Item = (String, &OutfitOption)> {
        self.options
            .iter()
            .enumerate()
            .map(|(i, o)| (option_label(i), o))
    }

    /// Distinct structured item references across every slot.
    pub fn item_refs(&self) -> BTreeSet<GarmentId> {
        self.options
            .iter()
            .flat_map(|o| o.slots.iter())
            .filter_map(|s| s.cloth_id)
            .collect()
    }

    pub fn into_options(self) -> Vec<OutfitOption> {
        self.options
    }
}

impl Serialize for OptionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_labeled(&self.options, serializer)
    }
}

/// A resolved item reference: the full record when the id belongs to the
/// user's wardrobe, otherwise the number the model wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ClothRef {
    Record(Garment),
    Raw(GarmentId),
}

impl ClothRef {
    pub fn id(&self) -> GarmentId {
        match self {
            ClothRef::Record(g) => g.id,
            ClothRef::Raw(id) => *id,
        }
    }

    pub fn record(&self) -> Option<&Garment> {
        match self {
            ClothRef::Record(g) => Some(g),
            ClothRef::Raw(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedSlot {
    pub key: String,
    pub cloth_id: Option<ClothRef>,
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResolvedOption {
    pub slots: Vec<ResolvedSlot>,
}

/// Response shape of the suggestion endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedOptionSet {
    options: Vec<ResolvedOption>,
}

impl ResolvedOptionSet {
    pub fn new(options: Vec<ResolvedOption>) -> Self {
        Self { options }
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn options(&self) -> &[ResolvedOption] {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut [ResolvedOption] {
        &mut self.options
    }

    pub fn get(&self, label: &str) -> Option<&ResolvedOption> {
        self.options
            .iter()
            .enumerate()
            .find(|(i, _)| option_label(*i) == label)
            .map(|(_, o)| o)
    }
}

impl Serialize for ResolvedOptionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_labeled(&self.options, serializer)
    }
}

fn serialize_labeled<T: Serialize, S: Serializer>(items: &[T], serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(items.len()))?;
    for (i, item) in items.iter().enumerate() {
        map.serialize_entry(&option_label(i), item)?;
    }
    map.end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_slot_wire_shape() {
        let v = serde_json::to_value(Slot::item("Top", 17)).unwrap();
        assert_eq!(v, json!({"key": "Top", "clothId": 17, "suggestion": null}));
    }

    #[test]
    fn test_option_set_labels_keep_order() {
        let set = OptionSet::new((0..11).map(|_| OutfitOption::default()).collect());
        let s = serde_json::to_string(&set).unwrap();
        assert!(s.starts_with(r#"{"Option 1":[],"Option 2":[]"#));
        assert!(s.ends_with(r#""Option 10":[],"Option 11":[]}"#));
        assert!(set.get("Option 11").is_some());
        assert!(set.get("Option 12").is_none());
    }

    #[test]
    fn test_item_refs_are_distinct() {
        let set = OptionSet::new(vec![
            OutfitOption::new(vec![Slot::item("Top", 17), Slot::text("Shoes", "loafers")]),
            OutfitOption::new(vec![Slot::item("Top", 17), Slot::item("Bottom", 19)]),
        ]);
        assert_eq!(set.item_refs().into_iter().collect::<Vec<_>>(), vec![17, 19]);
    }

    #[test]
    fn test_cloth_ref_serializes_untagged() {
        let raw = ResolvedSlot {
            key: "Top".to_string(),
            cloth_id: Some(ClothRef::Raw(99)),
            suggestion: None,
        };
        assert_eq!(serde_json::to_value(&raw).unwrap()["clothId"], json!(99));

        let rec = ResolvedSlot {
            key: "Top".to_string(),
            cloth_id: Some(ClothRef::Record(Garment::new(17, 1).with_category("Tops"))),
            suggestion: None,
        };
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["clothId"]["id"], json!(17));
        assert_eq!(v["clothId"]["category"], json!("Tops"));
    }
}

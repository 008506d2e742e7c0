//! Wardrobe garments as stored in the `outfits` table.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub type GarmentId = i64;
pub type UserId = i64;

/// One catalogued wardrobe item owned by a user.
///
/// Every text field except `image_url` is nullable in storage; the
/// description comes from an external captioning step and may be missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Garment {
    pub id: GarmentId,
    #[serde(default)]
    pub user_id: UserId,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
}

impl Garment {
    pub fn new(id: GarmentId, user_id: UserId) -> Self {
        Self {
            id,
            user_id,
            image_url: String::new(),
            category: None,
            subcategory: None,
            description: None,
            tags: None,
        }
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn with_subcategory(mut self, subcategory: &str) -> Self {
        self.subcategory = Some(subcategory.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_tags(mut self, tags: &str) -> Self {
        self.tags = Some(tags.to_string());
        self
    }

    pub fn with_image_url(mut self, url: &str) -> Self {
        self.image_url = url.to_string();
        self
    }

    /// Tag string if present and non-blank.
    pub fn tag_text(&self) -> Option<&str> {
        self.tags.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// Rank used by the wardrobe organizer: Tops, Bottoms, Shoes, then the rest.
pub fn organizer_rank(category: Option<&str>) -> u8 {
    match category {
        Some("Tops") => 1,
        Some("Bottoms") => 2,
        Some("Shoes") => 3,
        _ => 4,
    }
}

/// Sort garments for the organizer view: by rank, then category name.
///
/// The sort is stable, so garments within one category keep store order.
pub fn sort_for_organizer(garments: &mut [Garment]) {
    garments.sort_by(|a, b| {
        let (ca, cb) = (a.category.as_deref(), b.category.as_deref());
        match organizer_rank(ca).cmp(&organizer_rank(cb)) {
            Ordering::Equal => ca.cmp(&cb),
            other => other,
        }
    });
}

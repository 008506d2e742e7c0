//! Wardrobe snapshot: a user's garments rendered as numbered text for the
//! model.
//!
//! Wire format, one block per garment, blank line between blocks:
//!
//! ```text
//! Item 17
//! Category Tops
//! Sub-category Casual
//!    Description: Blue cotton tee
//! ```
//!
//! The `Item <id>` line is what the reply parser and the resolver key off.

use crate::garment::{Garment, GarmentId};
use crate::item_ref::format_item_token;

pub const SNAPSHOT_HEADER: &str = "Wardrobe Details:\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WardrobeSnapshot {
    pub text: String,
    /// Garment ids in rendered order.
    pub ids: Vec<GarmentId>,
}

impl WardrobeSnapshot {
    /// Render garments in the order given. Returns `None` for an empty
    /// wardrobe: there is nothing to suggest from.
    pub fn build(garments: &[Garment]) -> Option<Self> {
        if garments.is_empty() {
            return None;
        }

        let mut text = String::from(SNAPSHOT_HEADER);
        let mut ids = Vec::with_capacity(garments.len());
        for g in garments {
            text.push_str(&render_item(g));
            ids.push(g.id);
        }

        Some(Self { text, ids })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

fn render_item(g: &Garment) -> String {
    format!(
        "{}\nCategory {}\nSub-category {}\n   Description: {}\n\n",
        format_item_token(g.id),
        field(&g.category),
        field(&g.subcategory),
        field(&g.description),
    )
}

/// Field text on a single line, so a stored value can never start a new
/// `Item <n>` or `Category` line of its own.
fn field(v: &Option<String>) -> String {
    v.as_deref()
        .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}

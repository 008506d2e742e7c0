//! Reference resolution: swap item numbers the model wrote for the garment
//! records they point at.
//!
//! Misses are never errors. A number that is not in the user's wardrobe (a
//! hallucinated or stale reference) stays as the raw number.

use std::collections::{BTreeSet, HashMap};

use ootd_core::{
    ClothRef, Garment, GarmentId, OptionSet, ResolvedOption, ResolvedOptionSet, ResolvedSlot,
    UserId, mentioned_item_ids, replace_item_tokens,
};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::store::GarmentStore;

pub type RecordMap = HashMap<GarmentId, Garment>;

/// Resolve every structured reference with one batched lookup, then rewrite
/// `Item <n>` mentions inside suggestion text.
///
/// Only the structured lookup can fail the call. The text rewrite is
/// cosmetic: if its lookup fails the text is left untouched.
pub async fn resolve_options(
    store: &dyn GarmentStore,
    user_id: UserId,
    options: &OptionSet,
) -> Result<ResolvedOptionSet, StoreError> {
    let ids: Vec<GarmentId> = options.item_refs().into_iter().collect();
    let mut records = lookup(store, user_id, &ids).await?;

    let mut resolved = apply_records(options, &records);
    let dangling = ids.iter().filter(|id| !records.contains_key(*id)).count();
    if dangling > 0 {
        debug!(user_id, dangling, "item references not found in wardrobe");
    }

    let extra: Vec<GarmentId> = mentioned_ids(options)
        .into_iter()
        .filter(|id| !records.contains_key(id))
        .collect();
    if !extra.is_empty() {
        match lookup(store, user_id, &extra).await {
            Ok(more) => records.extend(more),
            Err(e) => warn!(user_id, error = %e, "lookup for item mentions failed; leaving text as written"),
        }
    }
    enrich_suggestions(&mut resolved, &records);

    Ok(resolved)
}

async fn lookup(
    store: &dyn GarmentStore,
    user_id: UserId,
    ids: &[GarmentId],
) -> Result<RecordMap, StoreError> {
    if ids.is_empty() {
        return Ok(RecordMap::new());
    }
    let found = store.find_garments_by_ids(user_id, ids).await?;
    Ok(found.into_iter().map(|g| (g.id, g)).collect())
}

/// Replace references found in `records`; keep the rest as raw numbers.
pub fn apply_records(options: &OptionSet, records: &RecordMap) -> ResolvedOptionSet {
    let resolved = options
        .options()
        .iter()
        .map(|option| ResolvedOption {
            slots: option
                .slots
                .iter()
                .map(|slot| ResolvedSlot {
                    key: slot.key.clone(),
                    cloth_id: slot.cloth_id.map(|id| match records.get(&id) {
                        Some(g) => ClothRef::Record(g.clone()),
                        None => ClothRef::Raw(id),
                    }),
                    suggestion: slot.suggestion.clone(),
                })
                .collect(),
        })
        .collect();
    ResolvedOptionSet::new(resolved)
}

/// Ids mentioned as `Item <n>` or `Items <n> and <m>` inside suggestion text
/// (not the structured reference field).
pub fn mentioned_ids(options: &OptionSet) -> BTreeSet<GarmentId> {
    options
        .options()
        .iter()
        .flat_map(|o| o.slots.iter())
        .filter_map(|s| s.suggestion.as_deref())
        .flat_map(mentioned_item_ids)
        .collect()
}

/// Rewrite `Item <n>` mentions in suggestion text with that garment's tags.
/// Mentions without a record, or whose record has no tags, stay as written.
pub fn enrich_suggestions(resolved: &mut ResolvedOptionSet, records: &RecordMap) {
    for option in resolved.options_mut() {
        for slot in &mut option.slots {
            if let Some(text) = slot.suggestion.as_mut() {
                *text = replace_item_tokens(text, |id| {
                    records.get(&id).and_then(|g| g.tag_text()).map(str::to_string)
                });
            }
        }
    }
}

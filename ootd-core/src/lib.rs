//! ootd-core: wardrobe and outfit types, and the text the model is shown.

pub mod garment;
pub mod item_ref;
pub mod outfit;
pub mod preferences;
pub mod profile;
pub mod prompt;
pub mod snapshot;
pub mod time;

pub use garment::{Garment, GarmentId, UserId, organizer_rank, sort_for_organizer};
pub use item_ref::{
    format_item_token, item_ids_in, mentioned_item_ids, replace_item_tokens, split_leading_item,
};
pub use outfit::{
    ClothRef, OptionSet, OutfitOption, ResolvedOption, ResolvedOptionSet, ResolvedSlot, Slot,
    option_label,
};
pub use preferences::{Preference, normalize_preferences};
pub use profile::{Demographic, UserProfile};
pub use prompt::{PromptParts, compose_prompt, demographic_preamble, render_history};
pub use snapshot::WardrobeSnapshot;
pub use time::{completed_years, date_in_tz, parse_tz, today_in_tz};

//! Suggestion orchestration, one request at a time:
//!
//! FETCH_HISTORY -> BUILD_SNAPSHOT -> (empty wardrobe: not found) ->
//! COMPOSE_PROMPT -> CALL_MODEL -> PARSE -> UPDATE_HISTORY -> RESOLVE
//!
//! Everything from CALL_MODEL on is all-or-nothing: a failure returns an
//! error, never a partly resolved option set. A reply that ignores the
//! requested format is not a failure; it parses to fewer (or no) options.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use ootd_core::{
    Demographic, Garment, Preference, PromptParts, ResolvedOptionSet, UserId, WardrobeSnapshot,
    compose_prompt, normalize_preferences, sort_for_organizer, today_in_tz,
};
use ootd_parse::parse_outfit_reply_detailed;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::error::{ModelError, StoreError, SuggestError};
use crate::history::SuggestionLedger;
use crate::model::{GenerationParams, TextModel};
use crate::resolver::resolve_options;
use crate::store::{GarmentStore, ProfileStore};

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub generation: GenerationParams,
    pub model_timeout: Duration,
    /// IANA timezone used for "today" when deriving age.
    pub timezone: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            generation: GenerationParams::default(),
            model_timeout: Duration::from_secs(60),
            timezone: "UTC".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SuggestionRequest {
    pub user_id: UserId,
    #[serde(default)]
    pub preferences: Vec<Preference>,
    /// Looked up from the profile store when absent.
    #[serde(default)]
    pub demographic: Option<Demographic>,
}

impl SuggestionRequest {
    pub fn new(user_id: UserId, preferences: Vec<Preference>) -> Self {
        Self {
            user_id,
            preferences,
            demographic: None,
        }
    }
}

pub struct SuggestionEngine {
    garments: Arc<dyn GarmentStore>,
    profiles: Arc<dyn ProfileStore>,
    model: Arc<dyn TextModel>,
    ledger: Arc<SuggestionLedger>,
    settings: EngineSettings,
}

impl SuggestionEngine {
    pub fn new(
        garments: Arc<dyn GarmentStore>,
        profiles: Arc<dyn ProfileStore>,
        model: Arc<dyn TextModel>,
        ledger: Arc<SuggestionLedger>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            garments,
            profiles,
            model,
            ledger,
            settings,
        }
    }

    pub fn ledger(&self) -> &SuggestionLedger {
        &self.ledger
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// The user's garments in organizer order (Tops, Bottoms, Shoes, rest).
    pub async fn wardrobe(&self, user_id: UserId) -> Result<Vec<Garment>, StoreError> {
        let mut garments = self.garments.list_garments(user_id).await?;
        sort_for_organizer(&mut garments);
        Ok(garments)
    }

    /// The snapshot text the model would see; `None` for an empty wardrobe.
    pub async fn wardrobe_snapshot(&self, user_id: UserId) -> Result<Option<WardrobeSnapshot>, StoreError> {
        let garments = self.garments.list_garments(user_id).await?;
        Ok(WardrobeSnapshot::build(&garments))
    }

    pub async fn generate_suggestions(
        &self,
        req: &SuggestionRequest,
    ) -> Result<ResolvedOptionSet, SuggestError> {
        let user_id = req.user_id;

        let mut history = self.ledger.lock(user_id).await;
        let prior = history.prior();

        let garments = self.garments.list_garments(user_id).await?;
        let Some(snapshot) = WardrobeSnapshot::build(&garments) else {
            info!(user_id, "empty wardrobe; nothing to suggest");
            return Err(SuggestError::EmptyWardrobe(user_id));
        };

        let demographic = match &req.demographic {
            Some(d) => Some(d.clone()),
            None => self.lookup_demographic(user_id).await,
        };

        let preferences = normalize_preferences(&req.preferences);
        let prompt = compose_prompt(&PromptParts {
            snapshot: &snapshot,
            demographic: demographic.as_ref(),
            preferences: &preferences,
            history: &prior,
        });
        debug!(user_id, items = snapshot.len(), prior = prior.len(), %prompt, "prompt composed");

        let reply = self.call_model(&prompt).await.inspect_err(|e| {
            error!(user_id, error = %e, "model call failed");
        })?;

        let parsed = parse_outfit_reply_detailed(&reply);
        info!(
            user_id,
            options = parsed.options.len(),
            slots = parsed.slot_count(),
            unread_lines = parsed.unread_lines,
            "reply parsed"
        );
        if parsed.options.is_empty() {
            warn!(user_id, "reply contained no outfit option headings");
        }

        history.record(parsed.options.clone());
        drop(history);

        let resolved = resolve_options(self.garments.as_ref(), user_id, &parsed.options).await?;
        Ok(resolved)
    }

    async fn call_model(&self, prompt: &str) -> Result<String, SuggestError> {
        let limit = self.settings.model_timeout;
        let reply = tokio::time::timeout(limit, self.model.generate(prompt, self.settings.generation))
            .await
            .map_err(|_| SuggestError::Timeout(limit))??;

        if reply.trim().is_empty() {
            return Err(ModelError::EmptyReply.into());
        }
        Ok(reply)
    }

    /// Missing or unreadable profiles only neutralize the prompt preamble.
    async fn lookup_demographic(&self, user_id: UserId) -> Option<Demographic> {
        let profile = match self.profiles.get_profile(user_id).await {
            Ok(Some(p)) => p,
            Ok(None) => {
                debug!(user_id, "no profile; omitting demographic preamble");
                return None;
            }
            Err(e) => {
                warn!(user_id, error = %e, "profile lookup failed; omitting demographic preamble");
                return None;
            }
        };
        Demographic::from_profile(&profile, self.today())
    }

    fn today(&self) -> NaiveDate {
        today_in_tz(&self.settings.timezone).unwrap_or_else(|e| {
            warn!(error = %e, "falling back to UTC date");
            Utc::now().date_naive()
        })
    }
}

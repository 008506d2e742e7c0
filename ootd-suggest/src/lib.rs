//! ootd-suggest: the outfit-suggestion pipeline and its seams (stores,
//! text model, history ledger).

pub mod engine;
pub mod error;
pub mod history;
pub mod memory;
pub mod model;
pub mod postgres;
pub mod resolver;
pub mod store;

pub use engine::{EngineSettings, SuggestionEngine, SuggestionRequest};
pub use error::{ModelError, StoreError, SuggestError};
pub use history::{DEFAULT_HISTORY_CAPACITY, LedgerGuard, SuggestionLedger};
pub use memory::MemoryStore;
pub use model::{GenerationParams, TextModel};
pub use postgres::PgStore;
pub use resolver::{apply_records, enrich_suggestions, mentioned_ids, resolve_options};
pub use store::{GarmentStore, ProfileStore};

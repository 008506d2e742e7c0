//! In-memory stores, used by the offline CLI commands and by tests.

use std::collections::HashMap;

use async_trait::async_trait;
use ootd_core::{Garment, GarmentId, UserId, UserProfile};
use rand::seq::SliceRandom;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::store::{GarmentStore, ProfileStore};

pub struct MemoryStore {
    garments: RwLock<HashMap<UserId, Vec<Garment>>>,
    profiles: RwLock<HashMap<UserId, UserProfile>>,
    shuffle: bool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            garments: RwLock::new(HashMap::new()),
            profiles: RwLock::new(HashMap::new()),
            shuffle: true,
        }
    }

    /// Keep insertion order in `list_garments`.
    pub fn without_shuffle(mut self) -> Self {
        self.shuffle = false;
        self
    }

    /// Build a store from garments; each lands in its `user_id`'s wardrobe.
    pub fn with_garments(garments: impl IntoIterator<Item = Garment>) -> Self {
        let mut by_user: HashMap<UserId, Vec<Garment>> = HashMap::new();
        for g in garments {
            by_user.entry(g.user_id).or_default().push(g);
        }
        Self {
            garments: RwLock::new(by_user),
            ..Self::new()
        }
    }

    pub async fn insert_garment(&self, garment: Garment) {
        let mut garments = self.garments.write().await;
        garments.entry(garment.user_id).or_default().push(garment);
    }

    pub async fn set_profile(&self, user_id: UserId, profile: UserProfile) {
        self.profiles.write().await.insert(user_id, profile);
    }
}

#[async_trait]
impl GarmentStore for MemoryStore {
    async fn list_garments(&self, user_id: UserId) -> Result<Vec<Garment>, StoreError> {
        let mut out = self
            .garments
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default();
        if self.shuffle {
            out.shuffle(&mut rand::thread_rng());
        }
        Ok(out)
    }

    async fn find_garments_by_ids(
        &self,
        user_id: UserId,
        ids: &[GarmentId],
    ) -> Result<Vec<Garment>, StoreError> {
        let garments = self.garments.read().await;
        Ok(garments
            .get(&user_id)
            .map(|owned| owned.iter().filter(|g| ids.contains(&g.id)).cloned().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_profile(&self, user_id: UserId) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.profiles.read().await.get(&user_id).cloned())
    }
}

//! Storage seams. The pipeline only reads.

use async_trait::async_trait;
use ootd_core::{Garment, GarmentId, UserId, UserProfile};

use crate::error::StoreError;

#[async_trait]
pub trait GarmentStore: Send + Sync {
    /// Every garment the user owns, in no particular order. Implementations
    /// should vary the order between calls.
    async fn list_garments(&self, user_id: UserId) -> Result<Vec<Garment>, StoreError>;

    /// Garments with the given ids that belong to `user_id`. Unknown ids and
    /// ids owned by someone else are left out, never an error.
    async fn find_garments_by_ids(
        &self,
        user_id: UserId,
        ids: &[GarmentId],
    ) -> Result<Vec<Garment>, StoreError>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, user_id: UserId) -> Result<Option<UserProfile>, StoreError>;
}

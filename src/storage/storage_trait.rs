//! Storage Trait
//!
//! This module defines the `VideoStore` trait, the persistence contract of
//! the video registry.
//!
//! Every method runs as a single, independently committed transaction.
//! Implementors assign `id`, `status` and `created_at` themselves and never
//! accept them from the caller.

use async_trait::async_trait;

use crate::error_handling::types::StorageError;
use crate::storage::types::{VideoDraft, VideoFilter, VideoRecord, VideoStatus};

#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Persists a new record with status `new` and returns it as stored.
    async fn insert(&self, draft: VideoDraft) -> Result<VideoRecord, StorageError>;

    /// Loads a record by id, `None` if no row has that id.
    async fn get_by_id(&self, id: i32) -> Result<Option<VideoRecord>, StorageError>;

    /// Returns every record matching all predicates of `filter`, ordered by id.
    async fn list(&self, filter: &VideoFilter) -> Result<Vec<VideoRecord>, StorageError>;

    /// Rewrites the status of a record and returns the refreshed row,
    /// `None` if no row has that id.
    async fn update_status(
        &self,
        id: i32,
        status: VideoStatus,
    ) -> Result<Option<VideoRecord>, StorageError>;
}

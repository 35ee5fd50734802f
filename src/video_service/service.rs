use log::{debug, info, warn};
use std::sync::Arc;

use super::validation::{parse_status, validate_registration, RegisterVideo};
use crate::error_handling::types::ServiceError;
use crate::storage::storage_trait::VideoStore;
use crate::storage::types::{VideoFilter, VideoRecord};

pub const VIDEO_NOT_FOUND: &str = "Video not found";
pub const NO_VIDEOS_FOUND: &str = "No videos were found";

/// Commands and queries over the video registry.
///
/// Input is validated here, before the store is involved; the store only
/// ever sees well-formed drafts and known statuses.
#[derive(Clone)]
pub struct VideoService {
    store: Arc<dyn VideoStore>,
}

impl VideoService {
    pub fn new(store: Arc<dyn VideoStore>) -> Self {
        Self { store }
    }

    pub async fn register(&self, request: RegisterVideo) -> Result<VideoRecord, ServiceError> {
        let draft = validate_registration(request).map_err(|errors| {
            warn!("Rejected video registration: {} invalid field(s)", errors.len());
            ServiceError::Validation(errors)
        })?;
        let record = self.store.insert(draft).await?;
        info!("Video {} registered", record.id);
        Ok(record)
    }

    /// Lists the records matching `filter`.
    ///
    /// An empty result is reported as `NotFound`, whether the filter is too
    /// narrow or the registry is empty.
    pub async fn list(&self, filter: VideoFilter) -> Result<Vec<VideoRecord>, ServiceError> {
        if filter.is_empty() {
            debug!("Listing all videos");
        } else {
            debug!("Listing videos with {:?}", filter);
        }
        let records = self.store.list(&filter).await?;
        if records.is_empty() {
            return Err(ServiceError::NotFound(NO_VIDEOS_FOUND.to_string()));
        }
        Ok(records)
    }

    pub async fn get(&self, id: i32) -> Result<VideoRecord, ServiceError> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(VIDEO_NOT_FOUND.to_string()))
    }

    pub async fn update_status(&self, id: i32, status: &str) -> Result<VideoRecord, ServiceError> {
        let status = parse_status(status).map_err(|e| {
            warn!("Rejected status '{}' for video {}", status, id);
            ServiceError::Validation(vec![e])
        })?;
        self.store
            .update_status(id, status)
            .await?
            .ok_or_else(|| ServiceError::NotFound(VIDEO_NOT_FOUND.to_string()))
    }
}

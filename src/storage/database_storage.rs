use std::path::Path;

use async_trait::async_trait;
use log::{debug, error, info, LevelFilter};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection,
    DbErr, EntityTrait, QueryFilter, QueryOrder, Schema, Set, TransactionTrait,
};

use crate::configuration::types::DatabaseSettings;
use crate::error_handling::types::StorageError;
use crate::storage::db_entities::videos;
use crate::storage::storage_trait::VideoStore;
use crate::storage::types::{VideoDraft, VideoFilter, VideoRecord, VideoStatus};

/// Relational video store backed by a SeaORM connection pool.
///
/// Works against PostgreSQL in production and SQLite for local runs and
/// tests. Each operation opens its own transaction; a transaction dropped
/// before `commit` is rolled back by the driver.
#[derive(Clone)]
pub struct DatabaseStorage {
    db: DatabaseConnection,
}

impl DatabaseStorage {
    /// Opens the connection pool described by `settings` and creates the
    /// schema if it does not exist yet.
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, StorageError> {
        let mut opt = ConnectOptions::new(settings.connection_url());
        opt.max_connections(settings.max_connections)
            .connect_timeout(settings.connect_timeout)
            .acquire_timeout(settings.connect_timeout)
            .sqlx_logging(true)
            .sqlx_logging_level(LevelFilter::Debug);

        info!("Connecting to database {}", settings.redacted_url());
        let db = Database::connect(opt).await.map_err(|e| {
            error!("Unable to connect to {}: {}", settings.redacted_url(), e);
            StorageError::ConnectionFailed(e.to_string())
        })?;

        Self::from_connection(db).await
    }

    /// Creates or opens a SQLite database file at `path`.
    pub async fn new_file<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path_ref = path.as_ref();
        if let Some(parent) = path_ref.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;
        }
        let url = format!("sqlite://{}?mode=rwc", path_ref.display());
        let db = Database::connect(url)
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;
        Self::from_connection(db).await
    }

    pub async fn from_connection(db: DatabaseConnection) -> Result<Self, StorageError> {
        let storage = Self { db };
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Creates the `videos` table unless it already exists. Existing tables
    /// are left untouched.
    pub async fn init_schema(&self) -> Result<(), StorageError> {
        let backend = self.db.get_database_backend();
        let schema = Schema::new(backend);
        let mut stmt = schema.create_table_from_entity(videos::Entity);
        stmt.if_not_exists();

        self.db.execute(backend.build(&stmt)).await.map_err(|e| {
            error!("Failed to create videos table: {}", e);
            StorageError::SchemaFailed(e.to_string())
        })?;
        info!("Videos table ready ({:?})", backend);
        Ok(())
    }
}

fn write_failed(e: DbErr) -> StorageError {
    error!("Video write failed: {}", e);
    StorageError::WriteFailed(e.to_string())
}

fn read_failed(e: DbErr) -> StorageError {
    error!("Video read failed: {}", e);
    StorageError::ReadFailed(e.to_string())
}

#[async_trait]
impl VideoStore for DatabaseStorage {
    async fn insert(&self, draft: VideoDraft) -> Result<VideoRecord, StorageError> {
        let row = videos::ActiveModel {
            duration: Set(draft.duration.and_then(|d| d.num_microseconds())),
            camera_number: Set(draft.camera_number),
            location: Set(draft.location),
            video_path: Set(draft.video_path),
            start_time: Set(draft.start_time),
            status: Set(VideoStatus::New),
            ..Default::default()
        };

        let txn = self.db.begin().await.map_err(write_failed)?;
        let model = row.insert(&txn).await.map_err(write_failed)?;
        txn.commit().await.map_err(write_failed)?;

        info!(
            "Registered video {} from camera {:?} at {}",
            model.id, model.camera_number, model.location
        );
        Ok(model.into())
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<VideoRecord>, StorageError> {
        let txn = self.db.begin().await.map_err(read_failed)?;
        let found = videos::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(read_failed)?;
        txn.commit().await.map_err(read_failed)?;

        debug!("Lookup of video {}: found={}", id, found.is_some());
        Ok(found.map(VideoRecord::from))
    }

    async fn list(&self, filter: &VideoFilter) -> Result<Vec<VideoRecord>, StorageError> {
        let mut query = videos::Entity::find();

        if !filter.camera_number.is_empty() {
            query = query.filter(videos::Column::CameraNumber.is_in(filter.camera_number.clone()));
        }
        if !filter.location.is_empty() {
            query = query.filter(videos::Column::Location.is_in(filter.location.clone()));
        }
        if !filter.status.is_empty() {
            query = query.filter(videos::Column::Status.is_in(filter.status.clone()));
        }
        if let Some(from) = filter.start_time_from {
            query = query.filter(videos::Column::CreatedAt.gte(from));
        }
        if let Some(to) = filter.start_time_to {
            query = query.filter(videos::Column::CreatedAt.lte(to));
        }

        let txn = self.db.begin().await.map_err(read_failed)?;
        let rows = query
            .order_by_asc(videos::Column::Id)
            .all(&txn)
            .await
            .map_err(read_failed)?;
        txn.commit().await.map_err(read_failed)?;

        debug!("Video listing matched {} rows", rows.len());
        Ok(rows.into_iter().map(VideoRecord::from).collect())
    }

    async fn update_status(
        &self,
        id: i32,
        status: VideoStatus,
    ) -> Result<Option<VideoRecord>, StorageError> {
        let txn = self.db.begin().await.map_err(write_failed)?;
        let existing = videos::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(write_failed)?;
        let Some(existing) = existing else {
            // Dropping the transaction rolls it back.
            return Ok(None);
        };

        let previous = existing.status;
        let mut row: videos::ActiveModel = existing.into();
        row.status = Set(status);
        let updated = row.update(&txn).await.map_err(write_failed)?;
        txn.commit().await.map_err(write_failed)?;

        info!("Video {} status changed {} -> {}", id, previous, status);
        Ok(Some(updated.into()))
    }
}

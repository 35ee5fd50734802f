//! SeaORM entity model used by the database storage backend.
//!
//! Maps to the `videos` table created by `database_storage`. The entity
//! never leaves the storage layer: rows are converted into `VideoRecord`
//! before being handed to callers.

/// Videos table entity model.
pub mod videos {
    use chrono::TimeDelta;
    use sea_orm::entity::prelude::*;
    use sea_orm::sea_query::Expr;

    use crate::storage::types::{VideoRecord, VideoStatus};

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "videos")]
    pub struct Model {
        /// Auto-increment row id
        #[sea_orm(primary_key)]
        pub id: i32,
        /// Recording length in microseconds
        pub duration: Option<i64>,
        pub camera_number: Option<i32>,
        pub location: String,
        pub video_path: String,
        /// Naive UTC timestamp
        pub start_time: Option<DateTime>,
        pub status: VideoStatus,
        /// Insertion timestamp, filled in by the database clock
        #[sea_orm(default_expr = "Expr::current_timestamp()")]
        pub created_at: DateTime,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for VideoRecord {
        fn from(model: Model) -> Self {
            VideoRecord {
                id: model.id,
                duration: model.duration.map(TimeDelta::microseconds),
                camera_number: model.camera_number,
                location: model.location,
                video_path: model.video_path,
                start_time: model.start_time,
                status: model.status,
                created_at: model.created_at,
            }
        }
    }
}

//! Storage subsystem
//!
//! This module provides the persistence contract for video records and its
//! relational implementation.
//!
//! Components:
//! - `storage_trait`: the `VideoStore` trait defining a uniform async API.
//! - `types`: draft, record, status and filter types shared with the service.
//! - `database_storage`: ORM-based implementation using SeaORM (PostgreSQL or SQLite).
//! - `db_entities`: SeaORM entity model for the `videos` table.

pub mod database_storage;
pub mod db_entities;
pub mod storage_trait;
pub mod types;

pub use database_storage::DatabaseStorage;
pub use storage_trait::VideoStore;
pub use types::{VideoDraft, VideoFilter, VideoRecord, VideoStatus};

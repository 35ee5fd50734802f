pub mod types;

pub use types::{AppError, ConfigError, FieldError, ServiceError, StorageError, WebError};

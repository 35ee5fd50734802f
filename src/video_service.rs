//! Query/command service of the registry.
//!
//! - `service`: the four registry operations and their error mapping.
//! - `validation`: constraint checks on registration input and status values.

pub mod service;
pub mod validation;

pub use service::VideoService;
pub use validation::RegisterVideo;

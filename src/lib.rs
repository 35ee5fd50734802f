pub mod configuration;
pub mod error_handling;
pub mod storage;
pub mod video_service;
pub mod web_interface;

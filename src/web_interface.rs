// Web Interface module root
pub mod codec;
pub mod routes;
pub mod types;
pub mod web_server;

// Re-export commonly used items
pub use routes::handle_rejection;
pub use types::VideoResponse;
pub use web_server::WebServer;

use log::{error, info};
use std::convert::Infallible;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use super::routes::{
    get_video_route, handle_rejection, list_videos_route, register_video_route,
    update_status_route,
};
use crate::error_handling::types::WebError;
use crate::video_service::VideoService;

use warp::{Filter, Reply};

/// HTTP front of the video registry
pub struct WebServer {
    service: VideoService,
}

impl WebServer {
    pub fn new(service: VideoService) -> Self {
        Self { service }
    }

    /// Every route of the API, with rejection recovery and request logging.
    pub fn routes(&self) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
        register_video_route(self.service.clone())
            .or(list_videos_route(self.service.clone()))
            .or(get_video_route(self.service.clone()))
            .or(update_status_route(self.service.clone()))
            .recover(handle_rejection)
            .with(warp::log("video_registry::http"))
    }

    /// Serve until Ctrl-C is received. Requests in flight when the signal
    /// arrives are completed before returning.
    pub async fn start(&self, addr: SocketAddr) -> Result<(), WebError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| WebError::BindFailed(format!("{}: {}", addr, e)))?;

        info!("Listening on http://{}", addr);
        warp::serve(self.routes())
            .incoming(listener)
            .graceful(shutdown_signal())
            .run()
            .await;
        info!("Web server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Unable to listen for the shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections");
}

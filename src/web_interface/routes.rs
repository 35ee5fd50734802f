use bytes::Bytes;
use log::{debug, error, warn};
use serde::Serialize;
use std::convert::Infallible;
use warp::http::StatusCode;
use warp::reply::{self, Response};
use warp::{Filter, Rejection, Reply};

use super::types::{
    decode_filter_query, decode_register_body, decode_status_body, decode_video_id, ApiError,
    ValidationErrorBody, VideoResponse,
};
use crate::error_handling::types::{FieldError, ServiceError};
use crate::video_service::VideoService;

/// Upper bound on accepted request bodies.
pub const MAX_BODY_BYTES: u64 = 64 * 1024;

fn with_service(
    service: VideoService,
) -> impl Filter<Extract = (VideoService,), Error = Infallible> + Clone {
    warp::any().map(move || service.clone())
}

fn json_body() -> impl Filter<Extract = (Bytes,), Error = Rejection> + Clone {
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::bytes())
}

fn detail(status: StatusCode, message: &str) -> Response {
    reply::with_status(
        reply::json(&ApiError {
            detail: message.to_string(),
        }),
        status,
    )
    .into_response()
}

fn validation_reply(errors: Vec<FieldError>) -> Response {
    reply::with_status(
        reply::json(&ValidationErrorBody { detail: errors }),
        StatusCode::UNPROCESSABLE_ENTITY,
    )
    .into_response()
}

fn ok_json<T: Serialize>(value: &T) -> Response {
    reply::with_status(reply::json(value), StatusCode::OK).into_response()
}

/// Maps a service outcome onto its HTTP response.
pub fn error_reply(err: ServiceError) -> Response {
    match err {
        ServiceError::Validation(errors) => validation_reply(errors),
        ServiceError::NotFound(message) => {
            debug!("{}", message);
            detail(StatusCode::NOT_FOUND, &message)
        }
        ServiceError::Storage(e) => {
            error!("Request failed: {}", e);
            detail(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}

/// POST /videos
pub fn register_video_route(
    service: VideoService,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::path!("videos")
        .and(warp::post())
        .and(json_body())
        .and(with_service(service))
        .and_then(|body: Bytes, service: VideoService| async move {
            let response = match decode_register_body(&body) {
                Err(errors) => {
                    warn!("Undecodable registration body");
                    validation_reply(errors)
                }
                Ok(request) => match service.register(request).await {
                    Ok(record) => ok_json(&VideoResponse::from(record)),
                    Err(e) => error_reply(e),
                },
            };
            Ok::<_, Rejection>(response)
        })
}

/// GET /videos
pub fn list_videos_route(
    service: VideoService,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::path!("videos")
        .and(warp::get())
        .and(warp::query::<Vec<(String, String)>>())
        .and(with_service(service))
        .and_then(
            |pairs: Vec<(String, String)>, service: VideoService| async move {
                let response = match decode_filter_query(&pairs) {
                    Err(errors) => validation_reply(errors),
                    Ok(filter) => match service.list(filter).await {
                        Ok(records) => {
                            let body: Vec<VideoResponse> =
                                records.into_iter().map(VideoResponse::from).collect();
                            ok_json(&body)
                        }
                        Err(e) => error_reply(e),
                    },
                };
                Ok::<_, Rejection>(response)
            },
        )
}

/// GET /videos/:id
pub fn get_video_route(
    service: VideoService,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::path!("videos" / String)
        .and(warp::get())
        .and(with_service(service))
        .and_then(|raw_id: String, service: VideoService| async move {
            let response = match decode_video_id(&raw_id) {
                Err(errors) => validation_reply(errors),
                Ok(id) => match service.get(id).await {
                    Ok(record) => ok_json(&VideoResponse::from(record)),
                    Err(e) => error_reply(e),
                },
            };
            Ok::<_, Rejection>(response)
        })
}

/// PATCH /videos/:id/status
pub fn update_status_route(
    service: VideoService,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::path!("videos" / String / "status")
        .and(warp::patch())
        .and(json_body())
        .and(with_service(service))
        .and_then(
            |raw_id: String, body: Bytes, service: VideoService| async move {
                let decoded = match (decode_video_id(&raw_id), decode_status_body(&body)) {
                    (Ok(id), Ok(status)) => Ok((id, status)),
                    (Err(mut errors), Err(more)) => {
                        errors.extend(more);
                        Err(errors)
                    }
                    (Err(errors), _) | (_, Err(errors)) => Err(errors),
                };
                let response = match decoded {
                    Err(errors) => validation_reply(errors),
                    Ok((id, status)) => match service.update_status(id, &status).await {
                        Ok(record) => ok_json(&VideoResponse::from(record)),
                        Err(e) => error_reply(e),
                    },
                };
                Ok::<_, Rejection>(response)
            },
        )
}

/// Turns unmatched requests into JSON `detail` responses.
pub async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let response = if err.is_not_found() {
        detail(StatusCode::NOT_FOUND, "Not Found")
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        detail(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        detail(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        detail(StatusCode::LENGTH_REQUIRED, "Content-Length required")
    } else if err.find::<warp::reject::InvalidQuery>().is_some() {
        validation_reply(vec![FieldError::new(
            &["query"],
            "Invalid query string",
            "query_invalid",
        )])
    } else {
        error!("Unhandled rejection: {:?}", err);
        detail(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
    };
    Ok(response)
}

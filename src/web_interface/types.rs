use serde::Serialize;
use serde_json::{Map, Value};

use super::codec::{
    duration_from_seconds, format_duration, format_timestamp, parse_duration, parse_timestamp,
    timestamp_from_unix,
};
use crate::error_handling::types::FieldError;
use crate::storage::types::{VideoFilter, VideoRecord, VideoStatus};
use crate::video_service::validation::RegisterVideo;

/// JSON representation of a video record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoResponse {
    pub id: i32,
    pub duration: Option<String>,
    pub camera_number: Option<i32>,
    pub location: String,
    pub video_path: String,
    pub start_time: Option<String>,
    pub status: VideoStatus,
    pub created_at: String,
}

impl From<VideoRecord> for VideoResponse {
    fn from(record: VideoRecord) -> Self {
        Self {
            id: record.id,
            duration: record.duration.map(format_duration),
            camera_number: record.camera_number,
            location: record.location,
            video_path: record.video_path,
            start_time: record.start_time.as_ref().map(format_timestamp),
            status: record.status,
            created_at: format_timestamp(&record.created_at),
        }
    }
}

/// API error payload for not-found and server errors
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub detail: String,
}

/// API error payload for validation failures
#[derive(Debug, Serialize)]
pub struct ValidationErrorBody {
    pub detail: Vec<FieldError>,
}

fn parse_body(body: &[u8]) -> Result<Map<String, Value>, Vec<FieldError>> {
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        vec![FieldError::new(
            &["body"],
            format!("JSON decode error: {}", e),
            "json_invalid",
        )]
    })?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(vec![FieldError::new(
            &["body"],
            "Input should be a valid dictionary or object to extract fields from",
            "model_attributes_type",
        )]),
    }
}

fn decode_string(
    map: &Map<String, Value>,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match map.get(field) {
        None => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push(FieldError::new(
                &["body", field],
                "Input should be a valid string",
                "string_type",
            ));
            None
        }
    }
}

fn decode_integer(value: &Value) -> Result<i64, FieldError> {
    let invalid = |msg: &str, kind: &str| FieldError::new(&["body", "camera_number"], msg, kind);
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
                    Some(f) if f.is_finite() && f.fract() != 0.0 => Err(invalid(
                        "Input should be a valid integer, got a number with a fractional part",
                        "int_from_float",
                    )),
                    _ => Err(invalid("Input should be a valid integer", "int_parsing")),
                }
            }
        }
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| {
            invalid(
                "Input should be a valid integer, unable to parse string as an integer",
                "int_parsing",
            )
        }),
        _ => Err(invalid("Input should be a valid integer", "int_type")),
    }
}

/// Decodes a registration body into typed, not yet validated, input.
///
/// `null` is accepted for optional fields. Fields of the wrong type are left
/// unset and recorded in `rejected`; only a body that is not a JSON object
/// fails outright.
pub fn decode_register_body(body: &[u8]) -> Result<RegisterVideo, Vec<FieldError>> {
    let map = parse_body(body)?;
    let mut errors = Vec::new();

    let duration = match map.get("duration") {
        None | Some(Value::Null) => None,
        Some(value) => {
            let parsed = match value {
                Value::Number(n) => n.as_f64().and_then(duration_from_seconds),
                Value::String(s) => parse_duration(s),
                _ => None,
            };
            if parsed.is_none() {
                errors.push(FieldError::new(
                    &["body", "duration"],
                    "Input should be a valid duration",
                    "duration_parsing",
                ));
            }
            parsed
        }
    };

    let camera_number = match map.get("camera_number") {
        None | Some(Value::Null) => None,
        Some(value) => match decode_integer(value) {
            Ok(n) => Some(n),
            Err(e) => {
                errors.push(e);
                None
            }
        },
    };

    let location = decode_string(&map, "location", &mut errors);
    let video_path = decode_string(&map, "video_path", &mut errors);

    let start_time = match map.get("start_time") {
        None | Some(Value::Null) => None,
        Some(value) => {
            let parsed = match value {
                Value::String(s) => parse_timestamp(s),
                Value::Number(n) => n.as_f64().and_then(timestamp_from_unix),
                _ => None,
            };
            if parsed.is_none() {
                errors.push(FieldError::new(
                    &["body", "start_time"],
                    "Input should be a valid datetime",
                    "datetime_parsing",
                ));
            }
            parsed
        }
    };

    Ok(RegisterVideo {
        duration,
        camera_number,
        location,
        video_path,
        start_time,
        rejected: errors,
    })
}

/// Extracts the raw `status` value of a status update body. Membership in
/// the status enumeration is checked by the service.
pub fn decode_status_body(body: &[u8]) -> Result<String, Vec<FieldError>> {
    let map = parse_body(body)?;
    match map.get("status") {
        None => Err(vec![FieldError::missing(&["body", "status"])]),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(vec![FieldError::new(
            &["body", "status"],
            "Input should be a valid string",
            "string_type",
        )]),
    }
}

/// Builds a listing filter from query pairs. Set-valued parameters may be
/// repeated and may be spelled with a trailing `[]`; unknown parameters are
/// ignored.
pub fn decode_filter_query(pairs: &[(String, String)]) -> Result<VideoFilter, Vec<FieldError>> {
    let mut filter = VideoFilter::default();
    let mut errors = Vec::new();

    for (raw_key, value) in pairs {
        let key = raw_key.strip_suffix("[]").unwrap_or(raw_key);
        match key {
            "camera_number" => match value.trim().parse::<i32>() {
                Ok(n) => filter.camera_number.push(n),
                Err(_) => errors.push(FieldError::new(
                    &["query", "camera_number"],
                    "Input should be a valid integer, unable to parse string as an integer",
                    "int_parsing",
                )),
            },
            "location" => filter.location.push(value.clone()),
            "status" => filter.status.push(value.clone()),
            "start_time_from" | "start_time_to" => match parse_timestamp(value) {
                Some(ts) if key == "start_time_from" => filter.start_time_from = Some(ts),
                Some(ts) => filter.start_time_to = Some(ts),
                None => errors.push(FieldError::new(
                    &["query", key],
                    "Input should be a valid datetime",
                    "datetime_parsing",
                )),
            },
            _ => {}
        }
    }

    if errors.is_empty() {
        Ok(filter)
    } else {
        Err(errors)
    }
}

pub fn decode_video_id(raw: &str) -> Result<i32, Vec<FieldError>> {
    raw.parse::<i32>().map_err(|_| {
        vec![FieldError::new(
            &["path", "video_id"],
            "Input should be a valid integer, unable to parse string as an integer",
            "int_parsing",
        )]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeDelta};
    use serde_json::json;

    fn body(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn test_decode_full_body() {
        let request = decode_register_body(&body(json!({
            "video_path": "/storage/camera1/2024-01-15_10-30-00.mp4",
            "start_time": "2024-01-15T10:30:00",
            "duration": "PT1H",
            "camera_number": 1,
            "location": "Entrance"
        })))
        .unwrap();
        assert_eq!(request.duration, Some(TimeDelta::hours(1)));
        assert_eq!(request.camera_number, Some(1));
        assert_eq!(request.location.as_deref(), Some("Entrance"));
        assert_eq!(
            request.start_time,
            NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(10, 30, 0)
        );
    }

    #[test]
    fn test_decode_keeps_missing_fields_for_validation() {
        let request = decode_register_body(&body(json!({
            "video_path": "/v.mp4",
            "duration": null,
            "camera_number": "2"
        })))
        .unwrap();
        assert_eq!(request.location, None);
        assert_eq!(request.duration, None);
        assert_eq!(request.camera_number, Some(2));
        assert!(request.rejected.is_empty());
    }

    #[test]
    fn test_decode_type_errors_collected() {
        let request = decode_register_body(&body(json!({
            "video_path": 5,
            "location": "Entrance",
            "camera_number": 1.5,
            "duration": "forever",
            "start_time": "soon"
        })))
        .unwrap();
        assert_eq!(request.video_path, None);
        assert_eq!(request.camera_number, None);
        assert_eq!(request.location.as_deref(), Some("Entrance"));
        let kinds: Vec<&str> = request.rejected.iter().map(|e| e.kind.as_str()).collect();
        assert_eq!(
            kinds,
            vec!["duration_parsing", "int_from_float", "string_type", "datetime_parsing"]
        );
    }

    #[test]
    fn test_decode_rejects_non_objects() {
        let errors = decode_register_body(b"{not json").unwrap_err();
        assert_eq!(errors[0].kind, "json_invalid");
        let errors = decode_register_body(b"[1, 2]").unwrap_err();
        assert_eq!(errors[0].kind, "model_attributes_type");
    }

    #[test]
    fn test_decode_status_body() {
        assert_eq!(
            decode_status_body(&body(json!({"status": "recognized"}))).unwrap(),
            "recognized"
        );
        assert_eq!(
            decode_status_body(&body(json!({}))).unwrap_err()[0].kind,
            "missing"
        );
        assert_eq!(
            decode_status_body(&body(json!({"status": 3}))).unwrap_err()[0].kind,
            "string_type"
        );
    }

    #[test]
    fn test_decode_filter_query() {
        let pairs: Vec<(String, String)> = vec![
            ("camera_number".into(), "1".into()),
            ("camera_number[]".into(), "2".into()),
            ("location".into(), "Entrance".into()),
            ("status[]".into(), "new".into()),
            ("start_time_to".into(), "2024-02-15T10:30:00".into()),
            ("page".into(), "3".into()),
        ];
        let filter = decode_filter_query(&pairs).unwrap();
        assert_eq!(filter.camera_number, vec![1, 2]);
        assert_eq!(filter.location, vec!["Entrance".to_string()]);
        assert_eq!(filter.status, vec!["new".to_string()]);
        assert!(filter.start_time_from.is_none());
        assert!(filter.start_time_to.is_some());

        let errors = decode_filter_query(&[
            ("camera_number".into(), "two".into()),
            ("start_time_from".into(), "later".into()),
        ])
        .unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[1].loc, vec!["query", "start_time_from"]);
    }

    #[test]
    fn test_response_shape() {
        let created_at = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_micro_opt(11, 0, 0, 125)
            .unwrap();
        let response = VideoResponse::from(VideoRecord {
            id: 1,
            duration: Some(TimeDelta::hours(1)),
            camera_number: None,
            location: "Entrance".into(),
            video_path: "/v.mp4".into(),
            start_time: None,
            status: VideoStatus::New,
            created_at,
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            json!({
                "id": 1,
                "duration": "PT1H",
                "camera_number": null,
                "location": "Entrance",
                "video_path": "/v.mp4",
                "start_time": null,
                "status": "new",
                "created_at": "2024-01-15T11:00:00.000125"
            })
        );
    }
}

use chrono::{NaiveDateTime, TimeDelta};

use crate::error_handling::types::FieldError;
use crate::storage::types::{VideoDraft, VideoStatus};

/// Registration input as decoded from a request, before any constraint has
/// been checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterVideo {
    pub duration: Option<TimeDelta>,
    pub camera_number: Option<i64>,
    pub location: Option<String>,
    pub video_path: Option<String>,
    pub start_time: Option<NaiveDateTime>,
    /// Fields that could not be decoded. They are left unset above and
    /// reported alongside the constraint failures.
    pub rejected: Vec<FieldError>,
}

fn already_rejected(errors: &[FieldError], field: &str) -> bool {
    errors
        .iter()
        .any(|e| e.loc.last().map(String::as_str) == Some(field))
}

/// Checks every constraint of a registration and collects all failures,
/// decode failures included.
pub fn validate_registration(request: RegisterVideo) -> Result<VideoDraft, Vec<FieldError>> {
    let mut errors = request.rejected;
    let location_rejected = already_rejected(&errors, "location");
    let video_path_rejected = already_rejected(&errors, "video_path");

    if let Some(duration) = request.duration {
        if duration <= TimeDelta::zero() {
            errors.push(FieldError::new(
                &["body", "duration"],
                "Input should be greater than 0 seconds",
                "greater_than",
            ));
        } else if duration.num_microseconds().is_none() {
            errors.push(FieldError::new(
                &["body", "duration"],
                "Input should be a valid duration, value is too large",
                "duration_parsing",
            ));
        }
    }

    let camera_number = match request.camera_number {
        None => None,
        Some(n) if n <= 0 => {
            errors.push(FieldError::new(
                &["body", "camera_number"],
                "Input should be greater than 0",
                "greater_than",
            ));
            None
        }
        Some(n) => match i32::try_from(n) {
            Ok(n) => Some(n),
            Err(_) => {
                errors.push(FieldError::new(
                    &["body", "camera_number"],
                    format!("Input should be less than or equal to {}", i32::MAX),
                    "less_than_equal",
                ));
                None
            }
        },
    };

    if request.location.is_none() && !location_rejected {
        errors.push(FieldError::missing(&["body", "location"]));
    }
    if request.video_path.is_none() && !video_path_rejected {
        errors.push(FieldError::missing(&["body", "video_path"]));
    }

    match (request.location, request.video_path) {
        (Some(location), Some(video_path)) if errors.is_empty() => Ok(VideoDraft {
            duration: request.duration,
            camera_number,
            location,
            video_path,
            start_time: request.start_time,
        }),
        _ => Err(errors),
    }
}

pub fn parse_status(raw: &str) -> Result<VideoStatus, FieldError> {
    raw.parse::<VideoStatus>().map_err(|_| {
        FieldError::new(
            &["body", "status"],
            "Input should be 'new', 'transcoded' or 'recognized'",
            "enum",
        )
    })
}

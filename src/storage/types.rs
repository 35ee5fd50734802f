use chrono::{NaiveDateTime, TimeDelta};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::StringLen;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Processing lifecycle state of a video.
///
/// Stored as its lowercase string value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum VideoStatus {
    #[sea_orm(string_value = "new")]
    New,
    #[sea_orm(string_value = "transcoded")]
    Transcoded,
    #[sea_orm(string_value = "recognized")]
    Recognized,
}

impl VideoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::New => "new",
            VideoStatus::Transcoded => "transcoded",
            VideoStatus::Recognized => "recognized",
        }
    }
}

impl Default for VideoStatus {
    fn default() -> Self {
        VideoStatus::New
    }
}

impl fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown video status '{}'", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for VideoStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(VideoStatus::New),
            "transcoded" => Ok(VideoStatus::Transcoded),
            "recognized" => Ok(VideoStatus::Recognized),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Caller-supplied fields of a new video. Identity, status and creation
/// time are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoDraft {
    pub duration: Option<TimeDelta>,
    pub camera_number: Option<i32>,
    pub location: String,
    pub video_path: String,
    pub start_time: Option<NaiveDateTime>,
}

/// A persisted video record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRecord {
    pub id: i32,
    pub duration: Option<TimeDelta>,
    pub camera_number: Option<i32>,
    pub location: String,
    pub video_path: String,
    pub start_time: Option<NaiveDateTime>,
    pub status: VideoStatus,
    pub created_at: NaiveDateTime,
}

/// Listing predicates. Every non-empty field must match (AND); an empty
/// set or `None` imposes no constraint.
///
/// The two time bounds apply to the record's `created_at`, inclusive on
/// both ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoFilter {
    pub camera_number: Vec<i32>,
    pub location: Vec<String>,
    pub status: Vec<String>,
    pub start_time_from: Option<NaiveDateTime>,
    pub start_time_to: Option<NaiveDateTime>,
}

impl VideoFilter {
    pub fn is_empty(&self) -> bool {
        self.camera_number.is_empty()
            && self.location.is_empty()
            && self.status.is_empty()
            && self.start_time_from.is_none()
            && self.start_time_to.is_none()
    }
}

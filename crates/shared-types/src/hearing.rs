use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const HEARING_STATUSES: &[&str] = &["scheduled", "completed", "adjourned", "cancelled"];

/// Default and maximum look-ahead for the upcoming-hearings listing.
pub const DEFAULT_UPCOMING_DAYS: i64 = 7;
pub const MAX_UPCOMING_DAYS: i64 = 90;

/// A court hearing on a case.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct Hearing {
    pub id: Uuid,
    pub case_id: Uuid,
    pub title: String,
    pub hearing_date: DateTime<Utc>,
    pub court_room: Option<String>,
    pub judge_name: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Hearing joined with the case it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct HearingWithCase {
    #[cfg_attr(feature = "server", sqlx(flatten))]
    #[serde(flatten)]
    pub hearing: Hearing,
    pub case_number: String,
    pub case_title: String,
    pub advocate_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HearingResponse {
    pub id: String,
    pub case_id: String,
    pub case_number: String,
    pub case_title: String,
    pub title: String,
    pub hearing_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub court_room: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub judge_name: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<HearingWithCase> for HearingResponse {
    fn from(row: HearingWithCase) -> Self {
        let h = row.hearing;
        Self {
            id: h.id.to_string(),
            case_id: h.case_id.to_string(),
            case_number: row.case_number,
            case_title: row.case_title,
            title: h.title,
            hearing_date: h.hearing_date.to_rfc3339(),
            court_room: h.court_room,
            judge_name: h.judge_name,
            status: h.status,
            notes: h.notes,
            created_by: h.created_by.to_string(),
            created_at: h.created_at.to_rfc3339(),
            updated_at: h.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "validation", derive(validator::Validate))]
pub struct CreateHearingRequest {
    pub case_id: Uuid,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))
    )]
    pub title: String,
    pub hearing_date: DateTime<Utc>,
    pub court_room: Option<String>,
    pub judge_name: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateHearingRequest {
    pub title: Option<String>,
    pub hearing_date: Option<DateTime<Utc>>,
    pub court_room: Option<String>,
    pub judge_name: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HearingListQuery {
    pub case_id: Option<Uuid>,
    pub status: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpcomingQuery {
    pub days: Option<i64>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Clamp the look-ahead window for upcoming hearings.
pub fn normalize_upcoming_days(days: Option<i64>) -> i64 {
    days.unwrap_or(DEFAULT_UPCOMING_DAYS).clamp(1, MAX_UPCOMING_DAYS)
}

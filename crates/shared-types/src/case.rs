use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Validation constants ────────────────────────────────────────────

/// Valid case status values matching the DB CHECK constraint.
pub const CASE_STATUSES: &[&str] = &["open", "in_progress", "on_hold", "closed", "won", "lost"];

/// Statuses that count as concluded for dashboard purposes.
pub const CLOSED_CASE_STATUSES: &[&str] = &["closed", "won", "lost"];

/// Valid case type values matching the DB CHECK constraint.
pub const CASE_TYPES: &[&str] = &[
    "civil", "criminal", "family", "corporate", "property", "labour", "tax", "other",
];

/// Valid case priority values matching the DB CHECK constraint.
pub const CASE_PRIORITIES: &[&str] = &["low", "medium", "high", "urgent"];

// ── DB row struct ───────────────────────────────────────────────────

/// A case record owned by an advocate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct Case {
    pub id: Uuid,
    pub advocate_id: Uuid,
    pub client_id: Option<Uuid>,
    pub case_number: String,
    pub title: String,
    pub description: String,
    pub case_type: String,
    pub status: String,
    pub priority: String,
    pub court_name: String,
    pub judge_name: Option<String>,
    pub filing_date: Option<NaiveDate>,
    pub next_hearing_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ── API response types ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseResponse {
    pub id: String,
    pub advocate_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    pub case_number: String,
    pub title: String,
    pub description: String,
    pub case_type: String,
    pub status: String,
    pub priority: String,
    pub court_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub judge_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filing_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_hearing_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Case> for CaseResponse {
    fn from(c: Case) -> Self {
        Self {
            id: c.id.to_string(),
            advocate_id: c.advocate_id.to_string(),
            client_id: c.client_id.map(|id| id.to_string()),
            case_number: c.case_number,
            title: c.title,
            description: c.description,
            case_type: c.case_type,
            status: c.status,
            priority: c.priority,
            court_name: c.court_name,
            judge_name: c.judge_name,
            filing_date: c.filing_date.map(|d| d.to_string()),
            next_hearing_date: c.next_hearing_date.map(|d| d.to_rfc3339()),
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.to_rfc3339(),
        }
    }
}

// ── Request types ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "validation", derive(validator::Validate))]
pub struct CreateCaseRequest {
    /// Required when a clerk or admin files on behalf of an advocate; ignored for advocates.
    pub advocate_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, max = 64, message = "Case number must be 1-64 characters"))
    )]
    pub case_number: String,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))
    )]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub case_type: String,
    pub status: Option<String>,
    pub priority: Option<String>,
    #[serde(default)]
    pub court_name: String,
    pub judge_name: Option<String>,
    pub filing_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCaseRequest {
    pub advocate_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub case_type: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub court_name: Option<String>,
    pub judge_name: Option<String>,
    pub filing_date: Option<NaiveDate>,
}

/// Query params for the case listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaseListQuery {
    pub status: Option<String>,
    pub case_type: Option<String>,
    pub priority: Option<String>,
    pub client_id: Option<Uuid>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

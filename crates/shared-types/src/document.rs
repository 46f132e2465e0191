use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DOCUMENT_TYPES: &[&str] = &[
    "petition", "evidence", "affidavit", "order", "judgment", "contract", "correspondence", "other",
];

/// Build the storage key for an uploaded file.
///
/// Keys look like `documents/{case_id|general}/{uuid}-{sanitized name}` so
/// that two uploads with the same name never collide.
pub fn document_storage_key(case_id: Option<Uuid>, object_id: Uuid, file_name: &str) -> String {
    let folder = case_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "general".to_string());
    format!("documents/{}/{}-{}", folder, object_id, sanitize_file_name(file_name))
}

/// Keep only characters that are safe in an object key.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_matches('.');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Metadata row for a stored document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct Document {
    pub id: Uuid,
    pub case_id: Option<Uuid>,
    pub uploaded_by: Uuid,
    pub file_name: String,
    pub storage_key: String,
    pub mime_type: String,
    pub file_size: i64,
    pub document_type: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_id: Option<String>,
    pub uploaded_by: String,
    pub file_name: String,
    pub mime_type: String,
    pub file_size: i64,
    pub document_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Short-lived download URL, present when the object store can presign.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    pub created_at: String,
}

impl From<Document> for DocumentResponse {
    fn from(d: Document) -> Self {
        Self {
            id: d.id.to_string(),
            case_id: d.case_id.map(|id| id.to_string()),
            uploaded_by: d.uploaded_by.to_string(),
            file_name: d.file_name,
            mime_type: d.mime_type,
            file_size: d.file_size,
            document_type: d.document_type,
            description: d.description,
            download_url: None,
            created_at: d.created_at.to_rfc3339(),
        }
    }
}

/// Fields collected from the multipart upload form (everything but the file).
#[derive(Debug, Clone, Default)]
pub struct DocumentUploadFields {
    pub case_id: Option<Uuid>,
    pub document_type: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDocumentRequest {
    pub document_type: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentListQuery {
    pub case_id: Option<Uuid>,
    pub document_type: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

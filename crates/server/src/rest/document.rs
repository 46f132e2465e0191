use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use shared_types::{
    document_storage_key, normalize_pagination, sanitize_file_name, ActivityAction, ApiResponse,
    AppError, Document, DocumentListQuery, DocumentResponse, DocumentUploadFields, Paginated,
    UpdateDocumentRequest, DOCUMENT_TYPES,
};

use super::{ensure_one_of, parse_uuid};
use crate::auth::{AuthRequired, StaffRequired, RoleRequired};
use crate::config::max_upload_bytes;
use crate::repo::{self, document::NewDocument};
use crate::storage::DynObjectStore;

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::payload_too_large(format!(
            "File exceeds the {} byte upload limit",
            max_upload_bytes()
        ))
    } else {
        AppError::bad_request(e.body_text())
    }
}

async fn text_field(field: axum::extract::multipart::Field<'_>) -> Result<Option<String>, AppError> {
    let value = field.text().await.map_err(multipart_error)?;
    let trimmed = value.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

/// Attach a presigned download URL when the store can produce one.
async fn with_download_url(storage: &DynObjectStore, doc: Document) -> DocumentResponse {
    let url = match storage.presign_get(&doc.storage_key).await {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(document_id = %doc.id, error = %e, "failed to presign document download");
            None
        }
    };
    let mut response = DocumentResponse::from(doc);
    response.download_url = url;
    response
}

/// GET /api/documents
pub async fn list_documents(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(user): AuthRequired,
    Query(params): Query<DocumentListQuery>,
) -> Result<ApiResponse<Paginated<DocumentResponse>>, AppError> {
    if let Some(t) = params.document_type.as_deref() {
        ensure_one_of("document_type", t, DOCUMENT_TYPES)?;
    }

    let page = normalize_pagination(params.page, params.limit);
    let (docs, total) = repo::document::search(
        &pool,
        user.advocate_scope(),
        params.case_id,
        params.document_type.as_deref(),
        page.offset(),
        page.limit,
    )
    .await?;

    let items = docs.into_iter().map(DocumentResponse::from).collect();
    Ok(ApiResponse::ok(
        "Documents fetched",
        Paginated::new(items, page.page, page.limit, total),
    ))
}

/// GET /api/cases/{id}/documents
pub async fn list_case_documents(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(user): AuthRequired,
    Path(id): Path<String>,
    Query(params): Query<DocumentListQuery>,
) -> Result<ApiResponse<Paginated<DocumentResponse>>, AppError> {
    let case_id = parse_uuid(&id)?;
    let scope = user.advocate_scope();

    repo::case::find_by_id(&pool, case_id, scope)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Case {id} not found")))?;

    if let Some(t) = params.document_type.as_deref() {
        ensure_one_of("document_type", t, DOCUMENT_TYPES)?;
    }

    let page = normalize_pagination(params.page, params.limit);
    let (docs, total) = repo::document::search(
        &pool,
        scope,
        Some(case_id),
        params.document_type.as_deref(),
        page.offset(),
        page.limit,
    )
    .await?;

    let items = docs.into_iter().map(DocumentResponse::from).collect();
    Ok(ApiResponse::ok(
        "Case documents fetched",
        Paginated::new(items, page.page, page.limit, total),
    ))
}

/// GET /api/documents/{id}
pub async fn get_document(
    State(pool): State<Pool<Postgres>>,
    State(storage): State<DynObjectStore>,
    AuthRequired(user): AuthRequired,
    Path(id): Path<String>,
) -> Result<ApiResponse<DocumentResponse>, AppError> {
    let doc_id = parse_uuid(&id)?;
    let doc = repo::document::find_by_id(&pool, doc_id, user.advocate_scope())
        .await?
        .ok_or_else(|| AppError::not_found(format!("Document {id} not found")))?;

    Ok(ApiResponse::ok(
        "Document fetched",
        with_download_url(&storage, doc).await,
    ))
}

/// GET /api/documents/{id}/file
///
/// Streams the stored bytes back through the API, for stores that cannot
/// presign.
pub async fn download_document(
    State(pool): State<Pool<Postgres>>,
    State(storage): State<DynObjectStore>,
    AuthRequired(user): AuthRequired,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let doc_id = parse_uuid(&id)?;
    let doc = repo::document::find_by_id(&pool, doc_id, user.advocate_scope())
        .await?
        .ok_or_else(|| AppError::not_found(format!("Document {id} not found")))?;

    let bytes = storage.get(&doc.storage_key).await?;

    let content_disposition = format!(
        "attachment; filename=\"{}\"",
        doc.file_name.replace('"', "\\\"")
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, doc.mime_type),
            (header::CONTENT_DISPOSITION, content_disposition),
        ],
        bytes,
    ))
}

/// POST /api/documents (multipart)
///
/// Form fields: `file` (required), `case_id`, `document_type`, `description`.
#[tracing::instrument(skip(pool, storage, user, multipart), fields(user_id = %user.id))]
pub async fn upload_document(
    State(pool): State<Pool<Postgres>>,
    State(storage): State<DynObjectStore>,
    RoleRequired(user): StaffRequired,
    mut multipart: Multipart,
) -> Result<(StatusCode, ApiResponse<DocumentResponse>), AppError> {
    let max_bytes = max_upload_bytes();
    let mut fields = DocumentUploadFields::default();
    let mut file: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name().unwrap_or_default() {
            "file" => {
                let file_name = field.file_name().unwrap_or("file").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(multipart_error)?;
                if data.len() > max_bytes {
                    return Err(AppError::payload_too_large(format!(
                        "File exceeds the {max_bytes} byte upload limit"
                    )));
                }
                file = Some((file_name, content_type, data.to_vec()));
            }
            "case_id" => {
                fields.case_id = match text_field(field).await? {
                    Some(raw) => Some(parse_uuid(&raw)?),
                    None => None,
                };
            }
            "document_type" => fields.document_type = text_field(field).await?,
            "description" => fields.description = text_field(field).await?,
            other => {
                tracing::debug!(field = %other, "ignoring unknown upload field");
            }
        }
    }

    let (raw_name, mime_type, data) =
        file.ok_or_else(|| AppError::bad_request("A 'file' field is required"))?;
    if data.is_empty() {
        return Err(AppError::bad_request("Uploaded file is empty"));
    }

    let document_type = fields.document_type.as_deref().unwrap_or("other");
    ensure_one_of("document_type", document_type, DOCUMENT_TYPES)?;

    if let Some(case_id) = fields.case_id {
        repo::case::find_by_id(&pool, case_id, user.advocate_scope())
            .await?
            .ok_or_else(|| AppError::not_found(format!("Case {case_id} not found")))?;
    }

    let file_name = sanitize_file_name(&raw_name);
    let storage_key = document_storage_key(fields.case_id, Uuid::new_v4(), &file_name);
    let file_size = data.len() as i64;

    storage.put(&storage_key, &mime_type, data).await?;

    let created = repo::document::create(
        &pool,
        &NewDocument {
            case_id: fields.case_id,
            uploaded_by: user.id,
            file_name: &file_name,
            storage_key: &storage_key,
            mime_type: &mime_type,
            file_size,
            document_type,
            description: fields.description.as_deref(),
        },
    )
    .await;

    let doc = match created {
        Ok(doc) => doc,
        Err(e) => {
            if let Err(cleanup) = storage.delete(&storage_key).await {
                tracing::warn!(key = %storage_key, error = %cleanup, "failed to remove orphaned upload");
            }
            return Err(e);
        }
    };

    tracing::info!(document_id = %doc.id, size = file_size, "document uploaded");

    repo::activity::record(
        &pool,
        user.id,
        ActivityAction::Upload,
        "document",
        Some(doc.id),
        format!("Uploaded {}", doc.file_name),
    )
    .await;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(
            "Document uploaded successfully",
            with_download_url(&storage, doc).await,
        ),
    ))
}

/// PUT /api/documents/{id}
#[tracing::instrument(skip(pool, user, body), fields(user_id = %user.id))]
pub async fn update_document(
    State(pool): State<Pool<Postgres>>,
    RoleRequired(user): StaffRequired,
    Path(id): Path<String>,
    Json(body): Json<UpdateDocumentRequest>,
) -> Result<ApiResponse<DocumentResponse>, AppError> {
    let doc_id = parse_uuid(&id)?;
    if let Some(t) = body.document_type.as_deref() {
        ensure_one_of("document_type", t, DOCUMENT_TYPES)?;
    }

    repo::document::find_by_id(&pool, doc_id, user.advocate_scope())
        .await?
        .ok_or_else(|| AppError::not_found(format!("Document {id} not found")))?;

    let doc = repo::document::update(&pool, doc_id, &body)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Document {id} not found")))?;

    repo::activity::record(
        &pool,
        user.id,
        ActivityAction::Update,
        "document",
        Some(doc.id),
        format!("Updated {}", doc.file_name),
    )
    .await;

    Ok(ApiResponse::ok("Document updated successfully", DocumentResponse::from(doc)))
}

/// DELETE /api/documents/{id}
///
/// Only the uploader or an admin may delete. The stored object is removed
/// after the row; a failure there is logged and the delete still succeeds.
#[tracing::instrument(skip(pool, storage, user), fields(user_id = %user.id))]
pub async fn delete_document(
    State(pool): State<Pool<Postgres>>,
    State(storage): State<DynObjectStore>,
    AuthRequired(user): AuthRequired,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    let doc_id = parse_uuid(&id)?;

    let doc = repo::document::find_by_id(&pool, doc_id, user.advocate_scope())
        .await?
        .ok_or_else(|| AppError::not_found(format!("Document {id} not found")))?;

    if !user.is_admin() && doc.uploaded_by != user.id {
        return Err(AppError::forbidden(
            "Only the uploader or an admin can delete this document",
        ));
    }

    let removed = repo::document::delete(&pool, doc_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Document {id} not found")))?;

    if let Err(e) = storage.delete(&removed.storage_key).await {
        tracing::warn!(key = %removed.storage_key, error = %e, "failed to delete stored document");
    }

    repo::activity::record(
        &pool,
        user.id,
        ActivityAction::Delete,
        "document",
        Some(doc_id),
        format!("Deleted {}", removed.file_name),
    )
    .await;

    Ok(ApiResponse::message("Document deleted successfully"))
}

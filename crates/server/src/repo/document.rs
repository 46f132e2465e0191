use shared_types::{AppError, Document, UpdateDocumentRequest};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;

// An advocate sees a document when it hangs off one of their cases or when
// they uploaded it themselves.

/// Metadata for a freshly stored upload.
#[derive(Debug, Clone)]
pub struct NewDocument<'a> {
    pub case_id: Option<Uuid>,
    pub uploaded_by: Uuid,
    pub file_name: &'a str,
    pub storage_key: &'a str,
    pub mime_type: &'a str,
    pub file_size: i64,
    pub document_type: &'a str,
    pub description: Option<&'a str>,
}

pub async fn create(pool: &Pool<Postgres>, doc: &NewDocument<'_>) -> Result<Document, AppError> {
    sqlx::query_as::<_, Document>(
        r#"
        INSERT INTO documents
            (case_id, uploaded_by, file_name, storage_key, mime_type, file_size,
             document_type, description)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, case_id, uploaded_by, file_name, storage_key, mime_type,
                  file_size, document_type, description, created_at
        "#,
    )
    .bind(doc.case_id)
    .bind(doc.uploaded_by)
    .bind(doc.file_name)
    .bind(doc.storage_key)
    .bind(doc.mime_type)
    .bind(doc.file_size)
    .bind(doc.document_type)
    .bind(doc.description)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

pub async fn find_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
    scope: Option<Uuid>,
) -> Result<Option<Document>, AppError> {
    sqlx::query_as::<_, Document>(
        r#"
        SELECT d.id, d.case_id, d.uploaded_by, d.file_name, d.storage_key, d.mime_type,
               d.file_size, d.document_type, d.description, d.created_at
        FROM documents d
        LEFT JOIN cases c ON c.id = d.case_id
        WHERE d.id = $1
          AND ($2::UUID IS NULL OR c.advocate_id = $2 OR d.uploaded_by = $2)
        "#,
    )
    .bind(id)
    .bind(scope)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Paginated listing, newest first.
pub async fn search(
    pool: &Pool<Postgres>,
    scope: Option<Uuid>,
    case_id: Option<Uuid>,
    document_type: Option<&str>,
    offset: i64,
    limit: i64,
) -> Result<(Vec<Document>, i64), AppError> {
    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM documents d
        LEFT JOIN cases c ON c.id = d.case_id
        WHERE ($1::UUID IS NULL OR c.advocate_id = $1 OR d.uploaded_by = $1)
          AND ($2::UUID IS NULL OR d.case_id = $2)
          AND ($3::TEXT IS NULL OR d.document_type = $3)
        "#,
    )
    .bind(scope)
    .bind(case_id)
    .bind(document_type)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    let rows = sqlx::query_as::<_, Document>(
        r#"
        SELECT d.id, d.case_id, d.uploaded_by, d.file_name, d.storage_key, d.mime_type,
               d.file_size, d.document_type, d.description, d.created_at
        FROM documents d
        LEFT JOIN cases c ON c.id = d.case_id
        WHERE ($1::UUID IS NULL OR c.advocate_id = $1 OR d.uploaded_by = $1)
          AND ($2::UUID IS NULL OR d.case_id = $2)
          AND ($3::TEXT IS NULL OR d.document_type = $3)
        ORDER BY d.created_at DESC
        LIMIT $4 OFFSET $5
        "#,
    )
    .bind(scope)
    .bind(case_id)
    .bind(document_type)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok((rows, total))
}

pub async fn update(
    pool: &Pool<Postgres>,
    id: Uuid,
    req: &UpdateDocumentRequest,
) -> Result<Option<Document>, AppError> {
    sqlx::query_as::<_, Document>(
        r#"
        UPDATE documents SET
            document_type = COALESCE($2, document_type),
            description   = COALESCE($3, description)
        WHERE id = $1
        RETURNING id, case_id, uploaded_by, file_name, storage_key, mime_type,
                  file_size, document_type, description, created_at
        "#,
    )
    .bind(id)
    .bind(req.document_type.as_deref())
    .bind(req.description.as_deref())
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Delete the metadata row, returning it so the caller can remove the object.
pub async fn delete(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<Document>, AppError> {
    sqlx::query_as::<_, Document>(
        r#"
        DELETE FROM documents WHERE id = $1
        RETURNING id, case_id, uploaded_by, file_name, storage_key, mime_type,
                  file_size, document_type, description, created_at
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Storage keys of every document attached to a case, collected before the
/// case delete cascades away the rows.
pub async fn storage_keys_for_case(pool: &Pool<Postgres>, case_id: Uuid) -> Result<Vec<String>, AppError> {
    sqlx::query_scalar::<_, String>("SELECT storage_key FROM documents WHERE case_id = $1")
        .bind(case_id)
        .fetch_all(pool)
        .await
        .map_err(SqlxErrorExt::into_app_error)
}

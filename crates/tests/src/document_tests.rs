use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::common::{create_test_case, delete, get, put_json, test_app, OTHER_ADVOCATE_ID};

const BOUNDARY: &str = "chakshi-test-boundary";

fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, content_type, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn upload(app: &Router, token: &str, body: Vec<u8>) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri("/api/documents")
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn upload_list_and_download() {
    let (app, _pool, tokens, _guard) = test_app().await;
    let case_id = create_test_case(&app, &tokens.advocate, "CS/200/2026", None).await;

    let body = multipart_body(
        &[("case_id", &case_id), ("document_type", "petition"), ("description", "Main petition")],
        Some(("../Writ Petition.pdf", "application/pdf", b"%PDF-1.7 test")),
    );
    let (status, resp) = upload(&app, &tokens.advocate, body).await;
    assert_eq!(status, StatusCode::CREATED, "{resp}");
    assert_eq!(resp["data"]["document_type"], "petition");
    assert_eq!(resp["data"]["file_size"], 13);
    assert_eq!(resp["data"]["mime_type"], "application/pdf");
    let file_name = resp["data"]["file_name"].as_str().unwrap();
    assert!(!file_name.contains('/'));
    assert!(file_name.ends_with(".pdf"));
    let doc_id = resp["data"]["id"].as_str().unwrap().to_string();

    let (_, list) = get(&app, &format!("/api/cases/{case_id}/documents"), &tokens.advocate).await;
    assert_eq!(list["data"]["pagination"]["total"], 1);

    let req = Request::builder()
        .uri(format!("/api/documents/{doc_id}/file"))
        .header("authorization", format!("Bearer {}", tokens.advocate))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/pdf");
    assert!(response.headers()["content-disposition"]
        .to_str()
        .unwrap()
        .starts_with("attachment;"));
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"%PDF-1.7 test");
}

#[tokio::test]
async fn upload_requires_a_non_empty_file() {
    let (app, _pool, tokens, _guard) = test_app().await;

    let (status, resp) = upload(&app, &tokens.advocate, multipart_body(&[("description", "x")], None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["message"], "A 'file' field is required");

    let (status, _) = upload(
        &app,
        &tokens.advocate,
        multipart_body(&[], Some(("empty.txt", "text/plain", b""))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_rejects_unknown_type_and_foreign_case() {
    let (app, _pool, tokens, _guard) = test_app().await;
    let theirs = create_test_case(&app, &tokens.clerk, "CS/201/2026", Some(OTHER_ADVOCATE_ID)).await;

    let (status, _) = upload(
        &app,
        &tokens.advocate,
        multipart_body(&[("document_type", "memo")], Some(("a.txt", "text/plain", b"hi"))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = upload(
        &app,
        &tokens.advocate,
        multipart_body(&[("case_id", &theirs)], Some(("a.txt", "text/plain", b"hi"))),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn students_cannot_upload() {
    let (app, _pool, tokens, _guard) = test_app().await;
    let (status, _) = upload(
        &app,
        &tokens.student,
        multipart_body(&[], Some(("notes.txt", "text/plain", b"notes"))),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn only_uploader_or_admin_may_delete() {
    let (app, _pool, tokens, _guard) = test_app().await;
    let case_id = create_test_case(&app, &tokens.advocate, "CS/202/2026", None).await;

    let (_, resp) = upload(
        &app,
        &tokens.clerk,
        multipart_body(&[("case_id", &case_id)], Some(("affidavit.txt", "text/plain", b"sworn"))),
    )
    .await;
    let doc_id = resp["data"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/documents/{doc_id}");

    let (status, _) = delete(&app, &uri, &tokens.advocate).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, resp) = put_json(&app, &uri, json!({ "document_type": "affidavit" }), &tokens.advocate).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["data"]["document_type"], "affidavit");

    let (status, _) = delete(&app, &uri, &tokens.admin).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(&app, &format!("{uri}/file"), &tokens.admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_case_removes_its_documents() {
    let (app, pool, tokens, _guard) = test_app().await;
    let case_id = create_test_case(&app, &tokens.advocate, "CS/203/2026", None).await;
    upload(
        &app,
        &tokens.advocate,
        multipart_body(&[("case_id", &case_id)], Some(("order.txt", "text/plain", b"order"))),
    )
    .await;

    let (status, _) = delete(&app, &format!("/api/cases/{case_id}"), &tokens.advocate).await;
    assert_eq!(status, StatusCode::OK);

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

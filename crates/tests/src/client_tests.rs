use axum::http::StatusCode;
use serde_json::json;

use crate::common::{
    create_test_client, delete, get, post_json, put_json, test_app, ADVOCATE_ID,
};

#[tokio::test]
async fn create_client_defaults_to_individual() {
    let (app, _pool, tokens, _guard) = test_app().await;

    let (status, resp) = post_json(
        &app,
        "/api/clients",
        json!({ "name": "Sunita Deshmukh", "phone": "+91 98200 00000" }),
        &tokens.advocate,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(resp["data"]["client_type"], "individual");
    assert_eq!(resp["data"]["advocate_id"], ADVOCATE_ID.to_string());
}

#[tokio::test]
async fn create_client_validates_fields() {
    let (app, _pool, tokens, _guard) = test_app().await;

    let (status, resp) = post_json(
        &app,
        "/api/clients",
        json!({ "name": "", "email": "nope" }),
        &tokens.advocate,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp["field_errors"]["name"].is_string());
    assert!(resp["field_errors"]["email"].is_string());

    let (status, _) = post_json(
        &app,
        "/api/clients",
        json!({ "name": "Acme Traders", "client_type": "trust" }),
        &tokens.advocate,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn students_cannot_read_clients() {
    let (app, _pool, tokens, _guard) = test_app().await;
    create_test_client(&app, &tokens.advocate, "Private Person", None).await;

    let (status, _) = get(&app, "/api/clients", &tokens.student).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, resp) = get(&app, "/api/clients", &tokens.clerk).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["data"]["pagination"]["total"], 1);
}

#[tokio::test]
async fn client_list_is_scoped_and_searchable() {
    let (app, _pool, tokens, _guard) = test_app().await;
    create_test_client(&app, &tokens.advocate, "Anand Joshi", None).await;
    create_test_client(&app, &tokens.advocate, "Bela Kapoor", None).await;
    create_test_client(&app, &tokens.other_advocate, "Chetan Nair", None).await;

    let (_, resp) = get(&app, "/api/clients", &tokens.advocate).await;
    assert_eq!(resp["data"]["pagination"]["total"], 2);
    assert_eq!(resp["data"]["items"][0]["name"], "Anand Joshi");

    let (_, resp) = get(&app, "/api/clients?search=kapoor", &tokens.advocate).await;
    assert_eq!(resp["data"]["pagination"]["total"], 1);
    assert_eq!(resp["data"]["items"][0]["name"], "Bela Kapoor");
}

#[tokio::test]
async fn update_and_list_client_cases() {
    let (app, _pool, tokens, _guard) = test_app().await;
    let client_id = create_test_client(&app, &tokens.advocate, "Farhan Ali", None).await;

    let (status, resp) = put_json(
        &app,
        &format!("/api/clients/{client_id}"),
        json!({ "client_type": "organization", "notes": "Retainer signed" }),
        &tokens.advocate,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["data"]["client_type"], "organization");
    assert_eq!(resp["data"]["notes"], "Retainer signed");

    let (status, _) = post_json(
        &app,
        "/api/cases",
        json!({
            "client_id": client_id,
            "case_number": "COMM/4/2026",
            "title": "Ali Exports v. Bank",
            "case_type": "corporate",
            "court_name": "Commercial Court",
        }),
        &tokens.advocate,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, resp) = get(&app, &format!("/api/clients/{client_id}/cases"), &tokens.advocate).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["data"]["pagination"]["total"], 1);
    assert_eq!(resp["data"]["items"][0]["case_number"], "COMM/4/2026");
}

#[tokio::test]
async fn deleting_a_client_detaches_its_cases() {
    let (app, _pool, tokens, _guard) = test_app().await;
    let client_id = create_test_client(&app, &tokens.advocate, "Gita Menon", None).await;

    let (_, created) = post_json(
        &app,
        "/api/cases",
        json!({
            "client_id": client_id,
            "case_number": "FAM/8/2026",
            "title": "Menon v. Menon",
            "case_type": "family",
        }),
        &tokens.advocate,
    )
    .await;
    let case_id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = delete(&app, &format!("/api/clients/{client_id}"), &tokens.clerk).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = delete(&app, &format!("/api/clients/{client_id}"), &tokens.advocate).await;
    assert_eq!(status, StatusCode::OK);

    let (status, resp) = get(&app, &format!("/api/cases/{case_id}"), &tokens.advocate).await;
    assert_eq!(status, StatusCode::OK);
    assert!(resp["data"].get("client_id").map_or(true, |v| v.is_null()));
}

#[tokio::test]
async fn foreign_client_is_not_found() {
    let (app, _pool, tokens, _guard) = test_app().await;
    let theirs = create_test_client(&app, &tokens.other_advocate, "Hidden", None).await;

    let (status, _) = get(&app, &format!("/api/clients/{theirs}"), &tokens.advocate).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&app, &format!("/api/clients/{theirs}"), &tokens.admin).await;
    assert_eq!(status, StatusCode::OK);
}

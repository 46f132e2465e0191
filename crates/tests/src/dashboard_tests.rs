use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{
    create_test_case, create_test_client, create_test_hearing, get, put_json, test_app,
    OTHER_ADVOCATE_ID,
};

#[tokio::test]
async fn stats_are_scoped_for_advocates() {
    let (app, _pool, tokens, _guard) = test_app().await;
    let open = create_test_case(&app, &tokens.advocate, "CS/400/2026", None).await;
    let closed = create_test_case(&app, &tokens.advocate, "CS/401/2026", None).await;
    create_test_case(&app, &tokens.clerk, "CS/402/2026", Some(OTHER_ADVOCATE_ID)).await;
    create_test_client(&app, &tokens.advocate, "Dashboard Client", None).await;
    create_test_hearing(&app, &tokens.advocate, &open, 3).await;

    let (status, _) = put_json(
        &app,
        &format!("/api/cases/{closed}"),
        json!({ "status": "won" }),
        &tokens.advocate,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, resp) = get(&app, "/api/dashboard/stats", &tokens.advocate).await;
    assert_eq!(status, StatusCode::OK);
    let stats = &resp["data"];
    assert_eq!(stats["total_cases"], 2);
    assert_eq!(stats["open_cases"], 1);
    assert_eq!(stats["closed_cases"], 1);
    assert_eq!(stats["total_clients"], 1);
    assert_eq!(stats["upcoming_hearings"], 1);
    assert_eq!(stats["unread_notifications"], 1);
    assert!(stats.get("users_by_role").map_or(true, |v| v.is_null()));
}

#[tokio::test]
async fn admin_stats_include_user_breakdown() {
    let (app, _pool, tokens, _guard) = test_app().await;
    create_test_case(&app, &tokens.advocate, "CS/403/2026", None).await;
    create_test_case(&app, &tokens.other_advocate, "CS/404/2026", None).await;

    let (_, resp) = get(&app, "/api/dashboard/stats", &tokens.admin).await;
    assert_eq!(resp["data"]["total_cases"], 2);
    assert_eq!(resp["data"]["users_by_role"]["advocate"], 2);
    assert_eq!(resp["data"]["users_by_role"]["clerk"], 1);
    assert_eq!(resp["data"]["users_by_role"]["student"], 1);
    assert_eq!(resp["data"]["users_by_role"]["admin"], 1);
}

#[tokio::test]
async fn upcoming_and_recent_lists_honour_limit() {
    let (app, _pool, tokens, _guard) = test_app().await;
    let case_id = create_test_case(&app, &tokens.advocate, "CS/405/2026", None).await;
    for day in 1..=4 {
        create_test_hearing(&app, &tokens.advocate, &case_id, day).await;
    }

    let (status, resp) = get(&app, "/api/dashboard/upcoming-hearings?limit=2", &tokens.advocate).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["data"].as_array().unwrap().len(), 2);

    let (_, resp) = get(&app, "/api/dashboard/upcoming-hearings", &tokens.other_advocate).await;
    assert_eq!(resp["data"].as_array().unwrap().len(), 0);

    let (_, resp) = get(&app, "/api/dashboard/recent-activity", &tokens.advocate).await;
    assert_eq!(resp["data"].as_array().unwrap().len(), 5);
    assert_eq!(resp["data"][0]["entity_type"], "hearing");
}

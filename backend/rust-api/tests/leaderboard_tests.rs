use axum::http::StatusCode;
use serde_json::json;

mod common;

use common::{api, create_session, create_test_app, join, report_score, start};

async fn leaderboard(app: &axum::Router, code: &str) -> (StatusCode, serde_json::Value) {
    api(
        app,
        "GET",
        &format!("/api/v1/sessions/{code}/leaderboard"),
        "viewer",
        None,
    )
    .await
}

#[tokio::test]
async fn test_leaderboard_orders_by_score_descending() {
    let app = create_test_app().await;
    let code = create_session(&app, "host-1", "Asha").await;
    join(&app, &code, "user-2", "Ben").await;
    join(&app, &code, "user-3", "Cara").await;
    start(&app, &code, "host-1").await;

    report_score(&app, &code, "host-1", 4).await;
    report_score(&app, &code, "user-2", 9).await;
    report_score(&app, &code, "user-3", 1).await;

    let (status, board) = leaderboard(&app, &code).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        board["entries"],
        json!([
            {"display_name": "Ben", "score": 9},
            {"display_name": "Asha", "score": 4},
            {"display_name": "Cara", "score": 1},
        ])
    );
}

#[tokio::test]
async fn test_ties_rank_earlier_joiners_first() {
    let app = create_test_app().await;
    let code = create_session(&app, "host-1", "Asha").await;
    join(&app, &code, "user-2", "Ben").await;
    join(&app, &code, "user-3", "Cara").await;
    start(&app, &code, "host-1").await;

    // Everyone lands on the same score; seating order decides.
    for user in ["host-1", "user-2", "user-3"] {
        report_score(&app, &code, user, 6).await;
    }

    let (_, board) = leaderboard(&app, &code).await;
    assert_eq!(
        board["entries"],
        json!([
            {"display_name": "Asha", "score": 6},
            {"display_name": "Ben", "score": 6},
            {"display_name": "Cara", "score": 6},
        ])
    );
}

#[tokio::test]
async fn test_leaderboard_is_stable_across_repeated_polls() {
    let app = create_test_app().await;
    let code = create_session(&app, "host-1", "Asha").await;
    join(&app, &code, "user-2", "Ben").await;
    start(&app, &code, "host-1").await;

    report_score(&app, &code, "host-1", 6).await;
    report_score(&app, &code, "user-2", 6).await;

    let (_, first) = leaderboard(&app, &code).await;
    for _ in 0..5 {
        let (_, again) = leaderboard(&app, &code).await;
        assert_eq!(again["entries"], first["entries"]);
    }
}

#[tokio::test]
async fn test_leaderboard_is_available_mid_round() {
    let app = create_test_app().await;
    let code = create_session(&app, "host-1", "Asha").await;
    join(&app, &code, "user-2", "Ben").await;
    start(&app, &code, "host-1").await;

    report_score(&app, &code, "user-2", 3).await;

    // Live standings while the round is still active.
    let (status, board) = leaderboard(&app, &code).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(board["status"], "active");
    assert_eq!(
        board["entries"],
        json!([
            {"display_name": "Ben", "score": 3},
            {"display_name": "Asha", "score": 0},
        ])
    );
}

#[tokio::test]
async fn test_leaderboard_in_lobby_is_all_zeros() {
    let app = create_test_app().await;
    let code = create_session(&app, "host-1", "Asha").await;
    join(&app, &code, "user-2", "Ben").await;

    let (status, board) = leaderboard(&app, &code).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(board["status"], "lobby");
    assert_eq!(
        board["entries"],
        json!([
            {"display_name": "Asha", "score": 0},
            {"display_name": "Ben", "score": 0},
        ])
    );
}

#[tokio::test]
async fn test_leaderboard_unknown_session_is_not_found() {
    let app = create_test_app().await;

    let (status, body) = leaderboard(&app, "ZZZZZ").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "session_not_found");
}

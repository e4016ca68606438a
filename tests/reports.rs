#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;

use common::{bearer, send, seed_user, state};
use tasktracker::models::UserRole;

#[actix_rt::test]
async fn test_reports_require_admin() {
    let (memory, repo, keys) = state();
    let user = seed_user(&memory, "user@example.com", UserRole::User).await;
    let app = init_app!(repo, keys);

    for uri in ["/reports/completion", "/reports/overdue", "/reports/projects"] {
        let req = test::TestRequest::get()
            .uri(uri)
            .insert_header(bearer(&keys, &user))
            .to_request();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "uri: {}", uri);
        assert_eq!(body["error"], "Admin access required");

        let req = test::TestRequest::get().uri(uri).to_request();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "uri: {}", uri);
    }
}

#[actix_rt::test]
async fn test_completion_overdue_and_project_reports() {
    let (memory, repo, keys) = state();
    let user = seed_user(&memory, "user@example.com", UserRole::User).await;
    let admin = seed_user(&memory, "admin@example.com", UserRole::Admin).await;
    let app = init_app!(repo, keys);

    let req = test::TestRequest::post()
        .uri("/projects")
        .insert_header(bearer(&keys, &user))
        .set_json(json!({ "name": "Tracked" }))
        .to_request();
    let (_, project) = send(&app, req).await;
    let project_id = project["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/projects")
        .insert_header(bearer(&keys, &user))
        .set_json(json!({ "name": "Empty" }))
        .to_request();
    send(&app, req).await;

    let today = Utc::now().date_naive();
    let yesterday = (today - Duration::days(1)).to_string();
    let tasks = [
        json!({ "title": "Late", "due_date": yesterday, "project_id": project_id }),
        json!({ "title": "Late but done", "status": "done", "due_date": yesterday }),
        json!({ "title": "Due today", "status": "in_progress", "due_date": today.to_string() }),
        json!({ "title": "Finished", "status": "done", "project_id": project_id }),
    ];
    for payload in tasks {
        let req = test::TestRequest::post()
            .uri("/tasks")
            .insert_header(bearer(&keys, &user))
            .set_json(&payload)
            .to_request();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let req = test::TestRequest::get()
        .uri("/reports/completion")
        .insert_header(bearer(&keys, &admin))
        .to_request();
    let (status, report) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["total_tasks"], 4);
    assert_eq!(report["pending"], 1);
    assert_eq!(report["in_progress"], 1);
    assert_eq!(report["done"], 2);
    assert_eq!(report["completion_rate"].as_f64(), Some(50.0));

    let req = test::TestRequest::get()
        .uri(&format!("/reports/completion?project_id={}", project_id))
        .insert_header(bearer(&keys, &admin))
        .to_request();
    let (_, report) = send(&app, req).await;
    assert_eq!(report["total_tasks"], 2);
    assert_eq!(report["done"], 1);

    let req = test::TestRequest::get()
        .uri(&format!("/reports/completion?due_after={}", today))
        .insert_header(bearer(&keys, &admin))
        .to_request();
    let (_, report) = send(&app, req).await;
    assert_eq!(report["total_tasks"], 1);
    assert_eq!(report["in_progress"], 1);

    let req = test::TestRequest::get()
        .uri("/reports/overdue")
        .insert_header(bearer(&keys, &admin))
        .to_request();
    let (status, overdue) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = overdue
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Late"]);

    let req = test::TestRequest::get()
        .uri("/reports/projects")
        .insert_header(bearer(&keys, &admin))
        .to_request();
    let (status, stats) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        stats,
        json!({
            "total_projects": 2,
            "active_projects": 1,
            "completed_projects": 0,
            "projects_with_tasks": 1
        })
    );
}

#[actix_rt::test]
async fn test_empty_completion_report() {
    let (memory, repo, keys) = state();
    let admin = seed_user(&memory, "admin@example.com", UserRole::Admin).await;
    let app = init_app!(repo, keys);

    let req = test::TestRequest::get()
        .uri("/reports/completion")
        .insert_header(bearer(&keys, &admin))
        .to_request();
    let (status, report) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["total_tasks"], 0);
    assert_eq!(report["completion_rate"].as_f64(), Some(0.0));

    let req = test::TestRequest::get()
        .uri("/reports/completion?due_after=2030-02-01&due_before=2030-01-01")
        .insert_header(bearer(&keys, &admin))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

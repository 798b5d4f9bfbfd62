mod common;

use axum::{http::Method, http::StatusCode, Router};
use serde_json::{json, Value as JsonValue};
use sqlx::PgPool;

use common::{database_app, send, unique_tag};

fn candidate_body(tag: &str, email: &str, skills: &[String]) -> JsonValue {
    json!({
        "name": format!("Candidate {}", tag),
        "position": "Backend Developer",
        "status": "active",
        "email": email,
        "phone": "+1-555-0101",
        "description": "Integration test candidate",
        "skills": skills,
    })
}

async fn create(app: &Router, body: JsonValue) -> JsonValue {
    let (status, created) = send(app, Method::POST, "/api/candidates", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    created
}

async fn link_count(pool: &PgPool, candidate_id: i64) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM candidate_skills WHERE candidate_id = $1")
        .bind(candidate_id as i32)
        .fetch_one(pool)
        .await
        .expect("count links")
}

#[tokio::test]
async fn duplicate_email_is_rejected_case_insensitively() {
    let Some((app, pool)) = database_app().await else {
        return;
    };
    let tag = unique_tag();
    let email = format!("dup-{}@example.com", tag);
    create(&app, candidate_body(&tag, &email, &[format!("dup-skill-{}", tag)])).await;

    let shouted = format!("DUP-{}@Example.COM", tag);
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/candidates",
        Some(candidate_body(&tag, &shouted, &[format!("dup-skill-{}", tag)])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Email already exists" }));

    let rows = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM candidates WHERE LOWER(email) = LOWER($1)",
    )
    .bind(&email)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn created_candidate_keeps_skill_order_without_repeats() {
    let Some((app, _pool)) = database_app().await else {
        return;
    };
    let tag = unique_tag();
    let zeta = format!("zeta-{}", tag);
    let alpha = format!("alpha-{}", tag);
    let created = create(
        &app,
        candidate_body(
            &tag,
            &format!("  Order-{}@Example.com ", tag),
            &[zeta.clone(), alpha.clone(), format!(" {} ", zeta)],
        ),
    )
    .await;
    assert_eq!(created["email"], format!("order-{}@example.com", tag));
    assert_eq!(created["skills"], json!([zeta, alpha]));
    assert_eq!(created["status"], "active");

    let id = created["id"].as_i64().unwrap();
    let (status, fetched) = send(&app, Method::GET, &format!("/api/candidates/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn status_change_touches_only_status_and_updated_at() {
    let Some((app, _pool)) = database_app().await else {
        return;
    };
    let tag = unique_tag();
    let created = create(
        &app,
        candidate_body(&tag, &format!("status-{}@example.com", tag), &[format!("s-{}", tag)]),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = send(
        &app,
        Method::PATCH,
        &format!("/api/candidates/{}/status", id),
        Some(json!({ "status": "interview" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "interview");
    for field in ["id", "name", "position", "email", "phone", "description", "skills", "createdAt"] {
        assert_eq!(updated[field], created[field], "{}", field);
    }

    let before: chrono::DateTime<chrono::Utc> =
        serde_json::from_value(created["updatedAt"].clone()).unwrap();
    let after: chrono::DateTime<chrono::Utc> =
        serde_json::from_value(updated["updatedAt"].clone()).unwrap();
    assert!(after >= before);
}

#[tokio::test]
async fn skill_update_replaces_every_link() {
    let Some((app, pool)) = database_app().await else {
        return;
    };
    let tag = unique_tag();
    let (a, b, c) = (
        format!("a-{}", tag),
        format!("b-{}", tag),
        format!("c-{}", tag),
    );
    let created = create(
        &app,
        candidate_body(&tag, &format!("replace-{}@example.com", tag), &[a.clone(), b.clone()]),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/candidates/{}", id),
        Some(json!({ "skills": [c.clone()], "position": "Staff Engineer" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["skills"], json!([c]));
    assert_eq!(updated["position"], "Staff Engineer");
    assert_eq!(updated["name"], created["name"]);
    assert_eq!(link_count(&pool, id).await, 1);

    let stale = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM candidate_skills cs
        JOIN skills s ON s.id = cs.skill_id
        WHERE cs.candidate_id = $1 AND s.name = ANY($2)
        "#,
    )
    .bind(id as i32)
    .bind(vec![a, b])
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(stale, 0);

    let (status, cleared) = send(
        &app,
        Method::PUT,
        &format!("/api/candidates/{}", id),
        Some(json!({ "skills": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cleared["skills"], json!([]));
}

#[tokio::test]
async fn update_rejects_an_email_owned_by_someone_else() {
    let Some((app, _pool)) = database_app().await else {
        return;
    };
    let tag = unique_tag();
    let first_email = format!("first-{}@example.com", tag);
    create(&app, candidate_body(&tag, &first_email, &[format!("e-{}", tag)])).await;
    let second = create(
        &app,
        candidate_body(&tag, &format!("second-{}@example.com", tag), &[format!("e-{}", tag)]),
    )
    .await;
    let uri = format!("/api/candidates/{}", second["id"]);

    let (status, body) = send(&app, Method::PUT, &uri, Some(json!({ "email": first_email.to_uppercase() }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email already exists");

    let (status, body) = send(&app, Method::PUT, &uri, Some(json!({ "email": second["email"] }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], second["email"]);
}

#[tokio::test]
async fn deleted_candidate_is_gone_with_its_links() {
    let Some((app, pool)) = database_app().await else {
        return;
    };
    let tag = unique_tag();
    let created = create(
        &app,
        candidate_body(&tag, &format!("delete-{}@example.com", tag), &[format!("d-{}", tag)]),
    )
    .await;
    let id = created["id"].as_i64().unwrap();
    let uri = format!("/api/candidates/{}", id);

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Candidate deleted successfully" }));

    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Candidate not found" }));
    assert_eq!(link_count(&pool, id).await, 0);

    let (_, list) = send(&app, Method::GET, "/api/candidates", None).await;
    assert!(list
        .as_array()
        .unwrap()
        .iter()
        .all(|c| c["id"].as_i64() != Some(id)));

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::PUT, &uri, Some(json!({ "name": "Ghost" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("{}/status", uri),
        Some(json!({ "status": "rejected" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_is_newest_first_and_skills_are_listed_once() {
    let Some((app, _pool)) = database_app().await else {
        return;
    };
    let tag = unique_tag();
    let (x, y, z) = (
        format!("sx-{}", tag),
        format!("sy-{}", tag),
        format!("sz-{}", tag),
    );
    let older = create(
        &app,
        candidate_body(&tag, &format!("older-{}@example.com", tag), &[x.clone(), y.clone()]),
    )
    .await;
    let newer = create(
        &app,
        candidate_body(&tag, &format!("newer-{}@example.com", tag), &[y.clone(), z.clone()]),
    )
    .await;

    let (status, skills) = send(&app, Method::GET, "/api/candidates/all-skills", None).await;
    assert_eq!(status, StatusCode::OK);
    let ours: Vec<&str> = skills
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|s| s.as_str())
        .filter(|s| s.ends_with(tag.as_str()))
        .collect();
    assert_eq!(ours, vec![x.as_str(), y.as_str(), z.as_str()]);

    let (status, list) = send(&app, Method::GET, "/api/candidates", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = list
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["id"].as_i64())
        .collect();
    let newer_at = ids.iter().position(|id| Some(*id) == newer["id"].as_i64()).unwrap();
    let older_at = ids.iter().position(|id| Some(*id) == older["id"].as_i64()).unwrap();
    assert!(newer_at < older_at);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_sharing_skills_all_succeed() {
    let Some((app, _pool)) = database_app().await else {
        return;
    };
    let tag = unique_tag();
    let names: Vec<String> = ["p", "q", "r"]
        .iter()
        .map(|s| format!("{}-{}", s, tag))
        .collect();
    let reversed: Vec<String> = names.iter().rev().cloned().collect();

    // two of the three skills exist before the racing writers start
    create(
        &app,
        candidate_body(&tag, &format!("pre-{}@example.com", tag), &names[..2]),
    )
    .await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let app = app.clone();
        let skills = if i % 2 == 0 { names.clone() } else { reversed.clone() };
        let body = candidate_body(&tag, &format!("race-{}-{}@example.com", i, tag), &skills);
        handles.push(tokio::spawn(async move {
            send(&app, Method::POST, "/api/candidates", Some(body)).await
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let (status, body) = handle.await.unwrap();
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        let expected = if i % 2 == 0 { &names } else { &reversed };
        assert_eq!(body["skills"], json!(expected));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_creates_with_one_email_persist_a_single_row() {
    let Some((app, pool)) = database_app().await else {
        return;
    };
    let tag = unique_tag();
    let email = format!("race-{}@example.com", tag);

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let app = app.clone();
            let body = candidate_body(&tag, &email, &[format!("race-skill-{}", tag)]);
            tokio::spawn(async move {
                send(&app, Method::POST, "/api/candidates", Some(body)).await
            })
        })
        .collect();

    let mut statuses = Vec::new();
    for handle in handles {
        statuses.push(handle.await.unwrap().0);
    }
    assert_eq!(
        statuses.iter().filter(|s| **s == StatusCode::CREATED).count(),
        1,
        "{:?}",
        statuses
    );
    assert!(statuses.iter().any(|s| *s == StatusCode::BAD_REQUEST
        || *s == StatusCode::INTERNAL_SERVER_ERROR));

    let rows = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM candidates WHERE email = $1")
        .bind(&email)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

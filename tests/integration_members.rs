mod common;

use axum::http::StatusCode;
use common::{TestApp, add_member, create_test_user};
use projex::projex_models::ProjectRole;
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn test_add_member_by_email(pool: PgPool) {
    let app = TestApp::new(pool);
    let owner = create_test_user(app.db(), "owner").await;
    let grace = create_test_user(app.db(), "grace").await;
    let project_id = app.create_project(&owner, "Apollo").await;
    let uri = format!("/api/v1/projects/{project_id}/members");

    let res = app
        .post(
            &uri,
            &owner,
            json!({ "email": grace.email.to_uppercase(), "role": "project_admin" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    assert_eq!(res.body["data"]["role"], "project_admin");
    assert_eq!(res.body["data"]["username"], "grace");

    let again = app
        .post(&uri, &owner, json!({ "email": grace.email }))
        .await;
    assert_eq!(again.status, StatusCode::CONFLICT);
    assert_eq!(again.body["message"], "User is already a member of this project");

    let list = app.get(&uri, &grace).await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.body["data"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_add_unknown_user_is_not_found(pool: PgPool) {
    let app = TestApp::new(pool);
    let owner = create_test_user(app.db(), "owner").await;
    let project_id = app.create_project(&owner, "Apollo").await;

    let res = app
        .post(
            &format!("/api/v1/projects/{project_id}/members"),
            &owner,
            json!({ "email": "ghost@example.com" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_member_cannot_manage_members(pool: PgPool) {
    let app = TestApp::new(pool);
    let owner = create_test_user(app.db(), "owner").await;
    let member = create_test_user(app.db(), "member").await;
    let other = create_test_user(app.db(), "other").await;
    let project_id = app.create_project(&owner, "Apollo").await;
    add_member(app.db(), project_id, member.id, ProjectRole::ProjectAdmin).await;

    let res = app
        .post(
            &format!("/api/v1/projects/{project_id}/members"),
            &member,
            json!({ "email": other.email }),
        )
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_last_admin_is_protected(pool: PgPool) {
    let app = TestApp::new(pool);
    let owner = create_test_user(app.db(), "owner").await;
    let project_id = app.create_project(&owner, "Apollo").await;
    let uri = format!("/api/v1/projects/{project_id}/members/{}", owner.id);

    let demote = app.put(&uri, &owner, json!({ "role": "member" })).await;
    assert_eq!(demote.status, StatusCode::CONFLICT);
    assert_eq!(demote.body["message"], "A project must keep at least one admin");

    let remove = app.delete(&uri, &owner).await;
    assert_eq!(remove.status, StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_and_remove_member(pool: PgPool) {
    let app = TestApp::new(pool);
    let owner = create_test_user(app.db(), "owner").await;
    let grace = create_test_user(app.db(), "grace").await;
    let project_id = app.create_project(&owner, "Apollo").await;
    add_member(app.db(), project_id, grace.id, ProjectRole::Member).await;
    let uri = format!("/api/v1/projects/{project_id}/members/{}", grace.id);

    let res = app.put(&uri, &owner, json!({ "role": "admin" })).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.body["data"]["role"], "admin");

    // With a second admin the original one may step down.
    let owner_uri = format!("/api/v1/projects/{project_id}/members/{}", owner.id);
    let res = app.put(&owner_uri, &grace, json!({ "role": "member" })).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);

    let res = app.delete(&owner_uri, &grace).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);

    let res = app.delete(&owner_uri, &grace).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_admin_demotions_keep_one_admin(pool: PgPool) {
    let app = TestApp::new(pool);

    for round in 0..10 {
        let a = create_test_user(app.db(), &format!("a{round}")).await;
        let b = create_test_user(app.db(), &format!("b{round}")).await;
        let project_id = app.create_project(&a, &format!("Race {round}")).await;
        add_member(app.db(), project_id, b.id, ProjectRole::Admin).await;

        let demote_a = format!("/api/v1/projects/{project_id}/members/{}", a.id);
        let demote_b = format!("/api/v1/projects/{project_id}/members/{}", b.id);
        let (ra, rb) = tokio::join!(
            app.put(&demote_a, &b, json!({ "role": "member" })),
            app.put(&demote_b, &a, json!({ "role": "member" })),
        );

        let mut statuses = [ra.status, rb.status];
        statuses.sort();
        assert_eq!(
            statuses,
            [StatusCode::OK, StatusCode::CONFLICT],
            "round {round}: {} / {}",
            ra.body,
            rb.body
        );

        let admins = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM project_members WHERE project_id = $1 AND role = 'admin'",
        )
        .bind(project_id)
        .fetch_one(app.db())
        .await
        .unwrap();
        assert_eq!(admins, 1, "round {round}");
    }
}

mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn admin_routes_reject_everyone_else() {
    let app = TestApp::spawn().await;
    let (_, artist) = app.user("painter", "artist").await;
    let (victim, _) = app.user("walker", "user").await;

    assert_eq!(app.get("/admin/stats", None).await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        app.get("/admin/stats", Some(&artist)).await.status,
        StatusCode::FORBIDDEN
    );
    let ban = app
        .call(
            Method::PUT,
            &format!("/admin/users/{victim}/ban"),
            Some(&artist),
            Some(json!({"reason": "nope"})),
        )
        .await;
    assert_eq!(ban.status, StatusCode::FORBIDDEN);
    assert_eq!(app.count("SELECT COUNT(*) FROM moderation_logs").await, 0);
}

#[tokio::test]
async fn banning_writes_one_log_and_locks_the_account_out() {
    let app = TestApp::spawn().await;
    let (admin_id, admin) = app.admin("root").await;
    let (victim, victim_token) = app.user("walker", "user").await;

    let banned = app
        .call(
            Method::PUT,
            &format!("/admin/users/{victim}/ban"),
            Some(&admin),
            Some(json!({"reason": "spam"})),
        )
        .await;
    assert_eq!(banned.status, StatusCode::OK, "{}", banned.text());
    assert_eq!(banned.json()["status"], "banned");
    assert_eq!(banned.json()["ban_reason"], "spam");

    let logs = app.get("/admin/moderation-logs", Some(&admin)).await.json();
    assert_eq!(logs.as_array().unwrap().len(), 1);
    assert_eq!(logs[0]["action"], "ban_user");
    assert_eq!(logs[0]["target_type"], "user");
    assert_eq!(logs[0]["target_id"], victim);
    assert_eq!(logs[0]["admin_id"], admin_id);
    assert_eq!(logs[0]["reason"], "spam");

    assert_eq!(
        app.get("/users/me", Some(&victim_token)).await.status,
        StatusCode::FORBIDDEN
    );
    let login = app
        .login_reply("/auth/token", "walker@example.org", common::PASSWORD)
        .await;
    assert_eq!(login.status, StatusCode::FORBIDDEN);

    let restored = app
        .call(
            Method::PUT,
            &format!("/admin/users/{victim}/status"),
            Some(&admin),
            Some(json!({"status": "active"})),
        )
        .await;
    assert_eq!(restored.json()["status"], "active");
    assert!(restored.json()["ban_reason"].is_null());
    assert_eq!(
        app.get("/users/me", Some(&victim_token)).await.status,
        StatusCode::OK
    );

    let searched = app
        .get(
            "/admin/moderation-logs/search?action=unban_user&target_type=user",
            Some(&admin),
        )
        .await
        .json();
    assert_eq!(searched.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn admins_cannot_be_banned_or_deleted() {
    let app = TestApp::spawn().await;
    let (_, admin) = app.admin("root").await;
    let (other_admin, _) = app.admin("root2").await;

    let ban = app
        .call(
            Method::PUT,
            &format!("/admin/users/{other_admin}/ban"),
            Some(&admin),
            Some(json!({})),
        )
        .await;
    assert_eq!(ban.status, StatusCode::BAD_REQUEST);
    let delete = app
        .call(
            Method::DELETE,
            &format!("/admin/users/{other_admin}"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(delete.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        app.call(Method::DELETE, "/admin/users/9999", Some(&admin), None)
            .await
            .status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn hidden_artworks_drop_out_of_discovery() {
    let app = TestApp::spawn().await;
    let (_, admin) = app.admin("root").await;
    let (artist_id, artist) = app.user("painter", "artist").await;
    let artwork = app.artwork(artist_id, 10.0, 10.0).await;
    let moderate = format!("/admin/artworks/{artwork}/moderate");
    let nearby = "/artworks/nearby?latitude=10&longitude=10";

    let invalid = app
        .call(Method::PUT, &moderate, Some(&admin), Some(json!({"action": "burn"})))
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    assert_eq!(invalid.json()["detail"], "Invalid action");

    let hidden = app
        .call(
            Method::PUT,
            &moderate,
            Some(&admin),
            Some(json!({"action": "hide", "reason": "copyright"})),
        )
        .await;
    assert_eq!(hidden.status, StatusCode::OK);
    assert_eq!(hidden.json()["artwork"]["status"], "hidden");
    assert!(app.get(nearby, None).await.json().as_array().unwrap().is_empty());

    // Owners still see their hidden work; others do not.
    let (_, stranger) = app.user("walker", "user").await;
    let uri = format!("/artworks/{artwork}");
    assert_eq!(app.get(&uri, Some(&artist)).await.status, StatusCode::OK);
    assert_eq!(app.get(&uri, Some(&stranger)).await.status, StatusCode::NOT_FOUND);

    let featured = app
        .call(
            Method::PUT,
            &format!("/admin/artworks/{artwork}/feature"),
            Some(&admin),
            Some(json!({"featured": true})),
        )
        .await;
    assert_eq!(featured.json()["is_featured"], true);

    app.call(Method::PUT, &moderate, Some(&admin), Some(json!({"action": "restore"})))
        .await;
    assert_eq!(app.get(nearby, None).await.json().as_array().unwrap().len(), 1);
    assert_eq!(
        app.get("/artworks/featured", None).await.json()[0]["id"],
        artwork
    );

    let deleted = app
        .call(Method::PUT, &moderate, Some(&admin), Some(json!({"action": "delete"})))
        .await;
    assert_eq!(deleted.json()["message"], "Artwork deleted");
    assert_eq!(app.count("SELECT COUNT(*) FROM artworks").await, 0);
    assert_eq!(app.count("SELECT COUNT(*) FROM moderation_logs").await, 4);
}

#[tokio::test]
async fn comments_can_be_hidden() {
    let app = TestApp::spawn().await;
    let (_, admin) = app.admin("root").await;
    let (artist, _) = app.user("painter", "artist").await;
    let (_, token) = app.user("walker", "user").await;
    let artwork = app.artwork(artist, 1.0, 1.0).await;
    let comments = format!("/artworks/{artwork}/comments");
    let comment = app
        .call(Method::POST, &comments, Some(&token), Some(json!({"text": "rude"})))
        .await
        .json()["id"]
        .as_i64()
        .unwrap();

    let hidden = app
        .call(
            Method::PUT,
            &format!("/admin/comments/{comment}/moderate"),
            Some(&admin),
            Some(json!({"action": "hide", "reason": "abuse"})),
        )
        .await;
    assert_eq!(hidden.json()["comment"]["status"], "hidden");
    assert!(app.get(&comments, None).await.json().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn csv_export_is_filtered_and_sorted() {
    let app = TestApp::spawn().await;
    let (_, admin) = app.admin("root").await;
    app.user("alice", "artist").await;
    app.user("bob", "user").await;

    let reply = app
        .get(
            "/admin/users/export?search=ALI&sort_by=username&sort_order=asc",
            Some(&admin),
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.headers["content-type"], "text/csv; charset=utf-8");
    let disposition = reply.headers["content-disposition"].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"users_export_"));
    assert!(disposition.ends_with(".csv\""));

    let body = reply.text();
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(
        lines[0],
        "ID,Username,Email,Role,Status,Artworks Count,Created At,Updated At"
    );
    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains(",alice,alice@example.org,artist,active,0,"));

    let bad_sort = app
        .get("/admin/users/export?sort_by=password", Some(&admin))
        .await;
    assert_eq!(bad_sort.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stats_count_everything() {
    let app = TestApp::spawn().await;
    let (_, admin) = app.admin("root").await;
    let (artist, _) = app.user("painter", "artist").await;
    let (_, token) = app.user("walker", "user").await;
    let artwork = app.artwork(artist, 1.0, 1.0).await;
    app.call(Method::POST, &format!("/artworks/{artwork}/like"), Some(&token), None)
        .await;

    let stats = app.get("/admin/stats", Some(&admin)).await.json();
    assert_eq!(stats["total_users"], 3);
    assert_eq!(stats["total_artists"], 1);
    assert_eq!(stats["total_artworks"], 1);
    assert_eq!(stats["total_likes"], 1);
    assert_eq!(stats["total_comments"], 0);

    let detailed = app.get("/admin/stats/detailed", Some(&admin)).await.json();
    assert_eq!(detailed["users"]["active"], 3);
    assert_eq!(detailed["users"]["banned"], 0);
    assert_eq!(detailed["engagement"]["total_discoveries"], 0);
}

#[tokio::test]
async fn categories_are_admin_managed_and_unique() {
    let app = TestApp::spawn().await;
    let (_, admin) = app.admin("root").await;
    let (_, artist) = app.user("painter", "artist").await;
    let body = json!({"name": "Mosaic", "description": "Tiles"});

    let forbidden = app
        .call(Method::POST, "/categories", Some(&artist), Some(body.clone()))
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let created = app
        .call(Method::POST, "/categories", Some(&admin), Some(body.clone()))
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.json()["id"].as_i64().unwrap();

    let duplicate = app
        .call(Method::POST, "/categories", Some(&admin), Some(body))
        .await;
    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);
    assert_eq!(duplicate.json()["detail"], "Category already exists");

    let names: Vec<String> = app
        .get("/artworks/categories", None)
        .await
        .json()
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_owned())
        .collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
    assert!(names.contains(&"Mosaic".to_owned()));

    assert_eq!(
        app.call(Method::DELETE, &format!("/categories/{id}"), Some(&admin), None)
            .await
            .status,
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        app.get(&format!("/categories/{id}/artworks"), None).await.status,
        StatusCode::NOT_FOUND
    );
}

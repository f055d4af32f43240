mod common;

use axum::http::{Method, StatusCode};
use common::{png, Part, TestApp};
use serde_json::json;

#[tokio::test]
async fn artists_upload_artworks_with_images() {
    let app = TestApp::spawn().await;
    let (_, token) = app.user("painter", "artist").await;
    let categories = app.get("/categories", None).await.json();
    let mural = categories
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "Mural")
        .map(|c| c["id"].as_i64().unwrap())
        .unwrap();

    let reply = app
        .multipart(
            Method::POST,
            "/artworks",
            &token,
            vec![
                Part::Text("title", "Blue wall"),
                Part::Text("description", "A wall, but blue"),
                Part::Text("latitude", "48.8584"),
                Part::Text("longitude", "2.2945"),
                Part::Text("category_id", &mural.to_string()),
                Part::File("image", "wall.png", "image/png", png(16, 16)),
            ],
        )
        .await;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.text());
    let artwork = reply.json();
    assert_eq!(artwork["title"], "Blue wall");
    assert_eq!(artwork["categories"], json!(["Mural"]));
    let image_url = artwork["image_url"].as_str().unwrap().to_owned();
    assert!(image_url.starts_with("/uploads/") && image_url.ends_with(".png"));

    let served = app.get(&image_url, None).await;
    assert_eq!(served.status, StatusCode::OK);
    assert_eq!(served.headers["content-type"], "image/png");
}

#[tokio::test]
async fn uploads_are_validated() {
    let app = TestApp::spawn().await;
    let (_, artist) = app.user("painter", "artist").await;
    let (_, user) = app.user("walker", "user").await;
    let fields = |image: Part<'static>| {
        vec![
            Part::Text("title", "Wall"),
            Part::Text("latitude", "1.0"),
            Part::Text("longitude", "2.0"),
            image,
        ]
    };

    let not_artist = app
        .multipart(
            Method::POST,
            "/artworks",
            &user,
            fields(Part::File("image", "a.png", "image/png", png(4, 4))),
        )
        .await;
    assert_eq!(not_artist.status, StatusCode::FORBIDDEN);

    let wrong_type = app
        .multipart(
            Method::POST,
            "/artworks",
            &artist,
            fields(Part::File("image", "a.gif", "image/gif", b"GIF89a".to_vec())),
        )
        .await;
    assert_eq!(wrong_type.status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_type.json()["detail"], "Invalid image type");

    let garbage = app
        .multipart(
            Method::POST,
            "/artworks",
            &artist,
            fields(Part::File("image", "a.png", "image/png", b"not a png".to_vec())),
        )
        .await;
    assert_eq!(garbage.status, StatusCode::BAD_REQUEST);

    let missing_category = app
        .multipart(
            Method::POST,
            "/artworks",
            &artist,
            vec![
                Part::Text("title", "Wall"),
                Part::Text("latitude", "1.0"),
                Part::Text("longitude", "2.0"),
                Part::Text("category_id", "9999"),
                Part::File("image", "a.png", "image/png", png(4, 4)),
            ],
        )
        .await;
    assert_eq!(missing_category.status, StatusCode::NOT_FOUND);
    assert_eq!(app.count("SELECT COUNT(*) FROM artworks").await, 0);
}

#[tokio::test]
async fn only_owners_edit_and_delete() {
    let app = TestApp::spawn().await;
    let (owner_id, owner) = app.user("painter", "artist").await;
    let (_, other) = app.user("rival", "artist").await;
    let artwork = app.artwork(owner_id, 1.0, 1.0).await;
    let uri = format!("/artworks/{artwork}");

    let hijack = app
        .multipart(Method::PUT, &uri, &other, vec![Part::Text("title", "Mine now")])
        .await;
    assert_eq!(hijack.status, StatusCode::FORBIDDEN);

    let renamed = app
        .multipart(Method::PUT, &uri, &owner, vec![Part::Text("title", "Renamed")])
        .await;
    assert_eq!(renamed.json()["title"], "Renamed");

    let linked = app
        .call(
            Method::POST,
            &format!("{uri}/categories"),
            Some(&owner),
            Some(json!([1, 2, 2, 9999])),
        )
        .await;
    assert_eq!(linked.status, StatusCode::OK);
    assert_eq!(linked.json()["categories"].as_array().unwrap().len(), 2);

    assert_eq!(
        app.call(Method::DELETE, &uri, Some(&other), None).await.status,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        app.call(Method::DELETE, &uri, Some(&owner), None).await.status,
        StatusCode::NO_CONTENT
    );
    assert_eq!(app.get(&uri, Some(&owner)).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn likes_and_comments() {
    let app = TestApp::spawn().await;
    let (artist, _) = app.user("painter", "artist").await;
    let (_, token) = app.user("walker", "user").await;
    let artwork = app.artwork(artist, 1.0, 1.0).await;
    let like = format!("/artworks/{artwork}/like");

    let first = app.call(Method::POST, &like, Some(&token), None).await;
    assert_eq!(first.json()["message"], "Artwork liked successfully");
    let again = app.call(Method::POST, &like, Some(&token), None).await;
    assert_eq!(again.json()["message"], "Already liked");
    assert_eq!(app.count("SELECT COUNT(*) FROM likes").await, 1);

    let liked = app.get("/likes", Some(&token)).await.json();
    assert_eq!(liked[0]["id"], artwork);

    let unliked = app.call(Method::DELETE, &like, Some(&token), None).await;
    assert_eq!(unliked.json()["message"], "Artwork unliked");
    let missing = app.call(Method::DELETE, &like, Some(&token), None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.json()["detail"], "Like not found");

    let comments = format!("/artworks/{artwork}/comments");
    let empty = app
        .call(Method::POST, &comments, Some(&token), Some(json!({"text": "   "})))
        .await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
    for text in ["first!", "lovely colours"] {
        let posted = app
            .call(Method::POST, &comments, Some(&token), Some(json!({ "text": text })))
            .await;
        assert_eq!(posted.status, StatusCode::CREATED);
    }
    let listed = app.get(&comments, None).await.json();
    assert_eq!(listed[0]["text"], "first!");
    assert_eq!(listed[1]["text"], "lovely colours");
    assert_eq!(listed[0]["username"], "walker");
}

#[tokio::test]
async fn profiles_are_editable_and_public() {
    let app = TestApp::spawn().await;
    let (artist, token) = app.user("painter", "artist").await;
    app.artwork(artist, 1.0, 1.0).await;

    let updated = app
        .multipart(
            Method::PUT,
            "/profiles/me",
            &token,
            vec![
                Part::Text("bio", "Walls are canvases"),
                Part::Text("social_links", r#"{"instagram": "@painter"}"#),
                Part::File("profile_picture", "me.png", "image/png", png(8, 8)),
            ],
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK, "{}", updated.text());
    assert_eq!(updated.json()["social_links"]["instagram"], "@painter");
    assert!(updated.json()["profile_picture"].as_str().is_some());

    let bad_links = app
        .multipart(
            Method::PUT,
            "/profiles/me",
            &token,
            vec![Part::Text("social_links", "[1, 2]")],
        )
        .await;
    assert_eq!(bad_links.status, StatusCode::BAD_REQUEST);

    let public = app.get("/profiles/painter", None).await.json();
    assert_eq!(public["bio"], "Walls are canvases");
    let works = app.get("/profiles/painter/artworks", None).await.json();
    assert_eq!(works.as_array().unwrap().len(), 1);
    assert_eq!(
        app.get("/profiles/nobody", None).await.status,
        StatusCode::NOT_FOUND
    );
    // Profile routes are keyed by username, never by numeric id.
    for path in [format!("/profiles/{artist}/artworks"), "/profiles/nobody/artworks".into()] {
        assert_eq!(app.get(&path, None).await.status, StatusCode::NOT_FOUND, "{path}");
    }
}

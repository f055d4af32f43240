//! Shared harness: the full router over a fresh in-memory database.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Cursor;
use std::path::PathBuf;

use auth_adapters::Argon2Hasher;
use axum::body::{to_bytes, Body};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use bytes::Bytes;
use configs::Settings;
use domains::ports::{ArtworkRepository, PasswordHasher, UserRepository};
use domains::{NewArtwork, NewUser, Role};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use storage_adapters::{
    connect_in_memory, migrate, SqliteArtworkRepository, SqliteUserRepository,
};
use tower::ServiceExt;
use uuid::Uuid;

pub const PASSWORD: &str = "correct-horse-battery";
const BOUNDARY: &str = "artevia-test-boundary";

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Reply {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// One part of a multipart body: a text field or a file.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a str, Vec<u8>),
}

pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    upload_dir: PathBuf,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(&[]).await
    }

    pub async fn spawn_with(overrides: &[(&str, &str)]) -> Self {
        let pool = connect_in_memory().await.unwrap();
        migrate(&pool).await.unwrap();

        let upload_dir = std::env::temp_dir().join(format!("artevia-it-{}", Uuid::new_v4()));
        let mut vars: HashMap<String, String> = HashMap::from([
            ("ARTEVIA__AUTH__JWT_SECRET".into(), "integration-secret".into()),
            (
                "ARTEVIA__MEDIA__UPLOAD_DIR".into(),
                upload_dir.display().to_string(),
            ),
        ]);
        for (key, value) in overrides {
            vars.insert(key.to_string(), value.to_string());
        }
        let settings = Settings::from_vars(vars).unwrap();
        let router = artevia::app(pool.clone(), &settings).await.unwrap();
        Self {
            router,
            pool,
            upload_dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Reply {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        Reply {
            status,
            headers,
            body,
        }
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Reply {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => request
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        };
        self.send(request.unwrap()).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Reply {
        self.call(Method::GET, uri, token, None).await
    }

    pub async fn multipart(
        &self,
        method: Method,
        uri: &str,
        token: &str,
        parts: Vec<Part<'_>>,
    ) -> Reply {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                            .as_bytes(),
                    );
                }
                Part::File(name, file_name, content_type, data) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(&data);
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Registers through the API and returns the new user's id.
    pub async fn register(&self, username: &str, role: &str) -> i64 {
        let reply = self
            .call(
                Method::POST,
                "/users",
                None,
                Some(json!({
                    "email": format!("{username}@example.org"),
                    "username": username,
                    "password": PASSWORD,
                    "role": role,
                })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.text());
        reply.json()["id"].as_i64().unwrap()
    }

    pub async fn login(&self, username: &str) -> String {
        self.form_login("/auth/token", username).await
    }

    async fn form_login(&self, path: &str, username: &str) -> String {
        let reply = self.login_reply(path, &format!("{username}@example.org"), PASSWORD).await;
        assert_eq!(reply.status, StatusCode::OK, "{}", reply.text());
        reply.json()["access_token"].as_str().unwrap().to_owned()
    }

    pub async fn login_reply(&self, path: &str, email: &str, password: &str) -> Reply {
        let request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("username={email}&password={password}")))
            .unwrap();
        self.send(request).await
    }

    /// Registers and logs in; returns `(id, token)`.
    pub async fn user(&self, username: &str, role: &str) -> (i64, String) {
        let id = self.register(username, role).await;
        (id, self.login(username).await)
    }

    /// Admins cannot self-register, so this one is written straight to the
    /// store and then logs in through the admin endpoint.
    pub async fn admin(&self, username: &str) -> (i64, String) {
        let user = SqliteUserRepository::new(self.pool.clone())
            .create(NewUser {
                email: format!("{username}@example.org"),
                username: username.to_owned(),
                password_hash: Argon2Hasher::new().hash(PASSWORD).unwrap(),
                role: Role::Admin,
            })
            .await
            .unwrap();
        (user.id, self.form_login("/auth/admin/login", username).await)
    }

    /// An active artwork inserted directly, bypassing image processing.
    pub async fn artwork(&self, artist_id: i64, latitude: f64, longitude: f64) -> i64 {
        SqliteArtworkRepository::new(self.pool.clone())
            .create(NewArtwork {
                title: format!("Mural at {latitude},{longitude}"),
                description: String::new(),
                image_url: "/uploads/placeholder.png".into(),
                latitude,
                longitude,
                artist_id,
                category_ids: Vec::new(),
            })
            .await
            .unwrap()
            .id
    }

    pub async fn count(&self, sql: &str) -> i64 {
        sqlx::query_scalar(sql).fetch_one(&self.pool).await.unwrap()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.upload_dir).ok();
    }
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([30, 90, 160])));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

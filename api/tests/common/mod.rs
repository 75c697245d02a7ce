//! Shared helpers for driving the router in-process.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use clap::Parser;
use eventhub_api::{config::EventhubApiConfig, server};
use eventhub_db::storage::memory::MemoryStorage;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "eventhub-test-boundary";

pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n0000IHDR";

pub struct TestApp {
    pub router: Router,
    pub uploads: TempDir,
}

pub fn app() -> TestApp {
    app_with(&[])
}

/// Like [`app`], with extra command-line flags appended to the config.
pub fn app_with(extra: &[&str]) -> TestApp {
    let uploads = tempfile::tempdir().unwrap();
    let upload_dir = uploads.path().to_str().unwrap().to_string();

    let args = [
        "eventhub-api",
        "--jwt-secret",
        "integration-test-secret",
        "--bcrypt-cost",
        "4",
        "--upload-dir",
        &upload_dir,
    ];
    let cfg = EventhubApiConfig::parse_from(args.iter().copied().chain(extra.iter().copied()));

    let (router, _api) = server::make_with_storage(cfg, Arc::new(MemoryStorage::new())).unwrap();
    TestApp { router, uploads }
}

pub struct Upload<'a> {
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub bytes: &'a [u8],
}

impl TestApp {
    /// Send `request` and decode the response body as JSON when it is JSON,
    /// otherwise as a string.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let is_json = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if is_json {
            serde_json::from_slice(&bytes).unwrap()
        } else {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        };

        (status, body)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request(Method::GET, uri, token, Body::empty(), None))
            .await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(request(Method::DELETE, uri, None, Body::empty(), None))
            .await
    }

    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        self.send(request(
            method,
            uri,
            token,
            Body::from(body.to_string()),
            Some("application/json".to_string()),
        ))
        .await
    }

    pub async fn multipart(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        fields: &[(&str, &str)],
        upload: Option<Upload<'_>>,
    ) -> (StatusCode, Value) {
        self.send(request(
            method,
            uri,
            token,
            Body::from(multipart_body(fields, upload)),
            Some(format!("multipart/form-data; boundary={BOUNDARY}")),
        ))
        .await
    }

    /// Register a user and return the `user` object from the response.
    pub async fn register(&self, name: &str, email: &str, password: &str, role: &str) -> Value {
        let (status, body) = self
            .multipart(
                Method::POST,
                "/users/register",
                None,
                &[
                    ("name", name),
                    ("email", email),
                    ("password", password),
                    ("role", role),
                ],
                None,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["user"].clone()
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .json(
                Method::POST,
                "/users/login",
                None,
                json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    /// Register and log in, returning `(user, token)`.
    pub async fn signed_up(&self, name: &str, email: &str, role: &str) -> (Value, String) {
        let user = self.register(name, email, "correct horse", role).await;
        let token = self.login(email, "correct horse").await;
        (user, token)
    }

    pub async fn create_event(&self, token: &str, title: &str) -> Value {
        let (status, body) = self
            .multipart(
                Method::POST,
                "/event/create",
                Some(token),
                &[
                    ("title", title),
                    ("date", "2025-09-01T18:00:00Z"),
                    ("location", "Amsterdam"),
                ],
                None,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["event"].clone()
    }

    pub async fn join(&self, token: &str, event_id: &str) -> (StatusCode, Value) {
        self.json(
            Method::POST,
            "/event/joinEvent",
            Some(token),
            json!({ "eventId": event_id }),
        )
        .await
    }

    /// Files currently stored under one upload namespace.
    pub fn stored_files(&self, namespace: &str) -> usize {
        std::fs::read_dir(self.uploads.path().join(namespace))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

fn request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Body,
    content_type: Option<String>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    builder.body(body).unwrap()
}

fn multipart_body(fields: &[(&str, &str)], upload: Option<Upload<'_>>) -> Vec<u8> {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some(upload) = upload {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                upload.file_name, upload.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(upload.bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

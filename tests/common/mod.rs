//! Shared helpers for driving the router in-process

#![allow(dead_code)]

use std::sync::Arc;

use bytes::Bytes;
use clap::Parser;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request, StatusCode};
use preplens_admin::config::Args;
use preplens_admin::server::{handle_request, AppState};

pub const SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const ADMIN: &str = "admin@preplens.com";
pub const BOUNDARY: &str = "preplens-test-boundary";

pub fn state_with(extra: &[&str]) -> Arc<AppState> {
    let mut argv = vec!["preplens-admin", "--memory-store", "--jwt-secret", SECRET];
    argv.extend_from_slice(extra);
    let args = Args::try_parse_from(argv).expect("args parse");
    Arc::new(AppState::in_memory(args).expect("state"))
}

pub fn state() -> Arc<AppState> {
    state_with(&[])
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: hyper::HeaderMap,
    pub body: Bytes,
}

impl Reply {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("json body")
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.to_vec()).expect("utf-8 body")
    }
}

pub async fn send(state: &Arc<AppState>, req: Request<Full<Bytes>>) -> Reply {
    let response = handle_request(Arc::clone(state), req).await.expect("response");
    let status = response.status();
    let headers = response.headers().clone();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    Reply {
        status,
        headers,
        body,
    }
}

pub async fn login(state: &Arc<AppState>) -> String {
    let reply = send(
        state,
        request(Method::POST, "/auth/login", None)
            .header("content-type", "application/json")
            .body(Full::new(Bytes::from(
                serde_json::json!({ "email": ADMIN, "password": "anything" }).to_string(),
            )))
            .unwrap(),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    reply.json()["token"].as_str().unwrap().to_string()
}

pub fn request(method: Method, uri: &str, token: Option<&str>) -> hyper::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header("authorization", format!("Bearer {}", token)),
        None => builder,
    }
}

pub fn json_request(method: Method, uri: &str, token: &str, body: serde_json::Value) -> Request<Full<Bytes>> {
    request(method, uri, Some(token))
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

pub fn empty_request(method: Method, uri: &str, token: Option<&str>) -> Request<Full<Bytes>> {
    request(method, uri, token).body(Full::new(Bytes::new())).unwrap()
}

/// Multipart body with one file part plus text fields
pub fn multipart_body(
    file_field: &str,
    file_name: &str,
    content_type: &str,
    file: &[u8],
    fields: &[(&str, &str)],
) -> Bytes {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{file_field}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(file);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    Bytes::from(body)
}

pub fn multipart_request(uri: &str, token: &str, body: Bytes) -> Request<Full<Bytes>> {
    request(Method::POST, uri, Some(token))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Full::new(body))
        .unwrap()
}

//! Response builders and request helpers shared by every route

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::header::{self, HeaderMap, HeaderValue};
use hyper::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::auth::{extract_token_from_header, Claims};
use crate::server::{AppState, BoxBody};
use crate::types::{AdminError, Result};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Header carrying the wipe confirmation phrase
pub const CONFIRM_WIPE_HEADER: &str = "x-confirm-wipe";

pub fn full_body(data: impl Into<Bytes>) -> BoxBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

pub fn empty_body() -> BoxBody {
    Full::new(Bytes::new())
        .map_err(|never| match never {})
        .boxed()
}

fn with_cors(mut response: Response<BoxBody>) -> Response<BoxBody> {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, DELETE, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization, X-Confirm-Wipe"),
    );
    response
}

/// Response with CORS headers and an optional content type
pub fn respond(status: StatusCode, content_type: Option<&'static str>, body: BoxBody) -> Response<BoxBody> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    if let Some(content_type) = content_type {
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
    with_cors(response)
}

pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<BoxBody> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());
    respond(status, Some("application/json"), full_body(json))
}

pub fn no_content() -> Response<BoxBody> {
    respond(StatusCode::NO_CONTENT, None, empty_body())
}

pub fn preflight_response() -> Response<BoxBody> {
    let mut response = respond(StatusCode::NO_CONTENT, None, empty_body());
    response.headers_mut().insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static("86400"),
    );
    response
}

/// `{error, details?}` with the variant's status code
pub fn error_response(err: &AdminError) -> Response<BoxBody> {
    let status = err.status_code();
    if status.is_server_error() {
        error!(status = status.as_u16(), "{}", err);
    } else {
        debug!(status = status.as_u16(), "{}", err);
    }

    let mut body = serde_json::json!({ "error": err.summary() });
    if let Some(details) = err.details() {
        body["details"] = serde_json::Value::String(details.to_string());
    }
    json_response(status, &body)
}

/// Read the whole body, rejecting anything over `limit` bytes
pub async fn read_body<B>(body: B, limit: usize) -> Result<Bytes>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => Err(
            AdminError::PayloadTooLarge(format!("Request body exceeds {} bytes", limit)),
        ),
        Err(e) => Err(AdminError::BadRequest(format!("Failed to read body: {}", e))),
    }
}

pub fn parse_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| AdminError::BadRequest(format!("Invalid JSON: {}", e)))
}

/// Like [`parse_json`], but an empty body yields `T::default()`
pub fn parse_optional_json<T: DeserializeOwned + Default>(bytes: &[u8]) -> Result<T> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    parse_json(bytes)
}

/// Bearer-token guard.
///
/// In dev mode a missing or invalid token is accepted and the configured
/// admin identity is used instead.
pub fn require_auth(state: &AppState, headers: &HeaderMap) -> Result<Claims> {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let verified = extract_token_from_header(header).map(|token| state.jwt.verify_token(token));

    match verified {
        Some(result) if result.valid => result
            .claims
            .ok_or_else(|| AdminError::Unauthorized("Invalid token".into())),
        _ if state.args.dev_mode => Ok(Claims {
            id: "devadmin".into(),
            email: state.args.admin_email.clone(),
            role: "admin".into(),
            iat: 0,
            exp: 0,
        }),
        None => Err(AdminError::Unauthorized("Unauthorized".into())),
        Some(result) => {
            warn!(reason = ?result.error, "Rejected bearer token");
            Err(AdminError::Unauthorized("Invalid token".into()))
        }
    }
}

/// A file part from a multipart form
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// A decoded multipart form: at most one file plus text fields
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub file: Option<UploadedFile>,
    pub fields: Vec<(String, String)>,
}

/// Read a `multipart/form-data` body, keeping the part named `file_field`
/// as the file. A request that is not multipart yields an empty form.
pub async fn read_multipart<B>(
    headers: &HeaderMap,
    body: B,
    limit: usize,
    file_field: &str,
) -> Result<MultipartForm>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let boundary = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok());

    let Some(boundary) = boundary else {
        return Ok(MultipartForm::default());
    };

    let bytes = read_body(body, limit).await?;
    let stream = futures_util::stream::once(futures_util::future::ready(Ok::<_, std::io::Error>(bytes)));
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut form = MultipartForm::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == file_field && form.file.is_none() {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(|m| m.to_string());
            let bytes = field.bytes().await?;
            form.file = Some(UploadedFile {
                file_name,
                content_type,
                bytes,
            });
        } else if field.file_name().is_some() {
            debug!(field = %name, "Ignoring extra file part");
        } else {
            let value = field.text().await?;
            form.fields.push((name, value));
        }
    }

    Ok(form)
}

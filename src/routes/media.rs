//! Image upload and the bulk-import template
//!
//! - POST /upload-image - multipart `image`; responds `{url}`
//! - GET /template - CSV template download

use bytes::Bytes;
use hyper::body::Body;
use hyper::header::{self, HeaderValue};
use hyper::{Request, Response, StatusCode};
use serde::Serialize;
use tracing::info;

use super::common::{full_body, json_response, read_multipart, require_auth, respond, BoxError};
use crate::media::upload_image;
use crate::server::{AppState, BoxBody};
use crate::types::{AdminError, Result};

/// Header and one example row, in column order the importer expects
pub const BULK_UPLOAD_TEMPLATE: &str = include_str!("../../assets/bulk_upload_template.csv");

#[derive(Debug, Serialize)]
pub struct UploadImageResponse {
    pub url: String,
}

/// Handle POST /upload-image
pub async fn handle_upload_image<B>(state: &AppState, req: Request<B>) -> Result<Response<BoxBody>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    require_auth(state, req.headers())?;

    let (parts, body) = req.into_parts();
    let form = read_multipart(&parts.headers, body, state.args.max_body_bytes, "image").await?;
    let file = form
        .file
        .ok_or_else(|| AdminError::BadRequest("No file uploaded".into()))?;

    let file_name = file.file_name.unwrap_or_default();
    info!(file = %file_name, size = file.bytes.len(), "Image upload attempted");

    let url = upload_image(
        state.images.as_ref(),
        &file_name,
        file.bytes.to_vec(),
        file.content_type.as_deref(),
    )
    .await;

    Ok(json_response(StatusCode::OK, &UploadImageResponse { url }))
}

/// Handle GET /template
pub fn template_download() -> Response<BoxBody> {
    let mut response = respond(
        StatusCode::OK,
        Some("text/csv; charset=utf-8"),
        full_body(BULK_UPLOAD_TEMPLATE),
    );
    response.headers_mut().insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment; filename=\"bulk_upload_template.csv\""),
    );
    response
}

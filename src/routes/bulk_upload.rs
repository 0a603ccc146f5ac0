//! POST /bulk-upload
//!
//! Multipart form: `file` (spreadsheet) plus optional batch fields
//! `marks`, `timeLimit`, `blooms`, `type`, `subject`, `exam`, `difficulty`,
//! `language` and `tags`.

use bytes::Bytes;
use hyper::body::Body;
use hyper::{Request, Response, StatusCode};
use tracing::{debug, info};

use super::common::{json_response, read_multipart, require_auth, BoxError};
use crate::import::import_questions;
use crate::questions::BatchOverrides;
use crate::server::{AppState, BoxBody};
use crate::types::{AdminError, Result};

pub async fn handle_bulk_upload<B>(state: &AppState, req: Request<B>) -> Result<Response<BoxBody>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    require_auth(state, req.headers())?;

    let (parts, body) = req.into_parts();
    let form = read_multipart(&parts.headers, body, state.args.max_body_bytes, "file").await?;

    let mut batch = BatchOverrides::default();
    for (name, value) in form.fields {
        if !batch.set_field(&name, value) {
            debug!(field = %name, "Ignoring unknown upload field");
        }
    }

    let file = form
        .file
        .ok_or_else(|| AdminError::BadRequest("No file uploaded".into()))?;

    info!(
        file = file.file_name.as_deref().unwrap_or("<unnamed>"),
        size = file.bytes.len(),
        "Bulk upload received"
    );

    let report = import_questions(
        state.questions.as_ref(),
        &file.bytes,
        &batch,
        state.args.max_upload_rows,
    )
    .await?;

    Ok(json_response(StatusCode::OK, &report))
}

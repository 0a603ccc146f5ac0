//! GET /statistics

use hyper::{Request, Response, StatusCode};

use super::common::{json_response, require_auth};
use crate::server::{AppState, BoxBody};
use crate::types::Result;

pub async fn get_statistics<B>(state: &AppState, req: Request<B>) -> Result<Response<BoxBody>> {
    require_auth(state, req.headers())?;

    let stats = state.questions.statistics().await?;
    Ok(json_response(StatusCode::OK, &stats))
}

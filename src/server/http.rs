//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo, one task per connection. Requests are
//! dispatched on `(method, path)`.

use bytes::Bytes;
use hyper::body::Body;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::auth::JwtValidator;
use crate::config::Args;
use crate::media::{DisabledImageStore, ImageStore};
use crate::routes::{self, common::BoxError};
use crate::store::{MemoryStore, QuestionStore, UserStore};
use crate::types::{AdminError, Result};

pub type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub questions: Arc<dyn QuestionStore>,
    pub users: Arc<dyn UserStore>,
    pub images: Arc<dyn ImageStore>,
    pub jwt: JwtValidator,
    /// `mongodb` or `memory`, reported by /health
    pub store_kind: &'static str,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        args: Args,
        questions: Arc<dyn QuestionStore>,
        users: Arc<dyn UserStore>,
        images: Arc<dyn ImageStore>,
        store_kind: &'static str,
    ) -> Result<Self> {
        let jwt = match (&args.jwt_secret, args.dev_mode) {
            (Some(secret), _) => JwtValidator::new(secret.clone(), args.jwt_expiry_seconds)?,
            (None, true) => {
                warn!("JWT_SECRET not set, using the dev-mode secret");
                JwtValidator::new_dev(args.jwt_expiry_seconds)
            }
            (None, false) => {
                return Err(AdminError::Config(
                    "JWT_SECRET is required in production mode".into(),
                ))
            }
        };

        Ok(Self {
            args,
            questions,
            users,
            images,
            jwt,
            store_kind,
            started_at: Instant::now(),
        })
    }

    /// State backed by process memory and no image storage
    pub fn in_memory(args: Args) -> Result<Self> {
        let store = Arc::new(MemoryStore::new());
        Self::new(
            args,
            store.clone(),
            store,
            Arc::new(DisabledImageStore),
            "memory",
        )
    }
}

/// Run the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!("Preplens admin listening on {}", state.args.listen);

    if state.args.dev_mode {
        warn!("Development mode enabled - authentication disabled");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move {
                            debug!(%addr, "Connection request");
                            handle_request(state, req).await
                        }
                    });

                    if let Err(err) = http1::Builder::new()
                        .serve_connection(io, service)
                        .await
                    {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}

/// Route a single request.
///
/// Generic over the body so tests can drive it without a socket.
pub async fn handle_request<B>(
    state: Arc<AppState>,
    req: Request<B>,
) -> std::result::Result<Response<BoxBody>, hyper::Error>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("{} {}", method, path);

    if method == Method::OPTIONS {
        return Ok(routes::common::preflight_response());
    }

    let state = state.as_ref();
    let result = match (&method, path.as_str()) {
        (&Method::GET, "/health") => Ok(routes::health_check(state)),
        (&Method::GET, "/ready") => Ok(routes::readiness_check(state).await),
        (&Method::GET, "/version") => Ok(routes::version_info()),

        (&Method::POST, "/auth/login") => routes::handle_login(state, req).await,
        (&Method::POST, "/auth/register") => routes::handle_register(state, req).await,
        (&Method::GET, "/auth/me") => routes::handle_me(state, req),

        (&Method::GET, "/template") => Ok(routes::template_download()),
        (&Method::POST, "/upload-image") => routes::handle_upload_image(state, req).await,
        (&Method::POST, "/bulk-upload") => routes::handle_bulk_upload(state, req).await,

        (&Method::GET, "/questions") => routes::list_questions(state, req).await,
        (&Method::POST, "/questions") => routes::create_question(state, req).await,
        (&Method::DELETE, p) if p.starts_with("/questions/") => {
            let id = p["/questions/".len()..].to_string();
            routes::delete_question(state, req, &id).await
        }
        (&Method::DELETE, "/clear-database") => routes::clear_database(state, req).await,
        (&Method::DELETE, "/clear-questions") => routes::clear_questions(state, req).await,

        (&Method::GET, "/statistics") => routes::get_statistics(state, req).await,

        _ => Err(AdminError::NotFound(format!("No route for {} {}", method, path))),
    };

    Ok(result.unwrap_or_else(|e| routes::common::error_response(&e)))
}

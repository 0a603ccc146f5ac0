//! HTTP route handlers
//!
//! Each handler returns `Result<Response<BoxBody>>`; the server turns errors
//! into `{error, details}` responses.

pub mod auth_routes;
pub mod bulk_upload;
pub mod common;
pub mod health;
pub mod media;
pub mod questions;
pub mod statistics;

pub use auth_routes::{handle_login, handle_me, handle_register};
pub use bulk_upload::handle_bulk_upload;
pub use health::{health_check, readiness_check, version_info};
pub use media::{handle_upload_image, template_download};
pub use questions::{clear_database, clear_questions, create_question, delete_question, list_questions};
pub use statistics::get_statistics;

//! Preplens admin - question bank management service
//!
//! Staff create, bulk-import, browse and delete multiple-choice questions
//! for exam preparation.
//!
//! ## Services
//!
//! - **Import**: spreadsheet upload with per-row answer normalization
//! - **Questions**: create, list, delete and filtered delete
//! - **Statistics**: dashboard counts by subject, exam and difficulty
//! - **Media**: question images on S3
//! - **Auth**: admin session tokens (JWT) and argon2 user registration

pub mod auth;
pub mod config;
pub mod db;
pub mod import;
pub mod media;
pub mod questions;
pub mod routes;
pub mod server;
pub mod store;
pub mod types;

pub use config::Args;
pub use server::AppState;
pub use types::{AdminError, Result};

//! Database schemas
//!
//! MongoDB document structures for questions and users.

mod metadata;
mod question;
mod user;

pub use metadata::Metadata;
pub use question::{QuestionDoc, QUESTION_COLLECTION};
pub use user::{UserDoc, USER_COLLECTION};

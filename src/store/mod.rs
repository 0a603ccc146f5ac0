//! Question and user storage
//!
//! Handlers talk to storage only through [`QuestionStore`] and [`UserStore`].
//! Two backends implement both:
//! - [`MongoStore`] for production
//! - [`MemoryStore`] for dev mode without a database, and for tests

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use serde::{Deserialize, Serialize};

use crate::questions::{Question, Statistics};
use crate::types::Result;

/// Criteria for a filtered delete. Empty fields are ignored, so an empty
/// filter matches every question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    /// Matches questions carrying any of these tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl QuestionFilter {
    /// Drop blank criteria
    pub fn normalized(self) -> Self {
        let keep = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        Self {
            subject: keep(self.subject),
            exam: keep(self.exam),
            difficulty: keep(self.difficulty),
            tags: self
                .tags
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.subject.is_none() && self.exam.is_none() && self.difficulty.is_none() && self.tags.is_empty()
    }

    pub fn matches(&self, question: &Question) -> bool {
        let field = |want: &Option<String>, have: &Option<String>| match want {
            Some(want) => have.as_ref() == Some(want),
            None => true,
        };

        field(&self.subject, &question.subject)
            && field(&self.exam, &question.exam)
            && field(&self.difficulty, &question.difficulty)
            && (self.tags.is_empty() || question.tags.iter().any(|t| self.tags.contains(t)))
    }
}

/// A registered user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

/// Persistence for questions
#[async_trait::async_trait]
pub trait QuestionStore: Send + Sync {
    /// Persist one question, returning it with its assigned id
    async fn insert_one(&self, question: Question) -> Result<Question>;

    /// Persist a batch as a unit: either every question is stored or none is
    async fn insert_many(&self, questions: Vec<Question>) -> Result<Vec<Question>>;

    /// Every stored question in store order.
    ///
    /// The MongoDB backend skips documents that fail to decode (logged at
    /// error), so this can return fewer records than `statistics()` counts.
    async fn list_all(&self) -> Result<Vec<Question>>;

    /// Delete by id. Unknown and malformed ids report `false`.
    async fn delete_by_id(&self, id: &str) -> Result<bool>;

    /// Delete questions matching the filter, returning how many were removed
    async fn delete_matching(&self, filter: &QuestionFilter) -> Result<u64>;

    async fn delete_all(&self) -> Result<u64>;

    /// Dashboard metrics, computed fresh on every call
    async fn statistics(&self) -> Result<Statistics> {
        let questions = self.list_all().await?;
        Ok(Statistics::from_questions(&questions))
    }

    /// Readiness probe
    async fn ping(&self) -> Result<()>;
}

/// Persistence for registered users
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>>;

    /// Store a new user. Fails with `Conflict` if the email is taken.
    async fn insert_user(&self, user: UserRecord) -> Result<UserRecord>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questions::{normalize_submission, CreateQuestionRequest};

    fn tagged(subject: &str, tags: &[&str]) -> Question {
        let mut q = normalize_submission(CreateQuestionRequest {
            text: Some("Q".into()),
            subject: Some(subject.into()),
            ..Default::default()
        })
        .unwrap()
        .into_question();
        q.tags = tags.iter().map(|t| t.to_string()).collect();
        q
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = QuestionFilter {
            subject: Some(String::new()),
            tags: vec![String::new()],
            ..Default::default()
        }
        .normalized();
        assert!(filter.is_empty());
        assert!(filter.matches(&tagged("Algebra", &[])));
    }

    #[test]
    fn test_filter_fields_and_tags() {
        let filter = QuestionFilter {
            subject: Some("Algebra".into()),
            tags: vec!["ssc".into(), "upsc".into()],
            ..Default::default()
        };
        assert!(filter.matches(&tagged("Algebra", &["upsc"])));
        assert!(!filter.matches(&tagged("Algebra", &["bank"])));
        assert!(!filter.matches(&tagged("Physics", &["ssc"])));
    }
}

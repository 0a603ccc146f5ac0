//! In-process storage
//!
//! Used in dev mode when MongoDB is unavailable and by the test suite.
//! Ids are ObjectId hex strings, same as the MongoDB backend.

use bson::oid::ObjectId;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{QuestionFilter, QuestionStore, UserRecord, UserStore};
use crate::questions::Question;
use crate::types::{AdminError, Result};

#[derive(Default)]
pub struct MemoryStore {
    questions: RwLock<Vec<Question>>,
    users: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn assign_id(mut question: Question) -> Question {
        question.id = Some(ObjectId::new().to_hex());
        question
    }
}

#[async_trait::async_trait]
impl QuestionStore for MemoryStore {
    async fn insert_one(&self, question: Question) -> Result<Question> {
        let question = Self::assign_id(question);
        self.questions.write().await.push(question.clone());
        Ok(question)
    }

    async fn insert_many(&self, questions: Vec<Question>) -> Result<Vec<Question>> {
        let stored: Vec<Question> = questions.into_iter().map(Self::assign_id).collect();
        self.questions.write().await.extend(stored.iter().cloned());
        Ok(stored)
    }

    async fn list_all(&self) -> Result<Vec<Question>> {
        Ok(self.questions.read().await.clone())
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        let mut questions = self.questions.write().await;
        let before = questions.len();
        questions.retain(|q| q.id.as_deref() != Some(id));
        Ok(questions.len() < before)
    }

    async fn delete_matching(&self, filter: &QuestionFilter) -> Result<u64> {
        let mut questions = self.questions.write().await;
        let before = questions.len();
        questions.retain(|q| !filter.matches(q));
        Ok((before - questions.len()) as u64)
    }

    async fn delete_all(&self) -> Result<u64> {
        let mut questions = self.questions.write().await;
        let removed = questions.len() as u64;
        questions.clear();
        Ok(removed)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait::async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn insert_user(&self, mut user: UserRecord) -> Result<UserRecord> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.email) {
            return Err(AdminError::Conflict("User already exists".into()));
        }
        user.id = Some(ObjectId::new().to_hex());
        users.insert(user.email.clone(), user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questions::{normalize_submission, CreateQuestionRequest};

    fn question(subject: &str, solution: &str) -> Question {
        normalize_submission(CreateQuestionRequest {
            text: Some(format!("{subject} question")),
            subject: Some(subject.into()),
            solution: Some(solution.into()),
            ..Default::default()
        })
        .unwrap()
        .into_question()
    }

    #[tokio::test]
    async fn test_insert_assigns_ids_in_order() {
        let store = MemoryStore::new();
        let stored = store
            .insert_many(vec![question("Algebra", ""), question("Physics", "")])
            .await
            .unwrap();

        assert!(stored.iter().all(|q| q.id.is_some()));
        assert_ne!(stored[0].id, stored[1].id);

        let listed = store.list_all().await.unwrap();
        assert_eq!(listed, stored);
    }

    #[tokio::test]
    async fn test_delete_by_id_is_idempotent() {
        let store = MemoryStore::new();
        let q = store.insert_one(question("Algebra", "")).await.unwrap();
        let id = q.id.unwrap();

        assert!(store.delete_by_id(&id).await.unwrap());
        assert!(!store.delete_by_id(&id).await.unwrap());
        assert!(!store.delete_by_id("not-an-object-id").await.unwrap());
    }

    #[tokio::test]
    async fn test_filtered_and_full_delete() {
        let store = MemoryStore::new();
        store
            .insert_many(vec![
                question("Algebra", ""),
                question("Algebra", ""),
                question("Physics", ""),
            ])
            .await
            .unwrap();

        let filter = QuestionFilter {
            subject: Some("Algebra".into()),
            ..Default::default()
        };
        assert_eq!(store.delete_matching(&filter).await.unwrap(), 2);
        assert_eq!(store.list_all().await.unwrap().len(), 1);

        assert_eq!(store.delete_all().await.unwrap(), 1);
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[test]
    fn test_statistics_from_default_impl() {
        let store = MemoryStore::new();
        let stats = tokio_test::block_on(async {
            store
                .insert_many(vec![
                    question("Algebra", "because"),
                    question("Algebra", "since"),
                    question("Physics", ""),
                ])
                .await
                .unwrap();
            store.statistics().await.unwrap()
        });

        assert_eq!(stats.total_questions, 3);
        assert_eq!(stats.questions_with_solutions, 2);
        assert_eq!(stats.questions_without_solutions, 1);
        assert_eq!(stats.questions_by_subject[0].id.as_deref(), Some("Algebra"));
    }

    #[tokio::test]
    async fn test_duplicate_user_conflicts() {
        let store = MemoryStore::new();
        let user = UserRecord {
            id: None,
            email: "admin@preplens.com".into(),
            password_hash: "$argon2id$stub".into(),
            role: "admin".into(),
        };
        store.insert_user(user.clone()).await.unwrap();

        let err = store.insert_user(user).await.unwrap_err();
        assert!(matches!(err, AdminError::Conflict(_)));
        assert!(store
            .find_by_email("admin@preplens.com")
            .await
            .unwrap()
            .is_some());
    }
}

//! MongoDB-backed storage

use bson::{doc, oid::ObjectId, Bson, Document};
use tracing::debug;

use super::{QuestionFilter, QuestionStore, UserRecord, UserStore};
use crate::db::schemas::{QuestionDoc, UserDoc, QUESTION_COLLECTION, USER_COLLECTION};
use crate::db::{MongoClient, MongoCollection};
use crate::questions::statistics::sort_groups;
use crate::questions::{GroupCount, Question, Statistics};
use crate::types::{AdminError, Result};

#[derive(Clone)]
pub struct MongoStore {
    client: MongoClient,
    questions: MongoCollection<QuestionDoc>,
    users: MongoCollection<UserDoc>,
}

impl MongoStore {
    /// Open both collections, applying their indexes
    pub async fn new(client: MongoClient) -> Result<Self> {
        let questions = client.collection::<QuestionDoc>(QUESTION_COLLECTION).await?;
        let users = client.collection::<UserDoc>(USER_COLLECTION).await?;

        Ok(Self {
            client,
            questions,
            users,
        })
    }

    async fn group_count(&self, field: &str) -> Result<Vec<GroupCount>> {
        let pipeline = vec![
            doc! { "$group": { "_id": format!("${}", field), "count": { "$sum": 1 } } },
            doc! { "$sort": { "count": -1, "_id": 1 } },
        ];

        let mut groups: Vec<GroupCount> = self
            .questions
            .aggregate(pipeline)
            .await?
            .into_iter()
            .map(|d| GroupCount {
                id: match d.get("_id") {
                    None | Some(Bson::Null) => None,
                    Some(Bson::String(s)) => Some(s.clone()),
                    Some(other) => Some(other.to_string()),
                },
                count: match d.get("count") {
                    Some(Bson::Int32(n)) => *n as u64,
                    Some(Bson::Int64(n)) => *n as u64,
                    Some(Bson::Double(n)) => *n as u64,
                    _ => 0,
                },
            })
            .collect();

        // Server ordering of mixed key types differs from ours
        sort_groups(&mut groups);
        Ok(groups)
    }
}

/// Present and non-empty
fn non_empty(field: &str) -> Document {
    let mut query = Document::new();
    query.insert(field, doc! { "$exists": true, "$nin": ["", Bson::Null] });
    query
}

fn filter_document(filter: &QuestionFilter) -> Document {
    let mut query = Document::new();
    if let Some(subject) = &filter.subject {
        query.insert("subject", subject.as_str());
    }
    if let Some(exam) = &filter.exam {
        query.insert("exam", exam.as_str());
    }
    if let Some(difficulty) = &filter.difficulty {
        query.insert("difficulty", difficulty.as_str());
    }
    if !filter.tags.is_empty() {
        query.insert("tags", doc! { "$in": filter.tags.clone() });
    }
    query
}

#[async_trait::async_trait]
impl QuestionStore for MongoStore {
    async fn insert_one(&self, question: Question) -> Result<Question> {
        let id = self
            .questions
            .insert_one(QuestionDoc::from_question(&question))
            .await?;
        Ok(Question {
            id: Some(id.to_hex()),
            ..question
        })
    }

    async fn insert_many(&self, questions: Vec<Question>) -> Result<Vec<Question>> {
        let docs = questions.iter().map(QuestionDoc::from_question).collect();
        let ids = self.questions.insert_many(docs).await?;

        Ok(questions
            .into_iter()
            .zip(ids)
            .map(|(question, id)| Question {
                id: Some(id.to_hex()),
                ..question
            })
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Question>> {
        let docs = self.questions.find_many(doc! {}).await?;
        Ok(docs.into_iter().map(QuestionDoc::into_question).collect())
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            debug!(id, "Ignoring delete for malformed id");
            return Ok(false);
        };
        Ok(self.questions.delete_one(doc! { "_id": oid }).await? > 0)
    }

    async fn delete_matching(&self, filter: &QuestionFilter) -> Result<u64> {
        self.questions.delete_many(filter_document(filter)).await
    }

    async fn delete_all(&self) -> Result<u64> {
        self.questions.delete_many(doc! {}).await
    }

    async fn statistics(&self) -> Result<Statistics> {
        let total = self.questions.count(doc! {}).await?;
        let with_solutions = self.questions.count(non_empty("solution")).await?;
        let with_images = self.questions.count(non_empty("imageUrl")).await?;

        Ok(Statistics::from_counts(
            total,
            self.group_count("subject").await?,
            self.group_count("exam").await?,
            self.group_count("difficulty").await?,
            with_solutions,
            with_images,
        ))
    }

    async fn ping(&self) -> Result<()> {
        self.client.ping().await
    }
}

#[async_trait::async_trait]
impl UserStore for MongoStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        Ok(self
            .users
            .find_one(doc! { "email": email })
            .await?
            .map(UserRecord::from))
    }

    async fn insert_user(&self, user: UserRecord) -> Result<UserRecord> {
        if self.find_by_email(&user.email).await?.is_some() {
            return Err(AdminError::Conflict("User already exists".into()));
        }

        let id = self.users.insert_one(UserDoc::from(&user)).await?;
        Ok(UserRecord {
            id: Some(id.to_hex()),
            ..user
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_document() {
        let filter = QuestionFilter {
            subject: Some("Algebra".into()),
            tags: vec!["ssc".into()],
            ..Default::default()
        };
        assert_eq!(
            filter_document(&filter),
            doc! { "subject": "Algebra", "tags": { "$in": ["ssc"] } }
        );
        assert_eq!(filter_document(&QuestionFilter::default()), doc! {});
    }
}

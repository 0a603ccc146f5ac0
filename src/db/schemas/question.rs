//! Question document schema
//!
//! Field names match the collection written by the previous Node backend, so
//! existing records load unchanged. Every field is optional on read because
//! older records may lack any of them; numbers are stored as doubles.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{AssignId, IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;
use crate::questions::model::{
    index_of_letter, letter_of, Question, QuestionType, DEFAULT_MARKS, DEFAULT_TIME_LIMIT,
};
use crate::questions::normalize::parse_positive_whole;

/// Collection name for questions
pub const QUESTION_COLLECTION: &str = "questions";

/// Question document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    #[serde(default)]
    pub text: Option<String>,

    /// Legacy documents may hold nulls for blank options
    #[serde(default)]
    pub options: Option<Vec<Option<String>>>,

    #[serde(default)]
    pub answer: Option<String>,

    #[serde(default)]
    pub correct_option_index: Option<f64>,

    #[serde(default)]
    pub correct_option_letter: Option<String>,

    #[serde(default)]
    pub solution: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blooms: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(default)]
    pub tags: Option<Vec<String>>,

    #[serde(default)]
    pub marks: Option<f64>,

    #[serde(default)]
    pub time_limit: Option<f64>,

    #[serde(rename = "type", default)]
    pub question_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

fn whole(value: Option<f64>) -> Option<u32> {
    value.and_then(|v| parse_positive_whole(&v.to_string()))
}

impl QuestionDoc {
    pub fn from_question(question: &Question) -> Self {
        Self {
            id: question
                .id
                .as_deref()
                .and_then(|id| ObjectId::parse_str(id).ok()),
            metadata: Metadata::default(),
            text: Some(question.text.clone()),
            options: Some(question.options.iter().cloned().map(Some).collect()),
            answer: Some(question.answer.clone()),
            correct_option_index: question.correct_option_index.map(|i| i as f64),
            correct_option_letter: question.correct_option_letter.clone(),
            solution: Some(question.solution.clone()),
            subject: question.subject.clone(),
            exam: question.exam.clone(),
            difficulty: question.difficulty.clone(),
            blooms: question.blooms.clone(),
            language: question.language.clone(),
            tags: Some(question.tags.clone()),
            marks: Some(question.marks as f64),
            time_limit: Some(question.time_limit as f64),
            question_type: Some(question.question_type.as_str().to_string()),
            image_url: question.image_url.clone(),
        }
    }

    /// Convert to the canonical record, applying defaults for missing fields.
    ///
    /// Index and letter are kept only when they name one of the four
    /// positions; read-time backfill fills the rest.
    pub fn into_question(self) -> Question {
        let correct_option_index = self
            .correct_option_index
            .filter(|i| i.fract() == 0.0 && *i >= 0.0)
            .map(|i| i as usize)
            .filter(|i| letter_of(*i).is_some());

        let correct_option_letter = self
            .correct_option_letter
            .map(|l| l.trim().to_ascii_uppercase())
            .filter(|l| index_of_letter(l).is_some());

        Question {
            id: self.id.map(|id| id.to_hex()),
            text: self.text.unwrap_or_default(),
            options: self
                .options
                .unwrap_or_default()
                .into_iter()
                .map(Option::unwrap_or_default)
                .collect(),
            answer: self.answer.unwrap_or_default(),
            correct_option_index,
            correct_option_letter,
            solution: self.solution.unwrap_or_default(),
            subject: self.subject,
            exam: self.exam,
            difficulty: self.difficulty,
            blooms: self.blooms,
            language: self.language,
            tags: self.tags.unwrap_or_default(),
            marks: whole(self.marks).unwrap_or(DEFAULT_MARKS),
            time_limit: whole(self.time_limit).unwrap_or(DEFAULT_TIME_LIMIT),
            question_type: self
                .question_type
                .as_deref()
                .and_then(QuestionType::parse)
                .unwrap_or_default(),
            image_url: self.image_url,
        }
    }
}

impl IntoIndexes for QuestionDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Filtered deletes and statistics group on these
            (
                doc! { "subject": 1 },
                Some(IndexOptions::builder().name("subject_index".to_string()).build()),
            ),
            (
                doc! { "exam": 1 },
                Some(IndexOptions::builder().name("exam_index".to_string()).build()),
            ),
            (
                doc! { "tags": 1 },
                Some(IndexOptions::builder().name("tags_index".to_string()).build()),
            ),
        ]
    }
}

impl MutMetadata for QuestionDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

impl AssignId for QuestionDoc {
    fn ensure_id(&mut self) -> ObjectId {
        *self.id.get_or_insert_with(ObjectId::new)
    }
}

//! Canonical question record and answer-key types

use serde::{Deserialize, Serialize};

/// Option labels by position
pub const OPTION_LETTERS: [&str; 4] = ["A", "B", "C", "D"];

/// Maximum number of answer options a question may carry
pub const MAX_OPTIONS: usize = OPTION_LETTERS.len();

pub const DEFAULT_MARKS: u32 = 4;
pub const DEFAULT_TIME_LIMIT: u32 = 60;

/// Letter label for a 0-based option position
pub fn letter_of(index: usize) -> Option<&'static str> {
    OPTION_LETTERS.get(index).copied()
}

/// 0-based option position for a letter label (already uppercased)
pub fn index_of_letter(letter: &str) -> Option<usize> {
    OPTION_LETTERS.iter().position(|l| *l == letter)
}

/// Question delivery mode. `Power` is stored but has no behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    #[default]
    Static,
    Power,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Power => "power",
        }
    }

    /// Parse a user-supplied type name, case-insensitive
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "static" => Some(Self::Static),
            "power" => Some(Self::Power),
            _ => None,
        }
    }
}

/// How the caller identified the correct option
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerKey {
    /// Spreadsheet form: `A`..`D`, case-insensitive
    Letter(String),
    /// Form submission: 0-based option position
    Index(i64),
}

/// Why a persisted record could not be fully resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DegradedReason {
    UnknownAnswerLetter,
    AnswerIndexOutOfRange,
    MissingAnswer,
    BlankCorrectOption,
    MissingText,
}

/// A multiple-choice question in canonical form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Store-assigned id, hex ObjectId for the MongoDB backend
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub text: String,
    pub options: Vec<String>,
    /// Literal text of the correct option
    pub answer: String,
    pub correct_option_index: Option<usize>,
    pub correct_option_letter: Option<String>,
    #[serde(default)]
    pub solution: String,
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
    pub tags: Vec<String>,
    pub marks: u32,
    pub time_limit: u32,
    #[serde(rename = "type", default)]
    pub question_type: QuestionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Question {
    /// Fill a missing index or letter from whatever the record does carry.
    ///
    /// Index gives the letter, a letter gives the index, and failing both an
    /// exact match of `answer` against `options` gives both. Records that
    /// already carry a consistent pair are left alone.
    pub fn backfill_answer_key(&mut self) {
        if let Some(idx) = self.correct_option_index {
            if self.correct_option_letter.is_none() {
                self.correct_option_letter = letter_of(idx).map(str::to_string);
            }
            return;
        }

        let from_letter = self
            .correct_option_letter
            .as_deref()
            .map(|l| l.trim().to_ascii_uppercase())
            .and_then(|l| index_of_letter(&l));

        let idx = from_letter.or_else(|| {
            if self.answer.is_empty() {
                return None;
            }
            self.options
                .iter()
                .take(MAX_OPTIONS)
                .position(|o| *o == self.answer)
        });

        if let Some(idx) = idx {
            self.correct_option_index = Some(idx);
            self.correct_option_letter = letter_of(idx).map(str::to_string);
        }
    }

    pub fn has_solution(&self) -> bool {
        !self.solution.is_empty()
    }

    pub fn has_image(&self) -> bool {
        self.image_url.as_deref().is_some_and(|u| !u.is_empty())
    }
}

/// Result of normalizing one input record
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Clean(Question),
    Degraded(Question, Vec<DegradedReason>),
}

impl RowOutcome {
    pub(crate) fn from_parts(question: Question, reasons: Vec<DegradedReason>) -> Self {
        if reasons.is_empty() {
            Self::Clean(question)
        } else {
            Self::Degraded(question, reasons)
        }
    }

    pub fn question(&self) -> &Question {
        match self {
            Self::Clean(q) | Self::Degraded(q, _) => q,
        }
    }

    pub fn reasons(&self) -> &[DegradedReason] {
        match self {
            Self::Clean(_) => &[],
            Self::Degraded(_, reasons) => reasons,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(..))
    }

    pub fn into_question(self) -> Question {
        match self {
            Self::Clean(q) | Self::Degraded(q, _) => q,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy(answer: &str) -> Question {
        Question {
            id: Some("665f1c2e9b1d4a0012ab34cd".into()),
            text: "2 + 2 = ?".into(),
            options: vec!["3".into(), "4".into(), "5".into(), "6".into()],
            answer: answer.into(),
            correct_option_index: None,
            correct_option_letter: None,
            solution: String::new(),
            subject: None,
            exam: None,
            difficulty: None,
            blooms: None,
            language: None,
            tags: vec![],
            marks: DEFAULT_MARKS,
            time_limit: DEFAULT_TIME_LIMIT,
            question_type: QuestionType::Static,
            image_url: None,
        }
    }

    #[test]
    fn test_letter_table() {
        assert_eq!(letter_of(0), Some("A"));
        assert_eq!(letter_of(3), Some("D"));
        assert_eq!(letter_of(4), None);
        assert_eq!(index_of_letter("C"), Some(2));
        assert_eq!(index_of_letter("E"), None);
    }

    #[test]
    fn test_backfill_from_answer_text() {
        let mut q = legacy("4");
        q.backfill_answer_key();
        assert_eq!(q.correct_option_index, Some(1));
        assert_eq!(q.correct_option_letter.as_deref(), Some("B"));
    }

    #[test]
    fn test_backfill_from_letter() {
        let mut q = legacy("");
        q.correct_option_letter = Some("d".into());
        q.backfill_answer_key();
        assert_eq!(q.correct_option_index, Some(3));
        assert_eq!(q.correct_option_letter.as_deref(), Some("D"));
    }

    #[test]
    fn test_backfill_leaves_unresolvable_alone() {
        let mut q = legacy("42");
        q.backfill_answer_key();
        assert_eq!(q.correct_option_index, None);
        assert_eq!(q.correct_option_letter, None);
    }

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_value(legacy("4")).unwrap();
        assert_eq!(json["_id"], "665f1c2e9b1d4a0012ab34cd");
        assert_eq!(json["timeLimit"], 60);
        assert_eq!(json["type"], "static");
        assert!(json["correctOptionIndex"].is_null());
        assert!(json.get("imageUrl").is_none());
    }
}

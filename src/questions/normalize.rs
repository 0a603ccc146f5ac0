//! Record normalization
//!
//! Maps a spreadsheet row or an interactive submission into a canonical
//! [`Question`]. Both paths share [`resolve_answer`]; they differ in how they
//! treat bad numeric and type values:
//!
//! - Bulk rows never fail. Invalid values fall back to the batch value, then
//!   to the default, with a warning.
//! - Interactive submissions are validated up front and rejected with
//!   [`AdminError::Validation`].

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

use super::model::{
    index_of_letter, letter_of, AnswerKey, DegradedReason, Question, QuestionType, RowOutcome,
    DEFAULT_MARKS, DEFAULT_TIME_LIMIT, MAX_OPTIONS,
};
use crate::types::AdminError;

// ============================================================================
// Answer resolution
// ============================================================================

/// Correct-answer fields derived from an [`AnswerKey`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAnswer {
    pub index: Option<usize>,
    pub letter: Option<String>,
    pub answer: String,
    pub reason: Option<DegradedReason>,
}

impl ResolvedAnswer {
    fn unresolved(fallback: &str, reason: DegradedReason) -> Self {
        Self {
            index: None,
            letter: None,
            answer: fallback.to_string(),
            reason: Some(reason),
        }
    }
}

/// Resolve the correct option from a letter or index key.
///
/// Never fails: a key that cannot be resolved leaves index and letter unset
/// and keeps `fallback` as the answer text.
pub fn resolve_answer(key: Option<&AnswerKey>, options: &[String], fallback: &str) -> ResolvedAnswer {
    let bound = options.len().min(MAX_OPTIONS);

    let index = match key {
        None => return ResolvedAnswer::unresolved(fallback, DegradedReason::MissingAnswer),
        Some(AnswerKey::Letter(raw)) => {
            let letter = raw.trim().to_ascii_uppercase();
            match index_of_letter(&letter) {
                Some(idx) => idx,
                None => {
                    return ResolvedAnswer::unresolved(fallback, DegradedReason::UnknownAnswerLetter)
                }
            }
        }
        Some(AnswerKey::Index(raw)) => match usize::try_from(*raw) {
            Ok(idx) if idx < bound => idx,
            _ => {
                return ResolvedAnswer::unresolved(fallback, DegradedReason::AnswerIndexOutOfRange)
            }
        },
    };

    // A resolved position always owns the answer text, even when blank
    let answer = options.get(index).cloned().unwrap_or_default();
    let reason = answer
        .trim()
        .is_empty()
        .then_some(DegradedReason::BlankCorrectOption);

    ResolvedAnswer {
        index: Some(index),
        letter: letter_of(index).map(str::to_string),
        answer,
        reason,
    }
}

// ============================================================================
// Field parsing
// ============================================================================

/// Split a comma-separated tag string, trimming and dropping empties
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a positive whole number. `"4"`, `" 4 "` and `"4.0"` all give 4.
pub fn parse_positive_whole(raw: &str) -> Option<u32> {
    let value: f64 = raw.trim().parse().ok()?;
    if value.is_finite() && value >= 1.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
        Some(value as u32)
    } else {
        None
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// ============================================================================
// Bulk path
// ============================================================================

/// One spreadsheet row keyed by the template's column names.
///
/// Blank cells are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportRow {
    pub text: Option<String>,
    pub option_a: Option<String>,
    pub option_b: Option<String>,
    pub option_c: Option<String>,
    pub option_d: Option<String>,
    pub answer: Option<String>,
    pub solution: Option<String>,
    pub subject: Option<String>,
    pub exam: Option<String>,
    pub difficulty: Option<String>,
    pub tags: Option<String>,
    pub marks: Option<String>,
    pub time_limit: Option<String>,
    pub blooms: Option<String>,
    pub question_type: Option<String>,
    pub image_url: Option<String>,
    pub language: Option<String>,
}

impl ImportRow {
    /// Build from header-keyed cells. Unknown columns are ignored.
    pub fn from_cells(cells: &HashMap<String, String>) -> Self {
        let get = |name: &str| {
            cells
                .get(name)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        Self {
            text: get("text"),
            option_a: get("optionA"),
            option_b: get("optionB"),
            option_c: get("optionC"),
            option_d: get("optionD"),
            answer: get("answer"),
            solution: get("solution"),
            subject: get("subject"),
            exam: get("exam"),
            difficulty: get("difficulty"),
            tags: get("tags"),
            marks: get("marks"),
            time_limit: get("timeLimit"),
            blooms: get("blooms"),
            question_type: get("type"),
            image_url: get("imageUrl"),
            language: get("language"),
        }
    }
}

/// Values submitted once with an upload and applied to rows lacking their own
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOverrides {
    pub marks: Option<String>,
    pub time_limit: Option<String>,
    pub blooms: Option<String>,
    pub question_type: Option<String>,
    pub subject: Option<String>,
    pub exam: Option<String>,
    pub difficulty: Option<String>,
    pub language: Option<String>,
    pub tags: Option<String>,
}

impl BatchOverrides {
    /// Assign a multipart form field by name. Returns false for unknown names.
    pub fn set_field(&mut self, name: &str, value: String) -> bool {
        let slot = match name {
            "marks" => &mut self.marks,
            "timeLimit" => &mut self.time_limit,
            "blooms" => &mut self.blooms,
            "type" => &mut self.question_type,
            "subject" => &mut self.subject,
            "exam" => &mut self.exam,
            "difficulty" => &mut self.difficulty,
            "language" => &mut self.language,
            "tags" => &mut self.tags,
            _ => return false,
        };
        *slot = Some(value).filter(|v| !v.trim().is_empty());
        true
    }
}

/// Row value, then batch value, then default. Invalid values are skipped.
fn resolve_number(
    field: &'static str,
    row_number: usize,
    row: Option<&str>,
    batch: Option<&str>,
    default: u32,
) -> u32 {
    for (source, raw) in [("row", row), ("batch", batch)] {
        let Some(raw) = non_blank(raw) else { continue };
        match parse_positive_whole(raw) {
            Some(value) => return value,
            None => warn!(
                row = row_number,
                field,
                source,
                value = raw,
                "Ignoring invalid numeric value"
            ),
        }
    }
    default
}

fn resolve_type(row_number: usize, row: Option<&str>, batch: Option<&str>) -> QuestionType {
    for (source, raw) in [("row", row), ("batch", batch)] {
        let Some(raw) = non_blank(raw) else { continue };
        match QuestionType::parse(raw) {
            Some(t) => return t,
            None => warn!(row = row_number, source, value = raw, "Ignoring unknown question type"),
        }
    }
    QuestionType::default()
}

fn row_or_batch(row: &Option<String>, batch: &Option<String>) -> Option<String> {
    non_blank(row.as_deref())
        .or_else(|| non_blank(batch.as_deref()))
        .map(str::to_string)
}

/// Normalize one spreadsheet row. Never fails; unresolvable rows degrade.
///
/// `row_number` is only used for log context.
pub fn normalize_import_row(row: &ImportRow, batch: &BatchOverrides, row_number: usize) -> RowOutcome {
    let options: Vec<String> = [&row.option_a, &row.option_b, &row.option_c, &row.option_d]
        .into_iter()
        .map(|o| o.clone().unwrap_or_default())
        .collect();

    let key = row.answer.as_ref().map(|a| AnswerKey::Letter(a.clone()));
    let resolved = resolve_answer(key.as_ref(), &options, "");

    let mut reasons = Vec::new();
    let text = row.text.clone().unwrap_or_default();
    if text.trim().is_empty() {
        reasons.push(DegradedReason::MissingText);
    }
    reasons.extend(resolved.reason);

    let tags = row_or_batch(&row.tags, &batch.tags)
        .map(|t| parse_tags(&t))
        .unwrap_or_default();

    let question = Question {
        id: None,
        text,
        options,
        answer: resolved.answer,
        correct_option_index: resolved.index,
        correct_option_letter: resolved.letter,
        solution: row.solution.clone().unwrap_or_default(),
        subject: row_or_batch(&row.subject, &batch.subject),
        exam: row_or_batch(&row.exam, &batch.exam),
        difficulty: row_or_batch(&row.difficulty, &batch.difficulty),
        blooms: row_or_batch(&row.blooms, &batch.blooms),
        language: row_or_batch(&row.language, &batch.language),
        tags,
        marks: resolve_number(
            "marks",
            row_number,
            row.marks.as_deref(),
            batch.marks.as_deref(),
            DEFAULT_MARKS,
        ),
        time_limit: resolve_number(
            "timeLimit",
            row_number,
            row.time_limit.as_deref(),
            batch.time_limit.as_deref(),
            DEFAULT_TIME_LIMIT,
        ),
        question_type: resolve_type(
            row_number,
            row.question_type.as_deref(),
            batch.question_type.as_deref(),
        ),
        image_url: row.image_url.clone(),
    };

    RowOutcome::from_parts(question, reasons)
}

// ============================================================================
// Interactive path
// ============================================================================

/// Tags arrive either as a list or as a comma-separated string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TagsInput {
    List(Vec<String>),
    Text(String),
}

impl TagsInput {
    pub fn into_tags(self) -> Vec<String> {
        match self {
            Self::List(list) => list,
            Self::Text(text) => parse_tags(&text),
        }
    }
}

/// Body of `POST /questions`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    /// Caller-supplied answer text, used only when `correctAnswer` is absent
    #[serde(default)]
    pub answer: Option<String>,
    /// 0-based index of the correct option
    #[serde(default)]
    pub correct_answer: Option<Value>,
    #[serde(default)]
    pub solution: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub exam: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub tags: Option<TagsInput>,
    #[serde(default)]
    pub marks: Option<Value>,
    #[serde(default)]
    pub time_limit: Option<Value>,
    #[serde(default)]
    pub blooms: Option<String>,
    #[serde(default, rename = "type")]
    pub question_type: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// Text view of a JSON scalar; `None` for null and for an empty string
fn scalar_text(value: &Value) -> Option<Result<String, ()>> {
    match value {
        Value::Null => None,
        Value::Number(n) => Some(Ok(n.to_string())),
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(Ok(s.clone())),
        _ => Some(Err(())),
    }
}

fn validate_number(field: &str, value: Option<&Value>, default: u32) -> Result<u32, AdminError> {
    let Some(text) = value.and_then(scalar_text) else {
        return Ok(default);
    };
    text.ok()
        .and_then(|t| parse_positive_whole(&t))
        .ok_or_else(|| AdminError::Validation(format!("{field} must be a positive whole number")))
}

fn answer_key_from(value: Option<&Value>) -> Result<Option<AnswerKey>, AdminError> {
    let Some(text) = value.and_then(scalar_text) else {
        return Ok(None);
    };
    let invalid = || AdminError::Validation("correctAnswer must be an option index".into());
    let text = text.map_err(|_| invalid())?;
    let number: f64 = text.trim().parse().map_err(|_| invalid())?;
    if !number.is_finite() || number.fract() != 0.0 {
        return Err(invalid());
    }
    Ok(Some(AnswerKey::Index(number as i64)))
}

fn optional_text(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Validate and normalize an interactive submission
pub fn normalize_submission(req: CreateQuestionRequest) -> Result<RowOutcome, AdminError> {
    let text = req.text.unwrap_or_default();
    if text.trim().is_empty() {
        return Err(AdminError::Validation("text is required".into()));
    }

    let options = req.options.unwrap_or_default();
    if options.len() > MAX_OPTIONS {
        return Err(AdminError::Validation(format!(
            "at most {MAX_OPTIONS} options are allowed"
        )));
    }

    let marks = validate_number("marks", req.marks.as_ref(), DEFAULT_MARKS)?;
    let time_limit = validate_number("timeLimit", req.time_limit.as_ref(), DEFAULT_TIME_LIMIT)?;

    let question_type = match non_blank(req.question_type.as_deref()) {
        None => QuestionType::default(),
        Some(raw) => QuestionType::parse(raw).ok_or_else(|| {
            AdminError::Validation("type must be 'static' or 'power'".into())
        })?,
    };

    let key = answer_key_from(req.correct_answer.as_ref())?;
    let fallback = req.answer.unwrap_or_default();
    let resolved = resolve_answer(key.as_ref(), &options, &fallback);

    let question = Question {
        id: None,
        text,
        options,
        answer: resolved.answer,
        correct_option_index: resolved.index,
        correct_option_letter: resolved.letter,
        solution: req.solution.unwrap_or_default(),
        subject: optional_text(req.subject),
        exam: optional_text(req.exam),
        difficulty: optional_text(req.difficulty),
        blooms: optional_text(req.blooms),
        language: optional_text(req.language),
        tags: req.tags.map(TagsInput::into_tags).unwrap_or_default(),
        marks,
        time_limit,
        question_type,
        image_url: optional_text(req.image_url),
    };

    Ok(RowOutcome::from_parts(question, resolved.reason.into_iter().collect()))
}

//! Question domain: canonical record, normalization and statistics

pub mod model;
pub mod normalize;
pub mod statistics;

pub use model::{
    letter_of, AnswerKey, DegradedReason, Question, QuestionType, RowOutcome, MAX_OPTIONS,
};
pub use normalize::{
    normalize_import_row, normalize_submission, parse_tags, resolve_answer, BatchOverrides,
    CreateQuestionRequest, ImportRow, TagsInput,
};
pub use statistics::{GroupCount, Statistics};

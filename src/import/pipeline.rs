//! Bulk import: parse an upload, normalize every row, persist as one batch.
//!
//! Malformed rows never abort an import; they are stored degraded and listed
//! in the report. Only an unreadable file or an oversized batch rejects the
//! upload, and then nothing is written.

use serde::Serialize;
use tracing::{info, warn};

use super::spreadsheet::read_rows;
use crate::questions::{
    normalize_import_row, BatchOverrides, DegradedReason, ImportRow, Question, RowOutcome,
};
use crate::store::QuestionStore;
use crate::types::{AdminError, Result};

/// A row that was stored without a resolvable answer or text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DegradedRow {
    /// 1-based spreadsheet row (header is row 1)
    pub row: usize,
    pub reasons: Vec<DegradedReason>,
}

/// Response body of a successful import
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub added: usize,
    pub questions: Vec<Question>,
    pub degraded: Vec<DegradedRow>,
}

/// Rows ready to persist, with their degradation notes
#[derive(Debug)]
pub struct PreparedBatch {
    pub questions: Vec<Question>,
    pub degraded: Vec<DegradedRow>,
}

/// Parse and normalize an upload without touching storage
pub fn prepare_batch(
    file: &[u8],
    batch: &BatchOverrides,
    max_rows: usize,
) -> Result<PreparedBatch> {
    let rows = read_rows(file)?;

    if rows.len() > max_rows {
        return Err(AdminError::BadRequest(format!(
            "Upload has {} rows; at most {} are allowed per file",
            rows.len(),
            max_rows
        )));
    }

    let mut questions = Vec::with_capacity(rows.len());
    let mut degraded = Vec::new();

    for row in &rows {
        match normalize_import_row(&ImportRow::from_cells(&row.cells), batch, row.number) {
            RowOutcome::Clean(question) => questions.push(question),
            RowOutcome::Degraded(question, reasons) => {
                warn!(row = row.number, ?reasons, "Importing degraded row");
                questions.push(question);
                degraded.push(DegradedRow {
                    row: row.number,
                    reasons,
                });
            }
        }
    }

    Ok(PreparedBatch {
        questions,
        degraded,
    })
}

/// Import an uploaded spreadsheet into the store
pub async fn import_questions(
    store: &dyn QuestionStore,
    file: &[u8],
    batch: &BatchOverrides,
    max_rows: usize,
) -> Result<ImportReport> {
    let prepared = prepare_batch(file, batch, max_rows)?;

    let questions = if prepared.questions.is_empty() {
        Vec::new()
    } else {
        store.insert_many(prepared.questions).await?
    };

    info!(
        added = questions.len(),
        degraded = prepared.degraded.len(),
        "Bulk import complete"
    );

    Ok(ImportReport {
        added: questions.len(),
        questions,
        degraded: prepared.degraded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    const HEADER: &str = "text,optionA,optionB,optionC,optionD,answer,solution,subject,exam,difficulty,tags,marks,timeLimit,blooms,type\n";

    fn csv(rows: &[&str]) -> Vec<u8> {
        let mut out = HEADER.to_string();
        for row in rows {
            out.push_str(row);
            out.push('\n');
        }
        out.into_bytes()
    }

    #[tokio::test]
    async fn test_unknown_letters_still_persist() {
        let store = MemoryStore::new();
        let file = csv(&[
            "Q1,a,b,c,d,A,,Math,SSC,easy,,,,,",
            "Q2,a,b,c,d,E,,Math,SSC,easy,,,,,",
            "Q3,a,b,c,d,z,,Math,SSC,easy,,,,,",
        ]);

        let report = import_questions(&store, &file, &BatchOverrides::default(), 50)
            .await
            .unwrap();

        assert_eq!(report.added, 3);
        assert_eq!(report.questions[0].correct_option_index, Some(0));
        assert_eq!(report.questions[1].correct_option_index, None);
        assert_eq!(report.questions[2].correct_option_index, None);
        assert_eq!(
            report.degraded,
            vec![
                DegradedRow { row: 3, reasons: vec![DegradedReason::UnknownAnswerLetter] },
                DegradedRow { row: 4, reasons: vec![DegradedReason::UnknownAnswerLetter] },
            ]
        );
        assert_eq!(store.list_all().await.unwrap().len(), 3);
    }

    #[test]
    fn test_row_limit_rejects_whole_file() {
        let rows: Vec<String> = (0..3).map(|i| format!("Q{i},a,b,c,d,A,,,,,,,,,")).collect();
        let refs: Vec<&str> = rows.iter().map(String::as_str).collect();

        let err = prepare_batch(&csv(&refs), &BatchOverrides::default(), 2).unwrap_err();
        assert!(matches!(err, AdminError::BadRequest(_)));
        assert!(prepare_batch(&csv(&refs), &BatchOverrides::default(), 3).is_ok());
    }

    #[test]
    fn test_batch_overrides_fill_blank_cells() {
        let batch = BatchOverrides {
            marks: Some("2".into()),
            time_limit: Some("45".into()),
            blooms: Some("Apply".into()),
            ..Default::default()
        };
        let prepared = prepare_batch(
            &csv(&["Q1,a,b,c,d,B,,,,,\"x, y\",5,,,power"]),
            &batch,
            50,
        )
        .unwrap();

        let q = &prepared.questions[0];
        assert_eq!(q.marks, 5);
        assert_eq!(q.time_limit, 45);
        assert_eq!(q.blooms.as_deref(), Some("Apply"));
        assert_eq!(q.tags, vec!["x", "y"]);
        assert_eq!(q.answer, "b");
        assert_eq!(q.question_type.as_str(), "power");
    }

    #[tokio::test]
    async fn test_empty_sheet_adds_nothing() {
        let store = MemoryStore::new();
        let report = import_questions(&store, HEADER.as_bytes(), &BatchOverrides::default(), 50)
            .await
            .unwrap();
        assert_eq!(report.added, 0);
        assert!(report.degraded.is_empty());
    }
}

//! Bulk question import from spreadsheets

pub mod pipeline;
pub mod spreadsheet;

pub use pipeline::{import_questions, prepare_batch, DegradedRow, ImportReport};
pub use spreadsheet::{read_rows, SheetFormat, SheetRow};

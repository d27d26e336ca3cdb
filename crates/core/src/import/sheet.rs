//! Reading the first worksheet of an upload as raw text.
//!
//! Every cell is kept as text; numbers are interpreted later, column by
//! column. Rows whose cells are all blank are dropped.

use std::io::Cursor;

use calamine::{Reader, open_workbook_auto_from_rs};

use super::error::ImportError;

/// Sheet name recorded for CSV uploads.
pub const CSV_SHEET_NAME: &str = "Sheet1";

/// Supported upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    /// Excel or OpenDocument workbook.
    Workbook,
    /// Comma separated values, UTF-8.
    Csv,
}

impl SheetFormat {
    /// Detects the format from the file extension.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::UnsupportedFormat` for unknown extensions.
    pub fn from_file_name(file_name: &str) -> Result<Self, ImportError> {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Self::Workbook),
            "csv" => Ok(Self::Csv),
            _ => Err(ImportError::UnsupportedFormat {
                file_name: file_name.to_string(),
            }),
        }
    }
}

/// One data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    /// 1-based row number in the file.
    pub number: usize,
    /// Raw cell text.
    pub cells: Vec<String>,
}

/// A worksheet as text: one header row, then data rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
    /// Worksheet name.
    pub name: String,
    /// Trimmed header cells.
    pub headers: Vec<String>,
    /// Non-blank data rows.
    pub rows: Vec<SheetRow>,
}

impl Sheet {
    /// `first_row` is the file row number of the header row.
    fn from_rows(
        name: String,
        first_row: usize,
        rows: impl IntoIterator<Item = Vec<String>>,
    ) -> Self {
        let mut rows = rows.into_iter().enumerate();
        let headers = rows
            .next()
            .map(|(_, h)| h.into_iter().map(|c| c.trim().to_string()).collect())
            .unwrap_or_default();
        let rows = rows
            .filter(|(_, cells)| cells.iter().any(|c| !c.trim().is_empty()))
            .map(|(i, cells)| SheetRow {
                number: first_row + i,
                cells,
            })
            .collect();
        Self {
            name,
            headers,
            rows,
        }
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Parses an uploaded file.
///
/// # Errors
///
/// Returns `ImportError::UnsupportedFormat` for unknown extensions and
/// `ImportError::Unreadable` when the content does not parse.
pub fn parse_sheet(bytes: &[u8], file_name: &str) -> Result<Sheet, ImportError> {
    match SheetFormat::from_file_name(file_name)? {
        SheetFormat::Workbook => parse_workbook(bytes),
        SheetFormat::Csv => parse_csv(bytes),
    }
}

fn parse_workbook(bytes: &[u8]) -> Result<Sheet, ImportError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| ImportError::Unreadable(e.to_string()))?;
    let name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ImportError::Unreadable("workbook has no worksheets".to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ImportError::Unreadable("workbook has no worksheets".to_string()))?
        .map_err(|e| ImportError::Unreadable(e.to_string()))?;

    let first_row = range.start().map_or(1, |(row, _)| row as usize + 1);
    let rows = range
        .rows()
        .map(|row| row.iter().map(ToString::to_string).collect::<Vec<_>>());
    Ok(Sheet::from_rows(name, first_row, rows))
}

fn parse_csv(bytes: &[u8]) -> Result<Sheet, ImportError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let rows = reader
        .records()
        .map(|record| {
            record
                .map(|r| r.iter().map(str::to_string).collect::<Vec<_>>())
                .map_err(|e| ImportError::Unreadable(e.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Sheet::from_rows(CSV_SHEET_NAME.to_string(), 1, rows))
}

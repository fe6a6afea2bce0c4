//! Raw sheet access
//!
//! Reads the first worksheet of a workbook (via calamine) or a CSV file into
//! a grid of [`Cell`]s. Row and column indices in the grid match the
//! worksheet's own positions, so a fixed header offset can be applied
//! regardless of where the used range begins.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::LoadError;

/// A single cell value
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Bool(bool),
}

impl Cell {
    /// Blank cells and whitespace-only text
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Display form of the cell, `None` when blank
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) if s.trim().is_empty() => None,
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => Some(format!("{}", *n as i64)),
            Cell::Number(n) => Some(n.to_string()),
            Cell::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
            Cell::Bool(b) => Some(b.to_string()),
        }
    }
}

/// Supported input formats
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SheetFormat {
    /// xlsx, xlsm, xlsb, xls or ods, read with calamine
    Workbook,
    /// Comma separated values
    Csv,
}

impl SheetFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(SheetFormat::Workbook),
            "csv" => Some(SheetFormat::Csv),
            _ => None,
        }
    }
}

/// Cell grid of the first worksheet
#[derive(Clone, Debug, Default)]
pub struct Sheet {
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&Cell::Empty)
    }

    /// Widest row length
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// Read the first worksheet of `path`
pub fn read_sheet(path: &Path) -> Result<Sheet, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    match SheetFormat::from_path(path) {
        Some(SheetFormat::Workbook) => read_workbook(path),
        Some(SheetFormat::Csv) => read_csv(path),
        None => Err(LoadError::UnsupportedFormat(path.to_path_buf())),
    }
}

fn read_workbook(path: &Path) -> Result<Sheet, LoadError> {
    let unreadable = |reason: String| LoadError::Unreadable {
        path: path.to_path_buf(),
        reason,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| unreadable(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| unreadable("workbook has no worksheets".into()))?
        .map_err(|e| unreadable(e.to_string()))?;

    // The used range may start below or right of A1
    let (first_row, first_col) = range.start().unwrap_or((0, 0));
    let mut rows = vec![Vec::new(); first_row as usize];
    for data_row in range.rows() {
        let mut cells = vec![Cell::Empty; first_col as usize];
        cells.extend(data_row.iter().map(cell_from_data));
        rows.push(cells);
    }
    Ok(Sheet { rows })
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64()).map_or(Cell::Empty, Cell::Date),
        Data::DateTimeIso(s) => parse_date_text(s).map_or_else(|| Cell::Text(s.clone()), Cell::Date),
        Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

// Blank lines are not counted as rows, matching common CSV readers
fn read_csv(path: &Path) -> Result<Sheet, LoadError> {
    let unreadable = |e: csv::Error| LoadError::Unreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(unreadable)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(unreadable)?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.trim().is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(Sheet { rows })
}

/// Convert an Excel serial day number (1900 date system) to a date
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::try_days(serial.floor() as i64)?)
}

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y", "%d.%m.%Y"];

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parse a textual date; the time part of a timestamp is discarded
pub fn parse_date_text(raw: &str) -> Option<NaiveDate> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn excel_serials() {
        assert_eq!(excel_serial_to_date(45658.0), Some(date(2025, 1, 1)));
        assert_eq!(excel_serial_to_date(45658.75), Some(date(2025, 1, 1)));
        assert_eq!(excel_serial_to_date(0.0), None);
        assert_eq!(excel_serial_to_date(f64::NAN), None);
    }

    #[test]
    fn text_dates() {
        assert_eq!(parse_date_text("2025-06-09"), Some(date(2025, 6, 9)));
        assert_eq!(parse_date_text(" 2025/06/09 "), Some(date(2025, 6, 9)));
        assert_eq!(parse_date_text("2025-06-09 00:00:00"), Some(date(2025, 6, 9)));
        assert_eq!(parse_date_text("06/09/2025"), Some(date(2025, 6, 9)));
        assert_eq!(parse_date_text("13/02/2025"), Some(date(2025, 2, 13)));
        assert_eq!(parse_date_text("09.06.2025"), Some(date(2025, 6, 9)));
        assert_eq!(parse_date_text("soon"), None);
    }

    #[test]
    fn format_detection() {
        assert_eq!(SheetFormat::from_path(Path::new("plan.XLSX")), Some(SheetFormat::Workbook));
        assert_eq!(SheetFormat::from_path(Path::new("plan.csv")), Some(SheetFormat::Csv));
        assert_eq!(SheetFormat::from_path(Path::new("plan.txt")), None);
        assert_eq!(SheetFormat::from_path(Path::new("plan")), None);
    }

    #[test]
    fn cell_text_forms() {
        assert_eq!(Cell::Number(12.0).as_text(), Some("12".into()));
        assert_eq!(Cell::Number(2.5).as_text(), Some("2.5".into()));
        assert_eq!(Cell::Text("  ".into()).as_text(), None);
        assert!(Cell::Text(" \t".into()).is_blank());
        assert!(!Cell::Number(0.0).is_blank());
    }
}

//! # gantline-loader
//!
//! Loads the milestone sheet into [`Task`]s.
//!
//! The sheet layout is fixed: a preamble, then a header row (the ninth row
//! by default), then one milestone per row. Blank rows and columns are
//! dropped, header names are trimmed and matched exactly, and rows without
//! a usable start date or duration are skipped.
//!
//! ```rust,no_run
//! use gantline_loader::{load, LoadOptions, Profile};
//!
//! let table = load("GANTT_TAI.xlsx", &LoadOptions::new(Profile::Digest))?;
//! println!("{} tasks", table.tasks.len());
//! # Ok::<(), gantline_loader::LoadError>(())
//! ```

pub mod cache;
pub mod sheet;

pub use cache::TaskCache;
pub use sheet::{Cell, Sheet, SheetFormat};

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use gantline_core::{normalize_category, normalize_name, Task};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Task description column
pub const COL_NAME: &str = "Milestone description";
/// Category column
pub const COL_CATEGORY: &str = "Category";
/// Start date column
pub const COL_START: &str = "Start";
/// Duration (days) column
pub const COL_DAYS: &str = "Days";
/// Explicit progress column
pub const COL_PROGRESS: &str = "Progress";

/// Zero-based index of the default header row (the ninth row)
pub const DEFAULT_HEADER_ROW: usize = 8;

/// Which consumer the sheet is loaded for; decides the required columns
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Profile {
    /// Timeline chart: description, category, start, days
    #[default]
    Chart,
    /// Email digest: description, start, days
    Digest,
}

/// Loader settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadOptions {
    /// Zero-based header row; rows above it are preamble
    pub header_row: usize,
    pub profile: Profile,
    /// Also require the `Progress` column
    pub require_progress: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            header_row: DEFAULT_HEADER_ROW,
            profile: Profile::Chart,
            require_progress: false,
        }
    }
}

impl LoadOptions {
    pub fn new(profile: Profile) -> Self {
        Self {
            profile,
            ..Self::default()
        }
    }

    pub fn header_row(mut self, row: usize) -> Self {
        self.header_row = row;
        self
    }

    pub fn require_progress(mut self) -> Self {
        self.require_progress = true;
        self
    }

    /// Column names that must be present after cleanup
    pub fn required_columns(&self) -> Vec<&'static str> {
        let mut cols = match self.profile {
            Profile::Chart => vec![COL_NAME, COL_CATEGORY, COL_START, COL_DAYS],
            Profile::Digest => vec![COL_NAME, COL_START, COL_DAYS],
        };
        if self.require_progress {
            cols.push(COL_PROGRESS);
        }
        cols
    }
}

/// Loading error
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("The file '{}' was not found", .0.display())]
    NotFound(PathBuf),

    #[error("Could not read '{}': {reason}", path.display())]
    Unreadable { path: PathBuf, reason: String },

    #[error("Unsupported file type '{}' (expected .xlsx, .xlsm, .xlsb, .xls, .ods or .csv)", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Missing essential columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("No tasks with a valid start date and duration were found ({dropped} rows skipped)")]
    NoValidTasks { dropped: usize },
}

/// Validated tasks of one sheet
#[derive(Clone, Debug, PartialEq)]
pub struct TaskTable {
    pub source: PathBuf,
    pub tasks: Vec<Task>,
    /// Data rows skipped for a missing or malformed start/duration
    pub dropped_rows: usize,
}

/// Load and validate the milestone sheet at `path`
pub fn load(path: impl AsRef<Path>, options: &LoadOptions) -> Result<TaskTable, LoadError> {
    let path = path.as_ref();
    let sheet = sheet::read_sheet(path)?;
    let table = tasks_from_sheet(&sheet, options, path)?;
    info!(
        file = %path.display(),
        tasks = table.tasks.len(),
        dropped = table.dropped_rows,
        "loaded milestone sheet"
    );
    Ok(table)
}

/// Apply header offset, cleanup, validation and coercion to a raw grid
pub fn tasks_from_sheet(
    sheet: &Sheet,
    options: &LoadOptions,
    source: &Path,
) -> Result<TaskTable, LoadError> {
    let data_rows: Vec<&Vec<Cell>> = sheet
        .rows
        .iter()
        .skip(options.header_row + 1)
        .filter(|row| !row.iter().all(Cell::is_blank))
        .collect();

    let columns = header_columns(sheet, options.header_row, &data_rows);

    let missing: Vec<String> = options
        .required_columns()
        .into_iter()
        .filter(|c| !columns.contains_key(*c))
        .map(String::from)
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns(missing));
    }

    let text = |row: &[Cell], col: &str| -> Option<String> {
        columns
            .get(col)
            .and_then(|&idx| row.get(idx))
            .and_then(Cell::as_text)
    };
    let cell = |row: &[Cell], col: &str| -> Option<Cell> {
        columns.get(col).and_then(|&idx| row.get(idx)).cloned()
    };

    let mut tasks = Vec::new();
    let mut dropped = 0;
    for (offset, row) in data_rows.iter().enumerate() {
        let row: &[Cell] = row.as_slice();
        let start = cell(row, COL_START).as_ref().and_then(parse_start);
        let days = cell(row, COL_DAYS).as_ref().and_then(parse_days);
        let (Some(start), Some(duration_days)) = (start, days) else {
            dropped += 1;
            debug!(row = offset + 1, "skipping row without a valid start date and duration");
            continue;
        };

        let mut task = Task::new(normalize_name(text(row, COL_NAME).as_deref()), start, duration_days)
            .category(normalize_category(text(row, COL_CATEGORY).as_deref()));
        if let Some(pct) = cell(row, COL_PROGRESS).as_ref().and_then(parse_progress) {
            task = task.sheet_progress(pct);
        }
        tasks.push(task);
    }

    if tasks.is_empty() {
        return Err(LoadError::NoValidTasks { dropped });
    }
    if dropped > 0 {
        warn!(dropped, "skipped rows without a valid start date and duration");
    }

    Ok(TaskTable {
        source: source.to_path_buf(),
        tasks,
        dropped_rows: dropped,
    })
}

/// Map trimmed header names to column indices, ignoring columns whose data
/// cells are all blank. The first occurrence of a duplicated name wins.
fn header_columns(sheet: &Sheet, header_row: usize, data_rows: &[&Vec<Cell>]) -> HashMap<String, usize> {
    let mut columns = HashMap::new();
    for col in 0..sheet.width() {
        let has_data = data_rows
            .iter()
            .any(|row| row.get(col).is_some_and(|c| !c.is_blank()));
        if !has_data {
            continue;
        }
        if let Some(name) = sheet.cell(header_row, col).as_text() {
            columns.entry(name.trim().to_string()).or_insert(col);
        }
    }
    columns
}

fn parse_start(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Date(d) => Some(*d),
        Cell::Number(n) => sheet::excel_serial_to_date(*n),
        Cell::Text(s) => sheet::parse_date_text(s),
        Cell::Empty | Cell::Bool(_) => None,
    }
}

/// Whole days; fractional values are rounded to the nearest day
fn parse_days(cell: &Cell) -> Option<i64> {
    let value = match cell {
        Cell::Number(n) => *n,
        Cell::Text(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    value.is_finite().then(|| value.round() as i64)
}

/// Progress as a percentage. Numbers in `[0, 1]` are fractions (percent
/// formatted cells), larger numbers are already percentages.
fn parse_progress(cell: &Cell) -> Option<f64> {
    let pct = match cell {
        Cell::Number(n) => fraction_or_percent(*n),
        Cell::Text(s) => {
            let s = s.trim();
            match s.strip_suffix('%') {
                Some(num) => num.trim().parse::<f64>().ok()?,
                None => fraction_or_percent(s.parse::<f64>().ok()?),
            }
        }
        _ => return None,
    };
    pct.is_finite().then(|| pct.clamp(0.0, 100.0))
}

fn fraction_or_percent(n: f64) -> f64 {
    if (0.0..=1.0).contains(&n) {
        n * 100.0
    } else {
        n
    }
}

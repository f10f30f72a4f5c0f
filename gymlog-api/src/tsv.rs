//! Tab-separated plan import format
//!
//! Columns: `date  template  exercise  sets  reps  [weight]`. Blank lines
//! and `#` comments are skipped; a leading row whose first cell is `date` is
//! a header. Rows sharing `(date, template)` form one plan.
//!
//! Parsing here is purely syntactic. Name resolution against the database
//! happens in [`crate::db::import`].

use chrono::NaiveDate;
use gymlog_common::time::parse_date;
use std::fmt;

const MIN_COLUMNS: usize = 5;
const MAX_COLUMNS: usize = 6;

/// One validated data row
#[derive(Debug, Clone, PartialEq)]
pub struct TsvRow {
    /// 1-based physical line number
    pub line: usize,
    pub date: NaiveDate,
    pub template: String,
    pub exercise: String,
    pub sets: i64,
    pub reps: i64,
    pub weight: Option<f64>,
}

/// A row-level problem, reported as `line N: message`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportError {
    /// 1-based line number; 0 for whole-file problems
    pub line: usize,
    pub message: String,
}

impl ImportError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            write!(f, "{}", self.message)
        } else {
            write!(f, "line {}: {}", self.line, self.message)
        }
    }
}

/// Rows that become one plan
#[derive(Debug, Clone, PartialEq)]
pub struct PlanGroup {
    pub date: NaiveDate,
    pub template: String,
    pub rows: Vec<TsvRow>,
}

/// Parse every row, collecting all errors rather than stopping at the first
pub fn parse_plan_tsv(input: &str) -> Result<Vec<TsvRow>, Vec<ImportError>> {
    let mut rows = Vec::new();
    let mut errors = Vec::new();
    let mut seen_content = false;

    for (index, raw) in input.lines().enumerate() {
        let line = index + 1;
        let text = raw.trim_end_matches('\r');
        if text.trim().is_empty() || text.trim_start().starts_with('#') {
            continue;
        }

        let cells: Vec<&str> = text.split('\t').map(str::trim).collect();

        if !seen_content {
            seen_content = true;
            if cells[0].eq_ignore_ascii_case("date") {
                continue;
            }
        }

        match parse_row(line, &cells) {
            Ok(row) => rows.push(row),
            Err(mut row_errors) => errors.append(&mut row_errors),
        }
    }

    if rows.is_empty() && errors.is_empty() {
        errors.push(ImportError::new(0, "no rows to import"));
    }

    if errors.is_empty() {
        Ok(rows)
    } else {
        Err(errors)
    }
}

fn parse_row(line: usize, cells: &[&str]) -> Result<TsvRow, Vec<ImportError>> {
    // Trailing empty cells (e.g. an absent weight) are tolerated
    let used = cells
        .iter()
        .rposition(|c| !c.is_empty())
        .map_or(0, |last| last + 1);

    if !(MIN_COLUMNS..=MAX_COLUMNS).contains(&used) {
        return Err(vec![ImportError::new(
            line,
            format!(
                "expected {} or {} tab-separated columns, found {}",
                MIN_COLUMNS, MAX_COLUMNS, used
            ),
        )]);
    }

    let mut errors = Vec::new();

    let date = parse_date(cells[0])
        .map_err(|_| errors.push(ImportError::new(line, format!("invalid date '{}'", cells[0]))))
        .ok();

    let template = cells[1].to_string();
    if template.is_empty() {
        errors.push(ImportError::new(line, "template name is empty"));
    }

    let exercise = cells[2].to_string();
    if exercise.is_empty() {
        errors.push(ImportError::new(line, "exercise name is empty"));
    }

    let sets = parse_positive(cells[3])
        .map_err(|_| errors.push(ImportError::new(line, format!("invalid sets '{}'", cells[3]))))
        .ok();
    let reps = parse_positive(cells[4])
        .map_err(|_| errors.push(ImportError::new(line, format!("invalid reps '{}'", cells[4]))))
        .ok();

    let weight = match cells.get(5).copied().unwrap_or("") {
        "" => Some(None),
        value => parse_weight(value)
            .map_err(|_| errors.push(ImportError::new(line, format!("invalid weight '{}'", value))))
            .ok()
            .map(Some),
    };

    match (date, sets, reps, weight) {
        (Some(date), Some(sets), Some(reps), Some(weight)) if errors.is_empty() => Ok(TsvRow {
            line,
            date,
            template,
            exercise,
            sets,
            reps,
            weight,
        }),
        _ => Err(errors),
    }
}

fn parse_positive(value: &str) -> Result<i64, ()> {
    match value.parse::<i64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(()),
    }
}

fn parse_weight(value: &str) -> Result<f64, ()> {
    match value.parse::<f64>() {
        Ok(w) if w.is_finite() && w >= 0.0 => Ok(w),
        _ => Err(()),
    }
}

/// Group rows into plans, keeping first-seen order
///
/// Rejects an exercise listed twice for the same plan, and two different
/// templates on the same date (the calendar holds one plan per day).
pub fn group_rows(rows: Vec<TsvRow>) -> Result<Vec<PlanGroup>, Vec<ImportError>> {
    let mut groups: Vec<PlanGroup> = Vec::new();
    let mut errors = Vec::new();

    for row in rows {
        let existing = groups
            .iter()
            .position(|g| g.date == row.date && g.template.eq_ignore_ascii_case(&row.template));

        match existing {
            Some(index) => {
                let group = &mut groups[index];
                if group
                    .rows
                    .iter()
                    .any(|r| r.exercise.eq_ignore_ascii_case(&row.exercise))
                {
                    errors.push(ImportError::new(
                        row.line,
                        format!(
                            "exercise '{}' listed twice for {} on {}",
                            row.exercise, group.template, group.date
                        ),
                    ));
                } else {
                    group.rows.push(row);
                }
            }
            None => {
                if let Some(other) = groups.iter().find(|g| g.date == row.date) {
                    errors.push(ImportError::new(
                        row.line,
                        format!(
                            "{} already has template '{}' scheduled",
                            row.date, other.template
                        ),
                    ));
                    continue;
                }
                groups.push(PlanGroup {
                    date: row.date,
                    template: row.template.clone(),
                    rows: vec![row],
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(groups)
    } else {
        Err(errors)
    }
}

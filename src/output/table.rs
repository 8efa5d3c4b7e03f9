//! The tabular form of a shortlist shared by every renderer and writer

use crate::processing::candidate::{CandidateResult, ResultStatus};
use crate::processing::ranking::Shortlist;
use serde::Serialize;
use std::fmt;

pub const HEADERS: [&str; 7] = [
    "Name",
    "Email",
    "Phone",
    "Location",
    "Score",
    "Explanation",
    "Matched Keywords",
];

pub const SCORE_COLUMN: usize = 4;
pub const EXPLANATION_COLUMN: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(u8),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(text) => f.write_str(text),
            Cell::Number(n) => write!(f, "{}", n),
        }
    }
}

/// One ranked row plus the bookkeeping renderers show next to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub rank: usize,
    pub file_name: String,
    pub status: ResultStatus,
    pub cells: Vec<Cell>,
}

impl TableRow {
    fn from_result(rank: usize, result: &CandidateResult) -> Self {
        Self {
            rank,
            file_name: result.file_name.clone(),
            status: result.status,
            cells: vec![
                Cell::Text(result.name.clone()),
                Cell::Text(result.email.clone()),
                Cell::Text(result.phone.clone()),
                Cell::Text(result.location.clone()),
                Cell::Number(result.score),
                Cell::Text(result.explanation.clone()),
                Cell::Text(result.keywords_joined()),
            ],
        }
    }

    pub fn score(&self) -> u8 {
        match self.cells[SCORE_COLUMN] {
            Cell::Number(n) => n,
            Cell::Text(_) => 0,
        }
    }

    pub fn cell_text(&self, column: usize) -> String {
        self.cells.get(column).map(Cell::to_string).unwrap_or_default()
    }

    /// Name cell, or the file name when the name is unknown.
    pub fn label(&self) -> String {
        match self.cells.first() {
            Some(Cell::Text(name)) if !name.is_empty() => name.clone(),
            _ => self.file_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortlistTable {
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl ShortlistTable {
    pub fn from_shortlist(shortlist: &Shortlist<'_>) -> Self {
        let rows = shortlist
            .entries()
            .iter()
            .enumerate()
            .map(|(i, result)| TableRow::from_result(i + 1, result))
            .collect();

        Self {
            headers: HEADERS.iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows as display strings, the exact values written to spreadsheets.
    pub fn text_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.cells.iter().map(Cell::to_string).collect())
            .collect()
    }
}

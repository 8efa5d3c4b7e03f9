//! Spreadsheet export of the shortlist table

use crate::error::{Result, ScreenerError};
use crate::output::table::{Cell, ShortlistTable};
use log::info;
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;

pub const SHEET_NAME: &str = "Screening Results";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase());

        match extension.as_deref() {
            Some("xlsx") => Ok(ExportFormat::Xlsx),
            Some("csv") => Ok(ExportFormat::Csv),
            _ => Err(ScreenerError::ExportFailed(format!(
                "Export path must end in .xlsx or .csv: {}",
                path.display()
            ))),
        }
    }
}

/// Write the table to `path`, choosing the format from its extension.
pub fn export(table: &ShortlistTable, path: &Path) -> Result<ExportFormat> {
    let format = ExportFormat::from_path(path)?;
    let bytes = match format {
        ExportFormat::Xlsx => to_xlsx_bytes(table)?,
        ExportFormat::Csv => to_csv_bytes(table)?,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| ScreenerError::ExportFailed(format!("Cannot create {}: {}", parent.display(), e)))?;
    }
    std::fs::write(path, bytes)
        .map_err(|e| ScreenerError::ExportFailed(format!("Cannot write {}: {}", path.display(), e)))?;

    info!("Exported {} row(s) to {}", table.len(), path.display());
    Ok(format)
}

pub fn to_xlsx_bytes(table: &ShortlistTable) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    let bold = Format::new().set_bold();
    for (col, header) in table.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header, &bold)?;
    }

    for (i, row) in table.rows.iter().enumerate() {
        let row_index = (i + 1) as u32;
        for (col, cell) in row.cells.iter().enumerate() {
            match cell {
                Cell::Text(text) => worksheet.write_string(row_index, col as u16, text)?,
                Cell::Number(n) => worksheet.write_number(row_index, col as u16, f64::from(*n))?,
            };
        }
    }

    Ok(workbook.save_to_buffer()?)
}

pub fn to_csv_bytes(table: &ShortlistTable) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.headers)?;
    for row in table.text_rows() {
        writer.write_record(&row)?;
    }

    writer
        .into_inner()
        .map_err(|e| ScreenerError::ExportFailed(format!("Failed to finish CSV: {}", e)))
}

//! Output formatters for screening reports

use crate::config::OutputFormat;
use crate::error::{Result, ScreenerError};
use crate::output::report::ScreeningReport;
use crate::output::table::{ShortlistTable, TableRow, EXPLANATION_COLUMN, SCORE_COLUMN};
use crate::processing::candidate::ResultStatus;
use askama::Template;
use colored::{Color, Colorize};
use serde_json::{json, Map, Value};
use std::path::Path;

/// Trait for rendering a screening report
pub trait OutputFormatter {
    fn format_report(&self, report: &ScreeningReport) -> Result<String>;
}

/// Coloured terminal table, optionally followed by per-candidate detail
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

pub struct HtmlFormatter {
    include_styles: bool,
}

/// Report generator that coordinates different formatters
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
    html_formatter: HtmlFormatter,
}

const COLUMN_SEPARATOR: &str = " | ";

#[derive(Template)]
#[template(source = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Resume Screening Results</title>
    {% if include_styles %}
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            line-height: 1.5;
            color: #333;
            max-width: 1200px;
            margin: 0 auto;
            padding: 20px;
            background: #f8f9fa;
        }
        .container {
            background: white;
            padding: 30px;
            border-radius: 8px;
            box-shadow: 0 2px 10px rgba(0,0,0,0.1);
        }
        .header {
            text-align: center;
            margin-bottom: 20px;
            border-bottom: 3px solid #007acc;
            padding-bottom: 15px;
        }
        table { border-collapse: collapse; width: 100%; }
        th, td { padding: 8px 10px; border-bottom: 1px solid #e9ecef; text-align: left; vertical-align: top; }
        th { background: #007acc; color: white; }
        .score { font-weight: bold; text-align: center; border-radius: 12px; color: white; }
        .score-excellent { background: #28a745; }
        .score-good { background: #17a2b8; }
        .score-fair { background: #ffc107; color: #000; }
        .score-poor { background: #dc3545; }
        .failed td { color: #6c757d; font-style: italic; }
        .metadata {
            background: #e9ecef;
            padding: 15px;
            border-radius: 6px;
            margin-top: 30px;
            font-size: 0.9em;
            color: #6c757d;
        }
    </style>
    {% endif %}
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>Resume Screening Results</h1>
            <p>Generated: {{ generated_at }} | {{ summary_line }}</p>
            <p>Filter: {{ filter }}</p>
        </div>
        {% if rows.is_empty() %}
        <p>No candidates match the current filter.</p>
        {% else %}
        <table>
            <thead>
                <tr>
                    <th>#</th>
                    {% for header in headers %}<th>{{ header }}</th>{% endfor %}
                </tr>
            </thead>
            <tbody>
                {% for row in rows %}
                <tr class="{{ row.row_class }}">
                    <td>{{ row.rank }}</td>
                    {% for cell in row.cells %}
                    <td class="{{ cell.class }}">{{ cell.text }}</td>
                    {% endfor %}
                </tr>
                {% endfor %}
            </tbody>
        </table>
        {% endif %}
        <div class="metadata">
            <p><strong>Generated by Resume Screener v{{ version }}</strong></p>
            <p><strong>Model:</strong> {{ model }} | <strong>Job:</strong> {{ job_source }}</p>
        </div>
    </div>
</body>
</html>"#, ext = "html")]
struct HtmlTemplate {
    include_styles: bool,
    generated_at: String,
    summary_line: String,
    filter: String,
    headers: Vec<String>,
    rows: Vec<HtmlRow>,
    version: String,
    model: String,
    job_source: String,
}

struct HtmlRow {
    rank: usize,
    row_class: &'static str,
    cells: Vec<HtmlCell>,
}

struct HtmlCell {
    class: &'static str,
    text: String,
}

fn summary_line(report: &ScreeningReport) -> String {
    format!(
        "{} scored, {} failed, {} cancelled | {} of {} shortlisted",
        report.summary.scored,
        report.summary.failed,
        report.summary.cancelled,
        report.summary.shortlisted,
        report.summary.total
    )
}

/// Widest value per column, header included.
fn column_widths(table: &ShortlistTable) -> Vec<usize> {
    table
        .headers
        .iter()
        .enumerate()
        .map(|(column, header)| {
            table
                .rows
                .iter()
                .map(|row| row.cell_text(column).chars().count())
                .fold(header.chars().count(), usize::max)
        })
        .collect()
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let (prefix, color) = match level {
            1 => ("█", Color::Blue),
            2 => ("▓", Color::Green),
            _ => ("▒", Color::Yellow),
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn score_color(score: u8) -> Color {
        match score {
            80..=100 => Color::Green,
            60..=79 => Color::Yellow,
            40..=59 => Color::BrightYellow,
            _ => Color::Red,
        }
    }

    fn format_score(&self, row: &TableRow, width: usize) -> String {
        let text = format!("{:>width$}", row.score(), width = width);
        if row.status != ResultStatus::Scored {
            self.colorize(&text, Color::BrightBlack)
        } else if self.use_colors {
            text.color(Self::score_color(row.score())).bold().to_string()
        } else {
            text
        }
    }

    /// Every column in table order with its full value; only padding is added.
    fn format_row(&self, row: &TableRow, widths: &[usize]) -> String {
        let cells: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(column, &width)| {
                if column == SCORE_COLUMN {
                    self.format_score(row, width)
                } else {
                    format!("{:<width$}", row.cell_text(column), width = width)
                }
            })
            .collect();
        format!("{:>3}{}{}", row.rank, COLUMN_SEPARATOR, cells.join(COLUMN_SEPARATOR))
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &ScreeningReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("📊 RESUME SCREENING RESULTS", 1));
        output.push_str(&format!(
            "Generated: {} | Processing time: {}ms\n",
            report.generated_at_display(),
            report.metadata.processing_time_ms
        ));
        output.push_str(&format!("{}\n", summary_line(report)));
        output.push_str(&format!("Filter: {}\n", report.filter.describe()));

        output.push_str(&self.format_header("Ranked Shortlist", 2));
        if report.table.is_empty() {
            output.push_str(&format!(
                "{}\n",
                self.colorize("No candidates match the current filter.", Color::Yellow)
            ));
        } else {
            let widths = column_widths(&report.table);
            let headers: Vec<String> = report
                .table
                .headers
                .iter()
                .zip(&widths)
                .map(|(header, &width)| format!("{:<width$}", header, width = width))
                .collect();
            let heading = format!("{:>3}{}{}", "#", COLUMN_SEPARATOR, headers.join(COLUMN_SEPARATOR));
            output.push_str(&format!("{}\n", self.colorize(heading.trim_end(), Color::Cyan)));
            for row in &report.table.rows {
                output.push_str(&format!("{}\n", self.format_row(row, &widths)));
            }
        }

        if self.detailed && !report.table.is_empty() {
            output.push_str(&self.format_header("Candidate Details", 2));
            for row in &report.table.rows {
                let status = if row.status == ResultStatus::Scored {
                    String::new()
                } else {
                    format!(" [{}]", row.status)
                };
                output.push_str(&format!(
                    "{}. {} ({}){} - {}\n",
                    row.rank,
                    self.colorize(&row.label(), Color::White),
                    row.file_name,
                    self.colorize(&status, Color::Red),
                    row.score()
                ));
                output.push_str(&format!("   {}\n\n", row.cell_text(EXPLANATION_COLUMN)));
            }
        }

        output.push_str(&format!(
            "\n{} Generated by Resume Screener v{} | Model: {}\n",
            self.colorize("ℹ️", Color::Blue),
            report.metadata.screener_version,
            report.metadata.model
        ));

        Ok(output)
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Candidate objects keyed by the table headers, in rank order.
    fn candidates(report: &ScreeningReport) -> Vec<Value> {
        report
            .table
            .rows
            .iter()
            .map(|row| {
                let mut object = Map::new();
                object.insert("rank".to_string(), json!(row.rank));
                object.insert("file_name".to_string(), json!(row.file_name));
                object.insert("status".to_string(), json!(row.status));
                for (header, cell) in report.table.headers.iter().zip(&row.cells) {
                    object.insert(header.clone(), json!(cell));
                }
                Value::Object(object)
            })
            .collect()
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &ScreeningReport) -> Result<String> {
        let document = json!({
            "metadata": report.metadata,
            "summary": report.summary,
            "filter": report.filter,
            "candidates": Self::candidates(report),
        });

        if self.pretty {
            Ok(serde_json::to_string_pretty(&document)?)
        } else {
            Ok(serde_json::to_string(&document)?)
        }
    }
}

impl HtmlFormatter {
    pub fn new(include_styles: bool) -> Self {
        Self { include_styles }
    }

    fn create_template_data(&self, report: &ScreeningReport) -> HtmlTemplate {
        let rows = report
            .table
            .rows
            .iter()
            .map(|row| {
                let score_class = match row.score() {
                    80..=100 => "score score-excellent",
                    60..=79 => "score score-good",
                    40..=59 => "score score-fair",
                    _ => "score score-poor",
                };
                let cells = row
                    .cells
                    .iter()
                    .enumerate()
                    .map(|(column, cell)| HtmlCell {
                        class: if column == SCORE_COLUMN { score_class } else { "" },
                        text: cell.to_string(),
                    })
                    .collect();
                HtmlRow {
                    rank: row.rank,
                    row_class: if row.status == ResultStatus::Scored { "" } else { "failed" },
                    cells,
                }
            })
            .collect();

        HtmlTemplate {
            include_styles: self.include_styles,
            generated_at: report.generated_at_display(),
            summary_line: summary_line(report),
            filter: report.filter.describe(),
            headers: report.table.headers.clone(),
            rows,
            version: report.metadata.screener_version.clone(),
            model: report.metadata.model.clone(),
            job_source: report.metadata.job_source.clone(),
        }
    }
}

impl OutputFormatter for HtmlFormatter {
    fn format_report(&self, report: &ScreeningReport) -> Result<String> {
        self.create_template_data(report)
            .render()
            .map_err(|e| ScreenerError::OutputFormatting(e.to_string()))
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn escape_cell(text: &str) -> String {
        text.replace('|', "\\|").replace('\n', " ")
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &ScreeningReport) -> Result<String> {
        let mut output = String::new();

        output.push_str("# 📊 Resume Screening Results\n\n");

        if self.include_metadata {
            output.push_str(&format!(
                "**Generated:** {} | **Processing Time:** {}ms\n",
                report.generated_at_display(),
                report.metadata.processing_time_ms
            ));
            output.push_str(&format!(
                "**Model:** `{}` | **Job:** `{}`\n\n",
                report.metadata.model, report.metadata.job_source
            ));
        }

        output.push_str(&format!("**Summary:** {}\n\n", summary_line(report)));
        output.push_str(&format!("**Filter:** {}\n\n", report.filter.describe()));

        output.push_str("## Ranked Shortlist\n\n");
        if report.table.is_empty() {
            output.push_str("_No candidates match the current filter._\n\n");
        } else {
            output.push_str(&format!("| # | {} |\n", report.table.headers.join(" | ")));
            output.push_str(&format!("|---|{}\n", "---|".repeat(report.table.headers.len())));
            for row in &report.table.rows {
                let cells: Vec<String> = row.cells.iter().map(|c| Self::escape_cell(&c.to_string())).collect();
                output.push_str(&format!("| {} | {} |\n", row.rank, cells.join(" | ")));
            }
            output.push('\n');
        }

        let failures: Vec<&TableRow> = report
            .table
            .rows
            .iter()
            .filter(|row| row.status != ResultStatus::Scored)
            .collect();
        if !failures.is_empty() {
            output.push_str("## ⚠️ Not Scored\n\n");
            for row in failures {
                output.push_str(&format!("- `{}` ({}): {}\n", row.file_name, row.status, row.cell_text(EXPLANATION_COLUMN)));
            }
            output.push('\n');
        }

        if self.include_metadata {
            output.push_str("---\n\n");
            output.push_str(&format!(
                "*Generated by Resume Screener v{} using {}*\n",
                report.metadata.screener_version, report.metadata.model
            ));
        }

        Ok(output)
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(true, true),
            json_formatter: JsonFormatter::new(true),
            markdown_formatter: MarkdownFormatter::new(true),
            html_formatter: HtmlFormatter::new(true),
        }
    }

    pub fn with_options(use_colors: bool, detailed: bool, pretty_json: bool, include_metadata: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata),
            html_formatter: HtmlFormatter::new(true),
        }
    }

    pub fn generate_report(&self, report: &ScreeningReport, format: &OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
            OutputFormat::Markdown => self.markdown_formatter.format_report(report),
            OutputFormat::Html => self.html_formatter.format_report(report),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, content)?;
    Ok(())
}

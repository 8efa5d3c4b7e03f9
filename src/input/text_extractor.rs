//! Text extraction from various file formats

use crate::error::{Result, ScreenerError};
use docx_rs::{DocumentChild, ParagraphChild, RunChild, TableCellContent, TableChild, TableRowChild};
use pulldown_cmark::{Event, Parser, Tag};

pub trait TextExtractor {
    fn extract(&self, bytes: &[u8]) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Run a synchronous parser off the async runtime. A panic inside the
/// parser is reported as an extraction failure.
async fn run_blocking<F>(label: &'static str, job: F) -> Result<String>
where
    F: FnOnce() -> Result<String> + Send + 'static,
{
    tokio::task::spawn_blocking(job).await.map_err(|e| {
        ScreenerError::ExtractionFailed(format!("{} parser aborted: {}", label, e))
    })?
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    async fn extract(&self, bytes: &[u8]) -> Result<String> {
        let data = bytes.to_vec();
        run_blocking("PDF", move || {
            let pages = pdf_extract::extract_text_from_mem_by_pages(&data).map_err(|e| {
                ScreenerError::ExtractionFailed(format!("Failed to extract text from PDF: {}", e))
            })?;
            Ok(pages.join("\n"))
        })
        .await
    }
}

pub struct DocxExtractor;

impl DocxExtractor {
    fn extract_sync(data: &[u8]) -> Result<String> {
        let docx = docx_rs::read_docx(data).map_err(|e| {
            ScreenerError::ExtractionFailed(format!("Failed to parse DOCX: {}", e))
        })?;

        let mut lines: Vec<String> = Vec::new();

        for child in &docx.document.children {
            match child {
                DocumentChild::Paragraph(p) => lines.push(Self::paragraph_text(p)),
                DocumentChild::Table(t) => {
                    for row in &t.rows {
                        let TableChild::TableRow(r) = row;
                        let cells: Vec<String> = r
                            .cells
                            .iter()
                            .map(|cell| {
                                let TableRowChild::TableCell(c) = cell;
                                c.children
                                    .iter()
                                    .filter_map(|content| match content {
                                        TableCellContent::Paragraph(p) => Some(Self::paragraph_text(p)),
                                        _ => None,
                                    })
                                    .collect::<Vec<_>>()
                                    .join(" ")
                            })
                            .collect();
                        lines.push(cells.join(" | "));
                    }
                }
                _ => {}
            }
        }

        Ok(lines.join("\n"))
    }

    fn paragraph_text(p: &docx_rs::Paragraph) -> String {
        let mut text = String::new();

        for child in &p.children {
            match child {
                ParagraphChild::Run(r) => Self::push_run(&mut text, r),
                ParagraphChild::Hyperlink(h) => {
                    for child in &h.children {
                        if let ParagraphChild::Run(r) = child {
                            Self::push_run(&mut text, r);
                        }
                    }
                }
                _ => {}
            }
        }

        text
    }

    fn push_run(text: &mut String, run: &docx_rs::Run) {
        for run_child in &run.children {
            match run_child {
                RunChild::Text(t) => text.push_str(&t.text),
                RunChild::Tab(_) => text.push('\t'),
                RunChild::Break(_) => text.push('\n'),
                _ => {}
            }
        }
    }
}

impl TextExtractor for DocxExtractor {
    async fn extract(&self, bytes: &[u8]) -> Result<String> {
        let data = bytes.to_vec();
        run_blocking("DOCX", move || Self::extract_sync(&data)).await
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, bytes: &[u8]) -> Result<String> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF".as_slice()).unwrap_or(bytes);
        let content = std::str::from_utf8(bytes).map_err(|e| {
            ScreenerError::ExtractionFailed(format!("File is not valid UTF-8 text: {}", e))
        })?;
        Ok(content.to_string())
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    async fn extract(&self, bytes: &[u8]) -> Result<String> {
        let markdown_content = PlainTextExtractor.extract(bytes).await?;
        Ok(self.markdown_to_text(&markdown_content))
    }
}

impl MarkdownExtractor {
    fn markdown_to_text(&self, markdown: &str) -> String {
        let mut text = String::new();

        for event in Parser::new(markdown) {
            match event {
                Event::Text(t) | Event::Code(t) => text.push_str(&t),
                Event::SoftBreak => text.push(' '),
                Event::HardBreak => text.push('\n'),
                Event::Start(Tag::Item) => text.push_str("- "),
                Event::End(Tag::Paragraph)
                | Event::End(Tag::Heading(..))
                | Event::End(Tag::Item)
                | Event::End(Tag::CodeBlock(_)) => text.push('\n'),
                _ => {}
            }
        }

        text
    }
}

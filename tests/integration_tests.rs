//! Integration tests for the resume screener

use calamine::{open_workbook, Data, Reader, Xlsx};
use resume_screener::config::InputConfig;
use resume_screener::error::{ScoringError, ScreenerError};
use resume_screener::input::InputManager;
use resume_screener::llm::prompts::ScoringRequest;
use resume_screener::llm::{Assessment, ScoringService};
use resume_screener::output::export::{to_csv_bytes, SHEET_NAME};
use resume_screener::output::{export, ShortlistTable};
use resume_screener::processing::document::{JobDescription, ResumeDocument};
use resume_screener::processing::{
    ResultStatus, Screener, ScreeningContext, ScreeningOptions, ScreeningRun, ShortlistFilter,
};
use resume_screener::processing::pipeline::NoProgress;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;

const KEYWORDS: &[&str] = &["Rust", "tokio", "PostgreSQL", "Kafka", "Kubernetes"];
const PNG_HEADER: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13, b'I', b'H', b'D', b'R'];

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

/// Scores by counting job keywords in the resume section of the prompt.
struct KeywordScorer {
    calls: AtomicUsize,
}

impl KeywordScorer {
    fn new() -> Self {
        Self { calls: AtomicUsize::new(0) }
    }
}

impl ScoringService for KeywordScorer {
    async fn score(&self, request: &ScoringRequest) -> Result<Assessment, ScoringError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(image) = &request.image {
            return Ok(Assessment {
                name: "Scanned Candidate".to_string(),
                email: String::new(),
                phone: String::new(),
                location: "New Delhi".to_string(),
                score: 55,
                explanation: format!("Read from a {} image.", image.mime_type),
                matched_keywords: vec!["Rust".to_string()],
            });
        }

        let resume = request
            .prompt
            .split("<RESUME>")
            .nth(1)
            .and_then(|rest| rest.split("</RESUME>").next())
            .ok_or_else(|| ScoringError::Malformed("prompt has no resume section".to_string()))?;

        let matched: Vec<String> = KEYWORDS
            .iter()
            .filter(|k| resume.contains(*k))
            .map(|k| k.to_string())
            .collect();
        let name = resume.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim().to_string();
        let location = if resume.contains("Pune") { "Pune, Maharashtra" } else { "Delhi" };

        Ok(Assessment {
            name,
            email: String::new(),
            phone: String::new(),
            location: location.to_string(),
            score: (matched.len() * 20) as u8,
            explanation: format!("Matches {} of {} required skills.", matched.len(), KEYWORDS.len()),
            matched_keywords: matched,
        })
    }

    fn model_name(&self) -> &str {
        "keyword-fake"
    }
}

fn options() -> ScreeningOptions {
    ScreeningOptions {
        request_timeout: Duration::from_secs(5),
        max_attempts: 2,
        retry_backoff: Duration::from_millis(1),
    }
}

fn sample_pdf(lines: &[&str]) -> Vec<u8> {
    use printpdf::{BuiltinFont, Mm, PdfDocument};

    let (doc, page, layer) = PdfDocument::new("Resume", Mm(210.0), Mm(297.0), "Layer 1");
    let font = doc.add_builtin_font(BuiltinFont::Helvetica).unwrap();
    let layer = doc.get_page(page).get_layer(layer);
    for (i, line) in lines.iter().enumerate() {
        layer.use_text(*line, 12.0, Mm(20.0), Mm(270.0 - 10.0 * i as f32), &font);
    }
    doc.save_to_bytes().unwrap()
}

fn sample_docx(paragraphs: &[&str]) -> Vec<u8> {
    use docx_rs::{Docx, Paragraph, Run};

    let mut docx = Docx::new();
    for text in paragraphs {
        docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*text)));
    }
    let mut buffer = std::io::Cursor::new(Vec::new());
    docx.build().pack(&mut buffer).unwrap();
    buffer.into_inner()
}

async fn job() -> JobDescription {
    InputManager::default()
        .read_job_description(&fixture("job_description.txt"))
        .await
        .unwrap()
}

fn uploads() -> Vec<ResumeDocument> {
    vec![
        ResumeDocument::new("john.txt", std::fs::read(fixture("sample_resume.txt")).unwrap()),
        ResumeDocument::new(
            "asha.pdf",
            sample_pdf(&["Asha Rao", "Backend developer in Delhi", "Rust and tokio since 2019"]),
        ),
        ResumeDocument::new("broken.pdf", b"%PDF-1.4 truncated garbage".to_vec()),
        ResumeDocument::new("ravi.docx", sample_docx(&["Ravi Kumar", "Pune", "Java and Kafka"])),
        ResumeDocument::new("scan.png", PNG_HEADER.to_vec()),
        ResumeDocument::new("notes.odt", b"unsupported".to_vec()),
    ]
}

async fn run_screening() -> ScreeningRun {
    let screener = Screener::new(KeywordScorer::new(), InputManager::default(), options());
    screener
        .screen(&ScreeningContext::new(job().await), &uploads(), &NoProgress)
        .await
}

#[tokio::test]
async fn test_text_extraction_from_txt() {
    let manager = InputManager::default();
    let document = manager.load_document(&fixture("sample_resume.txt")).await.unwrap();

    let extracted = manager.extract(&document).await.unwrap();
    let text = extracted.as_text().unwrap();
    assert!(text.contains("John Doe"));
    assert!(text.contains("Senior Software Engineer"));
    assert!(text.contains("tokio"));
}

#[tokio::test]
async fn test_text_extraction_from_markdown() {
    let manager = InputManager::default();
    let document = manager.load_document(&fixture("sample_resume.md")).await.unwrap();

    let extracted = manager.extract(&document).await.unwrap();
    let text = extracted.as_text().unwrap();
    assert!(text.contains("John Doe"));
    assert!(text.contains("PostgreSQL"));
    assert!(!text.contains("**"));
    assert!(!text.contains("##"));
}

#[tokio::test]
async fn test_well_formed_pdf_and_docx() {
    let manager = InputManager::default();

    let pdf = ResumeDocument::new("asha.pdf", sample_pdf(&["Asha Rao", "Rust developer"]));
    let text = manager.extract(&pdf).await.unwrap();
    assert!(text.as_text().unwrap().contains("Asha"));

    let docx = ResumeDocument::new("ravi.docx", sample_docx(&["Ravi Kumar", "Kafka engineer"]));
    let text = manager.extract(&docx).await.unwrap();
    assert_eq!(text.as_text(), Some("Ravi Kumar\nKafka engineer"));
}

#[tokio::test]
async fn test_corrupted_documents_fail_cleanly() {
    let manager = InputManager::default();

    let mut pdf = sample_pdf(&["Asha Rao"]);
    pdf.truncate(pdf.len() / 3);
    let result = manager.extract(&ResumeDocument::new("cut.pdf", pdf)).await;
    assert!(matches!(result, Err(ScreenerError::ExtractionFailed(_))));

    let mut docx = sample_docx(&["Ravi Kumar"]);
    docx.truncate(docx.len() / 2);
    let result = manager.extract(&ResumeDocument::new("cut.docx", docx)).await;
    assert!(matches!(result, Err(ScreenerError::ExtractionFailed(_))));

    let result = manager.extract(&ResumeDocument::new("bad.txt", vec![0xC3, 0x28, 0xFF])).await;
    assert!(matches!(result, Err(ScreenerError::ExtractionFailed(_))));
}

#[tokio::test]
async fn test_every_upload_gets_one_result() {
    let run = run_screening().await;
    let uploads = uploads();

    assert_eq!(run.results.len(), uploads.len());
    let files: Vec<&str> = run.results.iter().map(|r| r.file_name.as_str()).collect();
    let expected: Vec<&str> = uploads.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(files, expected);

    let statuses: Vec<ResultStatus> = run.results.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![
            ResultStatus::Scored,
            ResultStatus::Scored,
            ResultStatus::ExtractionFailed,
            ResultStatus::Scored,
            ResultStatus::Scored,
            ResultStatus::ExtractionFailed,
        ]
    );
    assert_eq!(run.counts.to_string(), "4 scored, 2 failed, 0 cancelled");

    let broken = run.results.iter().find(|r| r.file_name == "broken.pdf").unwrap();
    assert_eq!(broken.score, 0);
    assert!(broken.explanation.contains("broken.pdf"));
}

#[tokio::test]
async fn test_ranking_and_filtering() {
    let run = run_screening().await;

    let all = run.results.view(&ShortlistFilter::default());
    let scores: Vec<u8> = all.entries().iter().map(|r| r.score).collect();
    let mut sorted = scores.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(scores, sorted);
    assert_eq!(all.entries()[0].file_name, "john.txt");
    assert_eq!(all.entries()[0].score, 100);

    let pune = run.results.view(&ShortlistFilter::new(Some("pune".to_string()), Some(30)));
    let files: Vec<&str> = pune.entries().iter().map(|r| r.file_name.as_str()).collect();
    assert_eq!(files, vec!["john.txt"]);

    let delhi = run.results.view(&ShortlistFilter::new(Some("Delhi".to_string()), None));
    let files: Vec<&str> = delhi.entries().iter().map(|r| r.file_name.as_str()).collect();
    assert_eq!(files, vec!["scan.png", "asha.pdf"]);
}

#[tokio::test]
async fn test_export_matches_display() {
    let run = run_screening().await;
    let shortlist = run.results.view(&ShortlistFilter::new(None, Some(40)));
    let table = ShortlistTable::from_shortlist(&shortlist);
    let temp_dir = TempDir::new().unwrap();

    let csv_path = temp_dir.path().join("shortlist.csv");
    export(&table, &csv_path).unwrap();
    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, table.headers);
    let rows: Vec<Vec<String>> = reader
        .records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect();
    assert_eq!(rows, table.text_rows());

    let xlsx_path = temp_dir.path().join("shortlist.xlsx");
    export(&table, &xlsx_path).unwrap();
    let mut workbook: Xlsx<_> = open_workbook(&xlsx_path).unwrap();
    let range = workbook.worksheet_range(SHEET_NAME).unwrap();
    let sheet: Vec<&[Data]> = range.rows().collect();

    assert_eq!(sheet.len(), table.len() + 1);
    for (row, expected) in sheet[1..].iter().zip(&table.rows) {
        assert_eq!(row[0], Data::String(expected.cell_text(0)));
        assert_eq!(row[4], Data::Float(f64::from(expected.score())));
        assert_eq!(row[6], Data::String(expected.cell_text(6)));
    }
}

#[tokio::test]
async fn test_runs_are_idempotent() {
    let first = run_screening().await;
    let second = run_screening().await;
    assert_eq!(first, second);

    let filter = ShortlistFilter::default();
    let first_table = ShortlistTable::from_shortlist(&first.results.view(&filter));
    let second_table = ShortlistTable::from_shortlist(&second.results.view(&filter));
    assert_eq!(to_csv_bytes(&first_table).unwrap(), to_csv_bytes(&second_table).unwrap());

    let temp_dir = TempDir::new().unwrap();
    let mut sheets = Vec::new();
    for (i, table) in [first_table, second_table].iter().enumerate() {
        let path = temp_dir.path().join(format!("run{}.xlsx", i));
        export(table, &path).unwrap();
        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        let range = workbook.worksheet_range(SHEET_NAME).unwrap();
        sheets.push(range.rows().map(|r| r.to_vec()).collect::<Vec<_>>());
    }
    assert_eq!(sheets[0], sheets[1]);
}

#[tokio::test]
async fn test_input_errors() {
    let manager = InputManager::new(InputConfig {
        max_files: 2,
        ..InputConfig::default()
    });

    assert!(manager.load_document(&fixture("missing.pdf")).await.is_err());
    assert!(manager
        .load_documents(&[fixture("sample_resume.txt"), fixture("sample_resume.md"), fixture("job_description.txt")])
        .await
        .is_err());
    assert!(manager.read_job_description(&fixture("missing_job.txt")).await.is_err());
    assert!(JobDescription::new("   ").is_err());
}

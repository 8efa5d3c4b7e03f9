//! Input manager for loading uploads and routing them to extractors

use crate::config::InputConfig;
use crate::error::{Result, ScreenerError};
use crate::input::file_detector::{FileType, ImageFormat, RESUME_EXTENSIONS};
use crate::input::text_extractor::{
    DocxExtractor, MarkdownExtractor, PdfExtractor, PlainTextExtractor, TextExtractor,
};
use crate::processing::document::{ExtractedResume, JobDescription, ResumeDocument};
use crate::processing::text_processor::TextProcessor;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use tokio::fs;

pub struct InputManager {
    processor: TextProcessor,
    limits: InputConfig,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new(InputConfig::default())
    }
}

impl InputManager {
    pub fn new(limits: InputConfig) -> Self {
        Self {
            processor: TextProcessor::new(),
            limits,
        }
    }

    /// Read resume files from disk, in the order given.
    ///
    /// Missing files and too many files are input errors for the whole run;
    /// problems with a file's contents are left to `extract`.
    pub async fn load_documents(&self, paths: &[PathBuf]) -> Result<Vec<ResumeDocument>> {
        if paths.is_empty() {
            return Err(ScreenerError::InvalidInput(
                "Upload at least one resume".to_string(),
            ));
        }
        if paths.len() > self.limits.max_files {
            return Err(ScreenerError::InvalidInput(format!(
                "{} resumes given, the limit is {}",
                paths.len(),
                self.limits.max_files
            )));
        }

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            documents.push(self.load_document(path).await?);
        }
        Ok(documents)
    }

    pub async fn load_document(&self, path: &Path) -> Result<ResumeDocument> {
        if !path.is_file() {
            return Err(ScreenerError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let bytes = fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        debug!("Loaded {} ({} bytes)", name, bytes.len());
        Ok(ResumeDocument::with_type(name, FileType::from_path(path), bytes))
    }

    /// List resume files directly inside `dir`, sorted by file name.
    pub async fn discover(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = fs::read_dir(dir).await.map_err(|e| {
            ScreenerError::InvalidInput(format!("Cannot read directory {}: {}", dir.display(), e))
        })?;

        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let supported = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| RESUME_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                .unwrap_or(false);
            if path.is_file() && supported {
                paths.push(path);
            }
        }

        paths.sort();
        info!("Found {} resume file(s) in {}", paths.len(), dir.display());
        Ok(paths)
    }

    /// Turn one uploaded document into what the AI service receives.
    pub async fn extract(&self, document: &ResumeDocument) -> Result<ExtractedResume> {
        if document.bytes.is_empty() {
            return Err(ScreenerError::ExtractionFailed(format!(
                "{} is empty",
                document.name
            )));
        }
        if document.size() as u64 > self.limits.max_file_bytes() {
            return Err(ScreenerError::ExtractionFailed(format!(
                "{} is {} bytes, the limit is {} MB",
                document.name,
                document.size(),
                self.limits.max_file_size_mb
            )));
        }

        if let FileType::Image(declared) = document.file_type {
            return self.check_image(document, declared);
        }

        let text = self.extract_text(document.file_type, &document.bytes, &document.name).await?;
        let (text, truncated) = self.processor.truncate(&text, self.limits.max_resume_chars);
        if truncated {
            warn!(
                "{}: resume text cut to {} characters",
                document.name, self.limits.max_resume_chars
            );
        }

        Ok(ExtractedResume::Text(text))
    }

    /// Read a job description from a TXT, MD, PDF or DOCX file.
    pub async fn read_job_description(&self, path: &Path) -> Result<JobDescription> {
        let bytes = fs::read(path).await.map_err(|e| {
            ScreenerError::InvalidInput(format!("Cannot read job description {}: {}", path.display(), e))
        })?;
        let file_type = FileType::from_path(path);
        if matches!(file_type, FileType::Image(_)) {
            return Err(ScreenerError::UnsupportedFormat(format!(
                "Job description must be a text document: {}",
                path.display()
            )));
        }

        let text = self
            .extract_text(file_type, &bytes, &path.display().to_string())
            .await?;
        JobDescription::new(text)
    }

    async fn extract_text(&self, file_type: FileType, bytes: &[u8], name: &str) -> Result<String> {
        let raw = match file_type {
            FileType::Pdf => {
                info!("Extracting text from PDF: {}", name);
                PdfExtractor.extract(bytes).await?
            }
            FileType::Docx => {
                info!("Extracting text from DOCX: {}", name);
                DocxExtractor.extract(bytes).await?
            }
            FileType::Text => {
                info!("Reading plain text file: {}", name);
                PlainTextExtractor.extract(bytes).await?
            }
            FileType::Markdown => {
                info!("Processing markdown file: {}", name);
                MarkdownExtractor.extract(bytes).await?
            }
            FileType::Image(_) | FileType::Unknown => {
                return Err(ScreenerError::UnsupportedFormat(format!(
                    "Unsupported file type for: {}",
                    name
                )));
            }
        };

        let text = self.processor.normalize(&raw);
        if text.is_empty() {
            return Err(ScreenerError::ExtractionFailed(format!(
                "No text could be extracted from {}",
                name
            )));
        }

        debug!("{}: {} characters after normalization", name, text.chars().count());
        Ok(text)
    }

    fn check_image(&self, document: &ResumeDocument, declared: ImageFormat) -> Result<ExtractedResume> {
        match ImageFormat::sniff(&document.bytes) {
            Some(actual) if actual == declared => {
                info!("Forwarding image resume to the AI service: {}", document.name);
                Ok(ExtractedResume::Image {
                    format: actual,
                    data: document.bytes.clone(),
                })
            }
            Some(actual) => Err(ScreenerError::ExtractionFailed(format!(
                "{} is named as {} but contains {}",
                document.name,
                declared.mime_type(),
                actual.mime_type()
            ))),
            None => Err(ScreenerError::ExtractionFailed(format!(
                "{} is not a readable image",
                document.name
            ))),
        }
    }
}

//! Document structures flowing through a screening run

use crate::error::{Result, ScreenerError};
use crate::input::file_detector::{FileType, ImageFormat};
use std::fmt;

/// The role requirements every resume is scored against.
#[derive(Debug, Clone, PartialEq)]
pub struct JobDescription {
    text: String,
}

impl JobDescription {
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ScreenerError::InvalidInput(
                "Job description must not be empty".to_string(),
            ));
        }
        Ok(Self { text: text.trim().to_string() })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// An uploaded resume file. Owns its raw bytes until extraction.
#[derive(Clone, PartialEq)]
pub struct ResumeDocument {
    pub name: String,
    pub file_type: FileType,
    pub bytes: Vec<u8>,
}

impl ResumeDocument {
    /// Create a document, detecting the format from the file name.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let file_type = FileType::from_path(std::path::Path::new(&name));
        Self { name, file_type, bytes }
    }

    pub fn with_type(name: impl Into<String>, file_type: FileType, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            file_type,
            bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

impl fmt::Debug for ResumeDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResumeDocument")
            .field("name", &self.name)
            .field("file_type", &self.file_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// What the AI service receives for one resume.
#[derive(Clone, PartialEq)]
pub enum ExtractedResume {
    Text(String),
    /// Image resumes are sent as-is to the service's multimodal input.
    Image { format: ImageFormat, data: Vec<u8> },
}

impl ExtractedResume {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ExtractedResume::Text(text) => Some(text),
            ExtractedResume::Image { .. } => None,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, ExtractedResume::Image { .. })
    }
}

impl fmt::Debug for ExtractedResume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractedResume::Text(text) => f
                .debug_tuple("Text")
                .field(&format!("{} chars", text.chars().count()))
                .finish(),
            ExtractedResume::Image { format, data } => f
                .debug_struct("Image")
                .field("format", format)
                .field("size", &data.len())
                .finish(),
        }
    }
}

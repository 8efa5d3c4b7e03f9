//! Prompt construction for resume scoring requests

use crate::input::file_detector::ImageFormat;
use crate::processing::document::{ExtractedResume, JobDescription};
use serde_json::{json, Value};

/// Fields the AI service must return, in display order.
pub const RESPONSE_FIELDS: &[&str] = &[
    "name",
    "email",
    "phone",
    "location",
    "score",
    "explanation",
    "matched_keywords",
];

/// One fully-built request for the scoring service.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringRequest {
    pub resume_name: String,
    pub prompt: String,
    pub image: Option<InlineImage>,
    pub response_schema: Value,
}

#[derive(Clone, PartialEq)]
pub struct InlineImage {
    pub mime_type: &'static str,
    pub data: Vec<u8>,
}

impl std::fmt::Debug for InlineImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InlineImage")
            .field("mime_type", &self.mime_type)
            .field("size", &self.data.len())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct PromptTemplates {
    pub screening: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            screening: SCREENING_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplates {
    /// Build the request for one resume.
    pub fn build_request(
        &self,
        resume_name: &str,
        job: &JobDescription,
        resume: &ExtractedResume,
    ) -> ScoringRequest {
        let (resume_section, image) = match resume {
            ExtractedResume::Text(text) => (text.as_str(), None),
            ExtractedResume::Image { format, data } => (IMAGE_PLACEHOLDER, Some(inline_image(*format, data))),
        };

        let prompt = fill_placeholders(
            &self.screening,
            &[("{job}", job.as_str()), ("{resume}", resume_section)],
        );

        ScoringRequest {
            resume_name: resume_name.to_string(),
            prompt,
            image,
            response_schema: response_schema(),
        }
    }
}

fn inline_image(format: ImageFormat, data: &[u8]) -> InlineImage {
    InlineImage {
        mime_type: format.mime_type(),
        data: data.to_vec(),
    }
}

/// JSON schema sent alongside the prompt so the service answers in a
/// fixed shape.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "name": { "type": "STRING" },
            "email": { "type": "STRING" },
            "phone": { "type": "STRING" },
            "location": { "type": "STRING" },
            "score": { "type": "INTEGER" },
            "explanation": { "type": "STRING" },
            "matched_keywords": {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            }
        },
        "required": RESPONSE_FIELDS,
        "propertyOrdering": RESPONSE_FIELDS,
    })
}

/// Substitute placeholders in a single left-to-right pass, so inserted
/// text is never scanned for further placeholders.
fn fill_placeholders(template: &str, values: &[(&str, &str)]) -> String {
    let mut output = String::with_capacity(template.len() + values.iter().map(|(_, v)| v.len()).sum::<usize>());
    let mut rest = template;

    loop {
        let next = values
            .iter()
            .filter_map(|(key, value)| rest.find(key).map(|idx| (idx, *key, *value)))
            .min_by_key(|(idx, _, _)| *idx);

        match next {
            Some((idx, key, value)) => {
                output.push_str(&rest[..idx]);
                output.push_str(value);
                rest = &rest[idx + key.len()..];
            }
            None => {
                output.push_str(rest);
                return output;
            }
        }
    }
}

const IMAGE_PLACEHOLDER: &str = "(The resume is the attached image. Read all of its text before answering.)";

const SCREENING_TEMPLATE: &str = r#"You are an expert HR professional and data extraction specialist.
Analyze the resume below against the job description.

<JOB DESCRIPTION>
{job}
</JOB DESCRIPTION>

<RESUME>
{resume}
</RESUME>

Respond with a single JSON object containing exactly these fields:
- "name": the candidate's full name, or "" if not found.
- "email": the candidate's email address, or "" if not found.
- "phone": the candidate's phone number, or "" if not found.
- "location": the candidate's location (city and state or country), or "" if not found.
- "score": an integer from 0 to 100 rating how relevant the resume is to the job description.
- "explanation": one or two sentences justifying the score.
- "matched_keywords": the top 3-5 keywords from the job description that appear in the resume.

Do not add any other fields."#;

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> JobDescription {
        JobDescription::new("Senior Rust engineer with tokio and PostgreSQL").unwrap()
    }

    #[test]
    fn test_text_request_contains_both_documents() {
        let templates = PromptTemplates::default();
        let resume = ExtractedResume::Text("Jane Doe, Rust developer in Pune".to_string());

        let request = templates.build_request("jane.pdf", &job(), &resume);

        assert_eq!(request.resume_name, "jane.pdf");
        assert!(request.prompt.contains("Senior Rust engineer with tokio and PostgreSQL"));
        assert!(request.prompt.contains("Jane Doe, Rust developer in Pune"));
        assert!(request.prompt.contains("<RESUME>"));
        assert!(request.prompt.contains("</JOB DESCRIPTION>"));
        assert!(request.image.is_none());
    }

    #[test]
    fn test_every_field_is_requested() {
        let templates = PromptTemplates::default();
        let request = templates.build_request("a.txt", &job(), &ExtractedResume::Text("x".to_string()));

        for field in RESPONSE_FIELDS {
            assert!(request.prompt.contains(&format!("\"{}\"", field)), "prompt misses {}", field);
            assert!(request.response_schema["properties"].get(*field).is_some());
        }
        assert_eq!(request.response_schema["required"].as_array().unwrap().len(), RESPONSE_FIELDS.len());
    }

    #[test]
    fn test_image_request() {
        let templates = PromptTemplates::default();
        let resume = ExtractedResume::Image {
            format: ImageFormat::Jpeg,
            data: vec![0xFF, 0xD8, 0xFF],
        };

        let request = templates.build_request("scan.jpg", &job(), &resume);
        let image = request.image.unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.data, vec![0xFF, 0xD8, 0xFF]);
        assert!(request.prompt.contains("attached image"));
    }

    #[test]
    fn test_placeholders_in_inputs_are_not_expanded() {
        let job = JobDescription::new("Mention {resume} literally").unwrap();
        let templates = PromptTemplates::default();
        let request = templates.build_request("a.txt", &job, &ExtractedResume::Text("RESUME BODY".to_string()));

        assert!(request.prompt.contains("Mention {resume} literally"));
        assert_eq!(request.prompt.matches("RESUME BODY").count(), 1);
    }
}

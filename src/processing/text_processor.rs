//! Text normalization for extracted resume text

use regex::Regex;

pub struct TextProcessor {
    inline_space_regex: Regex,
    blank_lines_regex: Regex,
}

impl Default for TextProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextProcessor {
    pub fn new() -> Self {
        let inline_space_regex = Regex::new(r"[ \t\u{00A0}\u{2000}-\u{200B}\u{3000}]+")
            .expect("Invalid inline space regex");

        let blank_lines_regex = Regex::new(r"\n{3,}")
            .expect("Invalid blank line regex");

        Self {
            inline_space_regex,
            blank_lines_regex,
        }
    }

    /// Normalize extracted text: unify line endings, drop control
    /// characters, collapse runs of spaces and blank lines, trim.
    pub fn normalize(&self, text: &str) -> String {
        let unified = text.replace("\r\n", "\n").replace('\r', "\n");

        let without_controls: String = unified
            .chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
            .collect();

        let collapsed = self.inline_space_regex.replace_all(&without_controls, " ");

        let lines: Vec<&str> = collapsed.lines().map(str::trim).collect();
        let joined = lines.join("\n");

        self.blank_lines_regex
            .replace_all(&joined, "\n\n")
            .trim()
            .to_string()
    }

    /// Cut `text` to at most `max_chars` characters, preferring the last
    /// whitespace boundary. Returns the text and whether it was cut.
    pub fn truncate(&self, text: &str, max_chars: usize) -> (String, bool) {
        if text.chars().count() <= max_chars {
            return (text.to_string(), false);
        }

        let byte_end = text
            .char_indices()
            .nth(max_chars)
            .map(|(idx, _)| idx)
            .unwrap_or(text.len());
        let truncated = &text[..byte_end];

        let at_boundary = text[byte_end..].starts_with(char::is_whitespace);
        let cut = match truncated.rfind(char::is_whitespace) {
            _ if at_boundary => truncated,
            Some(idx) if idx > 0 => &truncated[..idx],
            _ => truncated,
        };

        (cut.trim_end().to_string(), true)
    }
}

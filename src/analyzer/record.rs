use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Identity of the extracted file. `error` is set only when parsing failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub path: String,
    pub hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A function, class or method with its 1-indexed inclusive line range and
/// the verbatim lines it spans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: Option<String>,
    pub qualified_name: String,
    /// Enclosing class of a method.
    #[serde(rename = "class", default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub params: Vec<String>,
    pub start_line: usize,
    pub end_line: usize,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub file: FileDescriptor,
    pub imports: Vec<String>,
    pub functions: Vec<Declaration>,
    pub classes: Vec<Declaration>,
    pub methods: Vec<Declaration>,
    pub source: String,
}

impl ExtractionResult {
    /// Result for a file that did not parse: empty catalogues, source kept.
    pub fn failed(path: &str, hash: String, source: &str, error: String) -> Self {
        Self {
            file: FileDescriptor {
                path: path.to_string(),
                hash,
                error: Some(error),
            },
            imports: Vec::new(),
            functions: Vec::new(),
            classes: Vec::new(),
            methods: Vec::new(),
            source: source.to_string(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.file.error.is_none()
    }
}

/// SHA-256 of the file content, hex encoded.
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// The source split on `\n`. Carriage returns stay attached to their line.
#[derive(Debug, Clone)]
pub struct LineTable<'a> {
    lines: Vec<&'a str>,
}

impl<'a> LineTable<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            lines: source.split('\n').collect(),
        }
    }

    /// Lines `start..=end` (1-indexed) rejoined with `\n`, clipped to the
    /// table. A range entirely past the last line yields an empty string.
    pub fn slice(&self, start: usize, end: usize) -> String {
        let lo = start.saturating_sub(1).min(self.lines.len());
        let hi = end.min(self.lines.len()).max(lo);
        self.lines[lo..hi].join("\n")
    }
}

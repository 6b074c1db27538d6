//! Client-supplied payloads bound for an upstream endpoint.

/// The content being analyzed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Binary upload with its original file name and MIME type.
    File {
        file_name: String,
        content_type: Option<String>,
        bytes: Vec<u8>,
    },
    /// Raw UTF-8 text.
    Text(String),
}

impl Payload {
    pub fn file(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Payload::File {
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Payload::Text(text.into())
    }

    /// Attach a MIME type. No-op for text payloads.
    pub fn with_content_type(mut self, mime: impl Into<String>) -> Self {
        if let Payload::File { content_type, .. } = &mut self {
            *content_type = Some(mime.into());
        }
        self
    }

    /// Size of the payload in bytes.
    pub fn len(&self) -> usize {
        match self {
            Payload::File { bytes, .. } => bytes.len(),
            Payload::Text(text) => text.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Payload kind for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::File { .. } => "file",
            Payload::Text(_) => "text",
        }
    }
}

/// One analysis request: the payload plus optional metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub payload: Payload,
    /// Declared source language, for code analysis. Logged only; the
    /// upstream contract has no field for it.
    pub language: Option<String>,
}

impl Submission {
    pub fn new(payload: Payload) -> Self {
        Self {
            payload,
            language: None,
        }
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

impl From<Payload> for Submission {
    fn from(payload: Payload) -> Self {
        Submission::new(payload)
    }
}

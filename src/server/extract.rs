//! Request body extraction.
//!
//! The frontend posts multipart forms; older clients send urlencoded forms or
//! JSON. [`FormInput`] accepts all three and collects the fields the
//! endpoints understand (`file`, `text`, `language`). Validation of which
//! fields are required happens in the handlers.

use async_trait::async_trait;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::{Form, Json};
use serde::Deserialize;
use serde_json::Value;

use super::response::ApiError;
use crate::types::Payload;

/// An uploaded file part.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn into_payload(self) -> Payload {
        Payload::File {
            file_name: self.file_name,
            content_type: self.content_type,
            bytes: self.bytes,
        }
    }
}

/// Fields collected from a request body.
#[derive(Debug, Clone, Default)]
pub struct FormInput {
    pub file: Option<UploadedFile>,
    pub text: Option<String>,
    pub language: Option<String>,
}

#[derive(Deserialize)]
struct TextFields {
    text: Option<String>,
    language: Option<String>,
}

impl FormInput {
    async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut input = FormInput::default();
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    let file_name = field.file_name().unwrap_or("upload").to_string();
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await.map_err(multipart_error)?;
                    input.file = Some(UploadedFile {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
                "text" => input.text = Some(field.text().await.map_err(multipart_error)?),
                "language" => input.language = Some(field.text().await.map_err(multipart_error)?),
                _ => {}
            }
        }
        Ok(input)
    }

    fn from_json(body: Value) -> Self {
        let string_field = |key: &str| body.get(key).and_then(Value::as_str).map(str::to_string);
        FormInput {
            file: None,
            text: string_field("text"),
            language: string_field("language"),
        }
    }

    /// Non-blank `text`, if any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// Non-blank `language`, trimmed.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref().map(str::trim).filter(|l| !l.is_empty())
    }
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::rejection(err.status(), err.body_text())
}

#[async_trait]
impl<S> FromRequest<S> for FormInput
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::rejection(e.status(), e.body_text()))?;
            Self::from_multipart(multipart).await
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(fields) = Form::<TextFields>::from_request(req, state)
                .await
                .map_err(|e| ApiError::rejection(e.status(), e.body_text()))?;
            Ok(FormInput {
                file: None,
                text: fields.text,
                language: fields.language,
            })
        } else if content_type.starts_with("application/json") {
            let Json(body) = Json::<Value>::from_request(req, state)
                .await
                .map_err(|e| ApiError::rejection(e.status(), e.body_text()))?;
            Ok(Self::from_json(body))
        } else {
            Ok(FormInput::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_ignores_non_string_fields() {
        let input = FormInput::from_json(json!({"text": 42, "language": "Rust"}));
        assert!(input.text.is_none());
        assert_eq!(input.language(), Some("Rust"));
    }

    #[test]
    fn blank_values_read_as_missing() {
        let input = FormInput {
            file: None,
            text: Some(" \n\t".to_string()),
            language: Some("  ".to_string()),
        };
        assert!(input.text().is_none());
        assert!(input.language().is_none());
    }
}

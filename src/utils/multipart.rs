//! Form extraction for endpoints that accept file uploads.
//!
//! Text parts are collected into a JSON object and deserialized into `T`,
//! then validated like [`ValidatedJson`](crate::validator::ValidatedJson).
//! File parts are kept in memory as [`UploadedFile`]. A request sent as
//! `application/json` is accepted too and yields no files.

use anyhow::anyhow;
use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use validator::Validate;

use projex_core::AppError;

use crate::validator::{ValidatedJson, body_error};

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field_name: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

#[derive(Debug)]
pub struct ValidatedMultipart<T> {
    pub data: T,
    pub files: Vec<UploadedFile>,
}

impl<T> ValidatedMultipart<T> {
    /// Files sent under the given form field.
    pub fn files_named<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a UploadedFile> {
        self.files.iter().filter(move |f| f.field_name == field)
    }
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}

impl<T, S> FromRequest<S> for ValidatedMultipart<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_multipart(&req) {
            let ValidatedJson(data) = ValidatedJson::<T>::from_request(req, state).await?;
            return Ok(Self {
                data,
                files: Vec::new(),
            });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::bad_request(anyhow!("Invalid multipart body: {}", e.body_text())))?;

        let mut fields = Map::new();
        let mut files = Vec::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::new(e.status(), anyhow!(e.body_text())))?
        {
            let field_name = field.name().unwrap_or_default().to_string();

            if let Some(file_name) = field.file_name().map(str::to_string) {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::new(e.status(), anyhow!(e.body_text())))?;

                if !bytes.is_empty() {
                    files.push(UploadedFile {
                        field_name,
                        file_name,
                        content_type,
                        bytes,
                    });
                }
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::new(e.status(), anyhow!(e.body_text())))?;

                if !text.is_empty() {
                    fields.insert(field_name, Value::String(text));
                }
            }
        }

        let data: T =
            serde_json::from_value(Value::Object(fields)).map_err(|e| body_error(&e.to_string()))?;
        data.validate().map_err(|errors| AppError::validation(&errors))?;

        Ok(Self { data, files })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use serde::Deserialize;

    const BOUNDARY: &str = "projexboundary";

    #[derive(Debug, Deserialize, Validate)]
    #[serde(rename_all = "camelCase")]
    struct Form {
        #[validate(length(min = 4, message = "Title must be 4 to 50 characters"))]
        title: String,
        description: Option<String>,
    }

    fn multipart_request(parts: &[(&str, Option<(&str, &str)>, &str)]) -> Request {
        let mut body = String::new();
        for (name, file, content) in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match file {
                Some((file_name, mime)) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {mime}\r\n\r\n"
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        Request::builder()
            .method("POST")
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_collects_text_fields_and_files() {
        let req = multipart_request(&[
            ("title", None, "Write docs"),
            ("attachments", Some(("a.txt", "text/plain")), "hello"),
            ("attachments", Some(("b.txt", "text/plain")), "world"),
        ]);

        let form = ValidatedMultipart::<Form>::from_request(req, &()).await.unwrap();
        assert_eq!(form.data.title, "Write docs");
        assert!(form.data.description.is_none());
        assert_eq!(form.files_named("attachments").count(), 2);
        assert_eq!(form.files[0].content_type, "text/plain");
        assert_eq!(form.files[1].size(), 5);
    }

    #[tokio::test]
    async fn test_missing_text_field_is_unprocessable() {
        let req = multipart_request(&[("description", None, "no title")]);
        let err = ValidatedMultipart::<Form>::from_request(req, &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.errors[0].field, "title");
        assert_eq!(err.errors[0].message, "title is required");
    }

    #[tokio::test]
    async fn test_invalid_field_is_unprocessable() {
        let req = multipart_request(&[("title", None, "abc")]);
        let err = ValidatedMultipart::<Form>::from_request(req, &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.errors[0].field, "title");
    }

    #[tokio::test]
    async fn test_json_body_is_accepted() {
        let req = Request::builder()
            .method("POST")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"title":"Write docs"}"#))
            .unwrap();
        let form = ValidatedMultipart::<Form>::from_request(req, &()).await.unwrap();
        assert_eq!(form.data.title, "Write docs");
        assert!(form.files.is_empty());
    }
}

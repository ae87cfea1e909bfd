use anyhow::anyhow;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use validator::Validate;

use projex_core::{AppError, FieldError};

/// Maps a serde error message to the error the client sees. A missing field
/// is a 422 naming the field; anything else malformed is a 400.
pub(crate) fn body_error(message: &str) -> AppError {
    if let Some(field) = message
        .split("missing field `")
        .nth(1)
        .and_then(|s| s.split('`').next())
    {
        let message = format!("{field} is required");
        return AppError::unprocessable(anyhow!("Received data is not valid"))
            .with_errors(vec![FieldError::new(field, message)]);
    }

    if message.contains("invalid type")
        || message.contains("unknown variant")
        || message.contains("invalid value")
        || message.contains("UUID")
    {
        return AppError::bad_request(anyhow!("Invalid field type in request"));
    }

    AppError::bad_request(anyhow!("Invalid request body"))
}

/// JSON body extractor that runs `validator` rules. Failures render as 422 with field errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| match rejection {
                JsonRejection::MissingJsonContentType(_) => AppError::bad_request(anyhow!(
                    "Missing 'Content-Type: application/json' header"
                )),
                other => body_error(&other.body_text()),
            })?;

        value.validate().map_err(|errors| AppError::validation(&errors))?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{StatusCode, header};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Payload {
        #[validate(length(min = 4, message = "Title is too short"))]
        title: String,
    }

    fn json_request(body: &str) -> Request {
        Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_missing_field_is_unprocessable_with_field_error() {
        let err = ValidatedJson::<Payload>::from_request(json_request("{}"), &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.errors.len(), 1);
        assert_eq!(err.errors[0].field, "title");
        assert_eq!(err.errors[0].message, "title is required");
    }

    #[tokio::test]
    async fn test_rule_failure_is_unprocessable_with_field_errors() {
        let err = ValidatedJson::<Payload>::from_request(json_request(r#"{"title":"ab"}"#), &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.errors.len(), 1);
        assert_eq!(err.errors[0].field, "title");
        assert_eq!(err.errors[0].message, "Title is too short");
    }

    #[tokio::test]
    async fn test_wrong_type_is_bad_request() {
        let err = ValidatedJson::<Payload>::from_request(json_request(r#"{"title":5}"#), &())
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Invalid field type in request");
    }

    #[tokio::test]
    async fn test_missing_content_type() {
        let req = Request::builder()
            .method("POST")
            .body(Body::from("{}"))
            .unwrap();
        let err = ValidatedJson::<Payload>::from_request(req, &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.message().contains("Content-Type"));
    }
}

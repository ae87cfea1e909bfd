//! Success envelope returned by every handler.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

/// `{statusCode, data, message, success}`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status_code: u16,
    pub data: T,
    pub message: String,
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn new(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            data,
            message: message.into(),
            success: status.as_u16() < 400,
        }
    }

    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, data, message)
    }

    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self::new(StatusCode::CREATED, data, message)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

/// Placeholder payload for responses that carry no data. Serializes as `{}`.
#[derive(Debug, Default, Clone, Copy, Serialize, ToSchema)]
pub struct Empty {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_uses_camel_case_keys() {
        let body = ApiResponse::created(serde_json::json!({"id": 1}), "Project created");
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["statusCode"], 201);
        assert_eq!(json["data"]["id"], 1);
        assert_eq!(json["message"], "Project created");
        assert_eq!(json["success"], true);
    }

    #[test]
    fn empty_serializes_as_object() {
        let json = serde_json::to_value(ApiResponse::ok(Empty {}, "done")).unwrap();
        assert_eq!(json["data"], serde_json::json!({}));
    }

    #[test]
    fn into_response_keeps_status() {
        let res = ApiResponse::created(Empty {}, "ok").into_response();
        assert_eq!(res.status(), StatusCode::CREATED);
    }
}

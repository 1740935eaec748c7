//! HTTP response envelope

use actix_web::{HttpResponse, HttpResponseBuilder, http::StatusCode};
use serde::{Deserialize, Serialize};

use bizdash_common::error::{SERVER_ERROR, SUCCESS};

/// Generic result wrapper for API responses
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Result<T> {
    pub code: i32,
    pub message: String,
    pub data: T,
}

impl<T> Result<T> {
    pub fn new(code: i32, message: String, data: T) -> Self {
        Result::<T> {
            code,
            message,
            data,
        }
    }

    pub fn success(data: T) -> Result<T> {
        Result::<T> {
            code: SUCCESS.code,
            message: SUCCESS.message.to_string(),
            data,
        }
    }

    pub fn http_success(data: impl Serialize) -> HttpResponse {
        HttpResponse::Ok().json(Result::success(data))
    }

    pub fn http_response(
        status: u16,
        code: i32,
        message: String,
        data: impl Serialize,
    ) -> HttpResponse {
        HttpResponseBuilder::new(StatusCode::from_u16(status).unwrap_or_default())
            .json(Result::new(code, message, data))
    }

    /// Error response with the message HTML-escaped
    pub fn http_error(status: u16, code: i32, message: &str) -> HttpResponse {
        Result::<String>::http_response(
            status,
            code,
            htmlescape::encode_minimal(message),
            String::new(),
        )
    }

    pub fn http_server_error(message: &str) -> HttpResponse {
        Result::<String>::http_error(500, SERVER_ERROR.code, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_success_envelope() {
        let result = Result::success(vec![1, 2]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["code"], 0);
        assert_eq!(json["message"], "success");
        assert_eq!(json["data"], serde_json::json!([1, 2]));
    }

    #[actix_web::test]
    async fn test_error_message_is_escaped() {
        let response = Result::<String>::http_error(400, 20002, "<b>bad</b>");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "&lt;b&gt;bad&lt;/b&gt;");
        assert_eq!(json["data"], "");
    }
}

//! 请求级错误

use axum::http::StatusCode;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    /// 请求体不是合法 JSON，或缺少必需字段（如 `event`）
    #[error("invalid {endpoint} payload: {source}")]
    InvalidPayload {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::InvalidPayload { .. } => StatusCode::BAD_REQUEST,
            RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::InvalidPayload { .. } => "invalid_payload",
            RelayError::Internal(_) => "internal",
        }
    }

    /// 发往默认 chat 的错误描述
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "kind": self.kind(),
            "message": self.to_string(),
            "status": self.status().as_u16(),
        })
    }
}

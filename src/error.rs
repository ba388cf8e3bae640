use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::server::cors_headers;

#[derive(Error, Debug)]
pub enum ProxyError {
    /// Upstream answered with a non-2xx status.
    #[error("Upstream request failed with status {status}")]
    Upstream { status: u16 },
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("{0}")]
    Decode(#[from] serde_json::Error),
}

impl ProxyError {
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::Upstream { .. } => "upstream_status",
            ProxyError::Transport(e) if e.is_timeout() => "timeout",
            ProxyError::Transport(_) => "transport",
            ProxyError::Decode(_) => "decode",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            ProxyError::Transport(_) | ProxyError::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let body = match &self {
            ProxyError::Upstream { status } => json!({
                "error": "Upstream request failed",
                "status": status,
            }),
            ProxyError::Transport(_) | ProxyError::Decode(_) => json!({
                "error": "Proxy error",
                "message": self.to_string(),
            }),
        };

        (self.status_code(), cors_headers(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_maps_to_bad_gateway() {
        let err = ProxyError::Upstream { status: 503 };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.kind(), "upstream_status");
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");
        assert!(resp.headers().get("cache-control").is_none());
    }

    #[test]
    fn test_decode_maps_to_internal_error() {
        let err: ProxyError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), "decode");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.to_string().is_empty());
    }
}

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("invalid peer address: {0:?}")]
    InvalidAddress(String),
    #[error("chain has no blocks")]
    EmptyChain,
    #[error("peer {peer} unreachable: {reason}")]
    PeerUnreachable { peer: String, reason: String },
    #[error("peer {0} returned an invalid chain")]
    InvalidPeerChain(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("peer directory: {0}")]
    PeerDirectory(#[from] std::io::Error),
    #[error("mining failed: {0}")]
    Mining(String),
}

impl ResponseError for NodeError {
    fn status_code(&self) -> StatusCode {
        match self {
            NodeError::InvalidAddress(_) | NodeError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_400() {
        assert_eq!(
            NodeError::InvalidAddress("::".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            NodeError::BadRequest("Missing values".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            NodeError::EmptyChain.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

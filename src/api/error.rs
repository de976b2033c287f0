// ==========================================
// 商品目录服务 - API层错误类型
// ==========================================
// 职责: 定义请求级错误，统一转换下层错误并映射 HTTP 状态码
// 响应体: {"error": "<message>"}
// ==========================================

use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// API层错误类型
///
/// Display 即返回给调用方的 error 文本
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 请求输入错误 (4xx)
    // ==========================================
    #[error("{0}")]
    InvalidInput(String),

    #[error("File too large: {size} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge { size: usize, limit: usize },

    /// 上传内容无法解码（编码/CSV/Excel）
    #[error("{0}")]
    ImportError(String),

    // ==========================================
    // 服务端错误 (5xx)
    // ==========================================
    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::MissingFilePart | ImportError::EmptyFilename => {
                ApiError::InvalidInput(err.to_string())
            }
            ImportError::PayloadTooLarge { size, limit } => {
                ApiError::PayloadTooLarge { size, limit }
            }
            ImportError::FileNotFound(_) | ImportError::FileReadError(_) => {
                ApiError::InternalError(err.to_string())
            }
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// 目的: 读路径上的存储故障一律视为服务端错误
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(e) => ApiError::Other(e),
            other => ApiError::DatabaseError(other.detail()),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) | ApiError::ImportError(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::DatabaseError(_) | ApiError::InternalError(_) | ApiError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            tracing::error!(error = %self, "请求处理失败");
        }
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string()
        }))
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_error_conversion() {
        let api_err: ApiError = ImportError::MissingFilePart.into();
        assert_eq!(api_err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(api_err.to_string(), "No file part (field name must be 'file')");

        let api_err: ApiError = ImportError::PayloadTooLarge { size: 20, limit: 10 }.into();
        assert_eq!(api_err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);

        let api_err: ApiError = ImportError::EncodingError("bad byte".to_string()).into();
        assert_eq!(api_err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_repository_error_conversion() {
        let api_err: ApiError = RepositoryError::LockError("poisoned".to_string()).into();
        match api_err {
            ApiError::DatabaseError(ref msg) => assert_eq!(msg, "poisoned"),
            _ => panic!("Expected DatabaseError"),
        }
        assert_eq!(api_err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

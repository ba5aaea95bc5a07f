//! 统一错误类型定义

use serde::Serialize;
use thiserror::Error;

/// 工具箱错误类型
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum ToolboxError {
    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 网络错误
    #[error("Network error: {0}")]
    NetworkError(String),
}

impl ToolboxError {
    /// Whether the error stems from caller input rather than the environment.
    ///
    /// Used to pick the log level: `warn` for expected errors, `error` otherwise.
    #[must_use]
    pub const fn is_expected(&self) -> bool {
        matches!(self, Self::ValidationError(_))
    }

    /// The bare message without the variant prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::ValidationError(msg) | Self::NetworkError(msg) => msg,
        }
    }
}

/// 工具箱 Result 类型别名
pub type ToolboxResult<T> = std::result::Result<T, ToolboxError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_is_expected() {
        assert!(ToolboxError::ValidationError("host required".to_string()).is_expected());
        assert!(!ToolboxError::NetworkError("boom".to_string()).is_expected());
    }

    #[test]
    fn test_message_strips_prefix() {
        let err = ToolboxError::ValidationError("invalid port".to_string());
        assert_eq!(err.message(), "invalid port");
        assert_eq!(err.to_string(), "Validation error: invalid port");
    }

    #[test]
    fn test_error_serialization_shape() {
        let err = ToolboxError::ValidationError("host required".to_string());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "ValidationError");
        assert_eq!(json["details"], "host required");
    }
}

//! 应用层错误定义
//!
//! 统一的命令错误类型

use thiserror::Error;

use crate::application::mixer::MixError;
use crate::application::ports::{BlobStoreError, ProbeError};

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 没有可合成或可混音的内容
    #[error("No content: {0}")]
    NoContent(String),

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 混音失败
    #[error("Mix failed: {0}")]
    Mix(#[source] MixError),

    /// 成品无法解码
    #[error("Probe error: {0}")]
    Probe(#[from] ProbeError),

    /// 存储错误
    #[error("Storage error: {0}")]
    StorageError(#[from] BlobStoreError),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建无内容错误
    pub fn no_content(message: impl Into<String>) -> Self {
        Self::NoContent(message.into())
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<MixError> for ApplicationError {
    fn from(err: MixError) -> Self {
        match err {
            MixError::NoContent => Self::NoContent(err.to_string()),
            other => Self::Mix(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mix_no_content_maps_to_no_content() {
        let err: ApplicationError = MixError::NoContent.into();
        assert!(matches!(err, ApplicationError::NoContent(_)));
    }
}

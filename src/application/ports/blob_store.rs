//! Blob Store Port - 成品音频对象存储

use async_trait::async_trait;
use thiserror::Error;

/// 对象存储错误
#[derive(Debug, Error)]
pub enum BlobStoreError {
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Blob Store Port
///
/// 保存成品音频并返回可访问的地址
#[async_trait]
pub trait BlobStorePort: Send + Sync {
    /// 写入对象，返回访问地址
    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String, BlobStoreError>;

    /// 删除对象，对象不存在时视为成功
    async fn delete(&self, key: &str) -> Result<(), BlobStoreError>;
}

//! File Blob Store - 文件系统对象存储实现
//!
//! 实现 BlobStorePort trait，对象 key 映射为根目录下的相对路径

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use crate::application::ports::{BlobStoreError, BlobStorePort};

/// 文件系统对象存储
pub struct FileBlobStore {
    /// 存储根目录
    base_dir: PathBuf,
    /// 对外访问地址前缀，未配置时返回本地路径
    public_base_url: Option<String>,
}

impl FileBlobStore {
    /// 创建新的文件存储
    pub async fn new(
        base_dir: impl AsRef<Path>,
        public_base_url: Option<String>,
    ) -> Result<Self, BlobStoreError> {
        let base_dir = base_dir.as_ref().to_path_buf();

        // 确保目录存在
        fs::create_dir_all(&base_dir)
            .await
            .map_err(|e| BlobStoreError::IoError(e.to_string()))?;

        Ok(Self {
            base_dir,
            public_base_url: public_base_url.filter(|u| !u.trim().is_empty()),
        })
    }

    /// 获取存储根目录
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// key 只允许普通路径段
    fn object_path(&self, key: &str) -> Result<PathBuf, BlobStoreError> {
        let relative = Path::new(key);
        let valid = !key.trim().is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !valid {
            return Err(BlobStoreError::InvalidKey(key.to_string()));
        }
        Ok(self.base_dir.join(relative))
    }

    fn object_url(&self, key: &str, path: &Path) -> String {
        match &self.public_base_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), key),
            None => path.to_string_lossy().to_string(),
        }
    }
}

#[async_trait]
impl BlobStorePort for FileBlobStore {
    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String, BlobStoreError> {
        let path = self.object_path(key)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| BlobStoreError::IoError(e.to_string()))?;
        }

        // 先写临时文件再重命名，避免读到半截对象
        let tmp_path = path.with_extension(format!("tmp-{}", uuid::Uuid::new_v4()));
        fs::write(&tmp_path, &data)
            .await
            .map_err(|e| BlobStoreError::IoError(e.to_string()))?;
        if let Err(e) = fs::rename(&tmp_path, &path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(BlobStoreError::IoError(e.to_string()));
        }

        tracing::info!(
            key = %key,
            content_type = %content_type,
            size = data.len(),
            "Stored object"
        );

        Ok(self.object_url(key, &path))
    }

    async fn delete(&self, key: &str) -> Result<(), BlobStoreError> {
        let path = self.object_path(key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(key = %key, "Deleted object");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BlobStoreError::IoError(e.to_string())),
        }
    }
}

//! 临时工作目录
//!
//! 每次引擎调用一个 `mix-` 前缀的 `TempDir`，Drop 时由 tempfile 删除

use std::path::{Path, PathBuf};

use tempfile::TempDir;

#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// 在 `root` 下创建唯一命名的目录，`root` 不存在时先创建
    pub async fn create(root: &Path) -> std::io::Result<Self> {
        tokio::fs::create_dir_all(root).await?;
        let dir = tempfile::Builder::new().prefix("mix-").tempdir_in(root)?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

use crate::core::Storage;
use crate::utils::error::{EtlError, Result};
use std::path::{Path, PathBuf};

/// 本機檔案系統。
///
/// 相對路徑以 `base_path` 為根；絕對路徑 (例如使用者指定的輸入檔) 原樣使用。
#[derive(Debug, Clone, Default)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// 以目前工作目錄為根
    pub fn current_dir() -> Self {
        Self::default()
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }
}

/// 保留原本的錯誤種類，訊息加上檔案路徑
fn with_path(path: &Path, error: std::io::Error) -> EtlError {
    EtlError::IoError(std::io::Error::new(
        error.kind(),
        format!("{}: {}", path.display(), error),
    ))
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.resolve(path);
        tokio::fs::read(&full_path)
            .await
            .map_err(|e| with_path(&full_path, e))
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);

        if let Some(parent) = full_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| with_path(parent, e))?;
        }

        tokio::fs::write(&full_path, data)
            .await
            .map_err(|e| with_path(&full_path, e))?;
        tracing::debug!("Wrote {} bytes to {}", data.len(), full_path.display());
        Ok(())
    }
}

// ==========================================
// 组件序列号分配系统 - JSON 文件存储
// ==========================================
// 职责: 整文件读写，启动时加载到内存，每次变更整体重写
// 写入: 先写同目录临时文件并 fsync，再 rename 覆盖（原子替换）
// 约束: 单写者；不做跨进程加锁
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

// ==========================================
// JsonFileStore - 单个 JSON 存储文件句柄
// ==========================================
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取原始 JSON 值
    ///
    /// # 返回
    /// - Ok(None): 文件不存在（合法的空存储）
    /// - Ok(Some(value)): 读取成功
    /// - Err: 文件存在但不可读，或内容不是合法 JSON
    pub fn load_value(&self) -> RepositoryResult<Option<serde_json::Value>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "存储文件不存在，视为空存储");
                return Ok(None);
            }
            Err(e) => return Err(RepositoryError::read(&self.path, e)),
        };

        let value = serde_json::from_str(&content)
            .map_err(|e| RepositoryError::corrupt(&self.path, e))?;
        Ok(Some(value))
    }

    /// 读取并反序列化
    pub fn load<T: DeserializeOwned>(&self) -> RepositoryResult<Option<T>> {
        match self.load_value()? {
            None => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| RepositoryError::corrupt(&self.path, e)),
        }
    }

    /// 整体写入（原子替换）
    pub fn save<T: Serialize + ?Sized>(&self, value: &T) -> RepositoryResult<()> {
        let content = serde_json::to_string_pretty(value)
            .map_err(|e| RepositoryError::write(&self.path, e))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| RepositoryError::write(&self.path, e))?;
            }
        }

        let tmp_path = self.tmp_path();
        let write_tmp = || -> std::io::Result<()> {
            let mut file = File::create(&tmp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
            Ok(())
        };

        if let Err(e) = write_tmp() {
            let _ = fs::remove_file(&tmp_path);
            return Err(RepositoryError::write(&self.path, e));
        }

        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(RepositoryError::write(&self.path, e));
        }

        debug!(path = %self.path.display(), bytes = content.len(), "存储文件已写入");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

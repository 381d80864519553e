// ==========================================
// 组件序列号分配系统 - 序列号状态仓储
// ==========================================
// 红线: Repository 不含业务逻辑（计数规则在 SerialAllocator）
// 存储: 描述键 → {last_serial, last_used_at, associated_code}
// 约束: 状态只增改，不删除
// ==========================================

use crate::domain::serial::SerialState;
use crate::repository::error::RepositoryResult;
use crate::repository::json_store::JsonFileStore;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

// ==========================================
// SerialStateRepository - 序列号状态仓储
// ==========================================
pub struct SerialStateRepository {
    store: JsonFileStore,
    states: BTreeMap<String, SerialState>,
}

impl SerialStateRepository {
    /// 打开状态存储（文件不存在时为空）
    pub fn open(path: impl Into<PathBuf>) -> RepositoryResult<Self> {
        let store = JsonFileStore::new(path);
        let states: BTreeMap<String, SerialState> = store.load()?.unwrap_or_default();

        info!(
            path = %store.path().display(),
            count = states.len(),
            "序列号状态已加载"
        );

        Ok(Self { store, states })
    }

    pub fn get(&self, description: &str) -> Option<&SerialState> {
        self.states.get(description)
    }

    pub fn contains(&self, description: &str) -> bool {
        self.states.contains_key(description)
    }

    /// 全部状态（快照副本）
    pub fn list(&self) -> BTreeMap<String, SerialState> {
        self.states.clone()
    }

    /// 写入/覆盖状态并同步落盘
    ///
    /// 落盘失败时回滚内存中的该条目
    pub fn upsert(&mut self, description: &str, state: SerialState) -> RepositoryResult<()> {
        let previous = self.states.insert(description.to_string(), state);

        if let Err(e) = self.store.save(&self.states) {
            match previous {
                Some(prev) => {
                    self.states.insert(description.to_string(), prev);
                }
                None => {
                    self.states.remove(description);
                }
            }
            return Err(e);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn state(last: i64) -> SerialState {
        SerialState {
            last_serial: last,
            last_used_at: NaiveDate::from_ymd_opt(2025, 6, 1)
                .unwrap()
                .and_hms_opt(8, 30, 0)
                .unwrap(),
            associated_code: Some("ABC123".to_string()),
        }
    }

    #[test]
    fn test_upsert_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("serials.json");

        let mut repo = SerialStateRepository::open(&path).unwrap();
        assert!(!repo.contains("SENSOR"));
        repo.upsert("SENSOR", state(4)).unwrap();

        let reopened = SerialStateRepository::open(&path).unwrap();
        assert_eq!(reopened.get("SENSOR"), Some(&state(4)));
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let dir = TempDir::new().unwrap();
        // 以目录占位目标文件路径，使 rename 失败
        let path = dir.path().join("serials.json");
        std::fs::create_dir(&path).unwrap();

        let mut repo = SerialStateRepository {
            store: JsonFileStore::new(&path),
            states: BTreeMap::new(),
        };
        assert!(repo.upsert("SENSOR", state(0)).is_err());
        assert!(!repo.contains("SENSOR"));
    }
}

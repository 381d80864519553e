// ==========================================
// 组件序列号分配系统 - 组件注册表仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 存储: 组件定义的有序列表（JSON 数组）
// 迁移: 加载时缺少 index_policy 字段的条目补为未设置，并立即重写文件
// ==========================================

use crate::domain::component::ComponentDefinition;
use crate::domain::types::IndexPolicy;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::json_store::JsonFileStore;
use std::path::PathBuf;
use tracing::{info, warn};

const INDEX_POLICY_KEY: &str = "index_policy";

// ==========================================
// ComponentRegistry - 组件注册表
// ==========================================
/// 组件注册表
/// 职责: 组件定义的 CRUD 与持久化
/// 写入失败时内存状态保持不变
pub struct ComponentRegistry {
    store: JsonFileStore,
    components: Vec<ComponentDefinition>,
}

impl ComponentRegistry {
    /// 打开注册表（文件不存在时为空）
    pub fn open(path: impl Into<PathBuf>) -> RepositoryResult<Self> {
        let store = JsonFileStore::new(path);

        let components = match store.load_value()? {
            None => Vec::new(),
            Some(value) => {
                let needs_migration = value
                    .as_array()
                    .map(|items| {
                        items.iter().any(|item| {
                            item.as_object()
                                .map_or(false, |obj| !obj.contains_key(INDEX_POLICY_KEY))
                        })
                    })
                    .unwrap_or(false);

                let components: Vec<ComponentDefinition> = serde_json::from_value(value)
                    .map_err(|e| RepositoryError::corrupt(store.path(), e))?;

                if needs_migration {
                    match store.save(&components) {
                        Ok(()) => info!(
                            path = %store.path().display(),
                            count = components.len(),
                            "组件注册表已迁移: 补充 index_policy 字段"
                        ),
                        // 迁移写入失败不阻塞启动：磁盘上的旧格式仍然可读
                        Err(e) => warn!(error = %e, "组件注册表迁移写入失败"),
                    }
                }

                components
            }
        };

        info!(
            path = %store.path().display(),
            count = components.len(),
            "组件注册表已加载"
        );

        Ok(Self { store, components })
    }

    /// 新增组件
    ///
    /// # 返回
    /// - Ok(true): 新增成功
    /// - Ok(false): 名称已存在
    pub fn add(&mut self, def: ComponentDefinition) -> RepositoryResult<bool> {
        if self.position(&def.name).is_some() {
            return Ok(false);
        }

        let name = def.name.clone();
        let mut next = self.components.clone();
        next.push(def);
        self.commit(next)?;

        info!(component = %name, "组件已新增");
        Ok(true)
    }

    /// 替换 old_name 对应的条目（允许改名）
    ///
    /// 新定义的 part_code 为空时沿用原值
    ///
    /// # 返回
    /// - Ok(true): 更新成功
    /// - Ok(false): old_name 不存在
    /// - Err(UniqueConstraintViolation): 改名目标已被其他组件占用
    pub fn update(&mut self, old_name: &str, mut def: ComponentDefinition) -> RepositoryResult<bool> {
        let idx = match self.position(old_name) {
            Some(idx) => idx,
            None => return Ok(false),
        };

        if def.name != old_name && self.position(&def.name).is_some() {
            return Err(RepositoryError::UniqueConstraintViolation(format!(
                "组件名称已存在: {}",
                def.name
            )));
        }

        if !def.has_part_code() {
            def.part_code = self.components[idx].part_code.clone();
        }

        let new_name = def.name.clone();
        let mut next = self.components.clone();
        next[idx] = def;
        self.commit(next)?;

        info!(old_name = %old_name, component = %new_name, "组件已更新");
        Ok(true)
    }

    /// 删除组件
    pub fn remove(&mut self, name: &str) -> RepositoryResult<bool> {
        let idx = match self.position(name) {
            Some(idx) => idx,
            None => return Ok(false),
        };

        let mut next = self.components.clone();
        next.remove(idx);
        self.commit(next)?;

        info!(component = %name, "组件已删除");
        Ok(true)
    }

    pub fn find(&self, name: &str) -> Option<&ComponentDefinition> {
        self.components.iter().find(|c| c.name == name)
    }

    /// 全部组件（快照副本）
    pub fn list(&self) -> Vec<ComponentDefinition> {
        self.components.clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.components.iter().map(|c| c.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// 仅更新 resume_serial（批次回写 / 人工覆写）
    pub fn set_resume_serial(&mut self, name: &str, value: i64) -> RepositoryResult<bool> {
        let idx = match self.position(name) {
            Some(idx) => idx,
            None => {
                warn!(component = %name, "更新 resume_serial 失败: 组件不存在");
                return Ok(false);
            }
        };

        let mut next = self.components.clone();
        next[idx].resume_serial = Some(value);
        self.commit(next)?;

        info!(component = %name, resume_serial = value, "resume_serial 已更新");
        Ok(true)
    }

    /// 批次结束回写: resume_serial 与（可选）索引策略，一次落盘
    ///
    /// policy 为 None 时保留已存储的策略
    pub fn apply_run_outcome(
        &mut self,
        name: &str,
        resume_serial: i64,
        policy: Option<IndexPolicy>,
    ) -> RepositoryResult<bool> {
        let idx = match self.position(name) {
            Some(idx) => idx,
            None => return Ok(false),
        };

        let mut next = self.components.clone();
        next[idx].resume_serial = Some(resume_serial);
        if let Some(policy) = policy {
            next[idx].index_policy = policy;
        }
        self.commit(next)?;
        Ok(true)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.components.iter().position(|c| c.name == name)
    }

    // 先落盘，成功后才替换内存状态
    fn commit(&mut self, next: Vec<ComponentDefinition>) -> RepositoryResult<()> {
        self.store.save(&next)?;
        self.components = next;
        Ok(())
    }
}

// ==========================================
// 组件序列号分配系统 - 组件注册表 API
// ==========================================
// 职责: 组件定义的增删改查、resume_serial 人工覆写
// 红线: 所有变更先落盘再生效；失败时注册表保持原状
// ==========================================

use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::validate_component_name;
use crate::domain::component::ComponentDefinition;
use crate::repository::component_repo::ComponentRegistry;

// ==========================================
// ComponentApi - 组件注册表 API
// ==========================================
pub struct ComponentApi {
    registry: Arc<Mutex<ComponentRegistry>>,
}

impl ComponentApi {
    /// 创建新的ComponentApi实例
    pub fn new(registry: Arc<Mutex<ComponentRegistry>>) -> Self {
        Self { registry }
    }

    fn get_registry(&self) -> ApiResult<MutexGuard<'_, ComponentRegistry>> {
        self.registry
            .lock()
            .map_err(|e| ApiError::InternalError(format!("注册表锁获取失败: {}", e)))
    }

    /// 全部组件（注册顺序）
    pub fn list_components(&self) -> ApiResult<Vec<ComponentDefinition>> {
        Ok(self.get_registry()?.list())
    }

    /// 全部组件名称（注册顺序）
    pub fn list_names(&self) -> ApiResult<Vec<String>> {
        Ok(self.get_registry()?.names())
    }

    /// 查询单个组件
    pub fn get_component(&self, name: &str) -> ApiResult<ComponentDefinition> {
        self.get_registry()?
            .find(name)
            .cloned()
            .ok_or_else(|| ApiError::ComponentNotFound(name.to_string()))
    }

    /// 新增组件
    ///
    /// # 返回
    /// - Err(DuplicateComponent): 名称已存在
    /// - Err(MissingPartCode): 未提供零件编码
    pub fn add_component(&self, mut def: ComponentDefinition) -> ApiResult<()> {
        def.name = validate_component_name(&def.name)?;
        def.part_code = def.part_code.trim().to_string();
        if !def.has_part_code() {
            return Err(ApiError::MissingPartCode(def.name));
        }
        validate_resume_serial(def.resume_serial)?;

        let name = def.name.clone();
        if !self.get_registry()?.add(def)? {
            return Err(ApiError::DuplicateComponent(name));
        }
        debug!(component = %name, "add_component 完成");
        Ok(())
    }

    /// 更新组件（允许改名，零件编码留空表示沿用）
    pub fn update_component(&self, old_name: &str, mut def: ComponentDefinition) -> ApiResult<()> {
        def.name = validate_component_name(&def.name)?;
        def.part_code = def.part_code.trim().to_string();
        validate_resume_serial(def.resume_serial)?;

        if !self.get_registry()?.update(old_name, def)? {
            return Err(ApiError::ComponentNotFound(old_name.to_string()));
        }
        Ok(())
    }

    /// 删除组件
    ///
    /// 序列号计数器不受影响，同名组件重新登记后继续沿用原计数
    pub fn remove_component(&self, name: &str) -> ApiResult<()> {
        if !self.get_registry()?.remove(name)? {
            return Err(ApiError::ComponentNotFound(name.to_string()));
        }
        Ok(())
    }

    /// 人工设置下一次批次的起始序号
    pub fn set_resume_serial(&self, name: &str, value: i64) -> ApiResult<()> {
        validate_resume_serial(Some(value))?;

        if !self.get_registry()?.set_resume_serial(name, value)? {
            return Err(ApiError::ComponentNotFound(name.to_string()));
        }
        info!(component = %name, resume_serial = value, "人工设置 resume_serial");
        Ok(())
    }
}

fn validate_resume_serial(value: Option<i64>) -> ApiResult<()> {
    match value {
        Some(v) if v < 0 => Err(ApiError::InvalidOverride(format!(
            "resume_serial 不能为负数: {}",
            v
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::IndexPolicy;
    use tempfile::TempDir;

    fn api(dir: &TempDir) -> ComponentApi {
        let registry = ComponentRegistry::open(dir.path().join("components.json")).unwrap();
        ComponentApi::new(Arc::new(Mutex::new(registry)))
    }

    #[test]
    fn test_add_requires_part_code() {
        let dir = TempDir::new().unwrap();
        let api = api(&dir);

        let err = api
            .add_component(ComponentDefinition::new("SENSOR", "  "))
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingPartCode(_)));
        assert!(api.list_components().unwrap().is_empty());
    }

    #[test]
    fn test_add_duplicate() {
        let dir = TempDir::new().unwrap();
        let api = api(&dir);

        api.add_component(ComponentDefinition::new("SENSOR", "ABC123"))
            .unwrap();
        let err = api
            .add_component(ComponentDefinition::new("SENSOR", "XYZ"))
            .unwrap_err();
        assert!(matches!(err, ApiError::DuplicateComponent(_)));
        assert_eq!(api.get_component("SENSOR").unwrap().part_code, "ABC123");
    }

    #[test]
    fn test_update_and_remove() {
        let dir = TempDir::new().unwrap();
        let api = api(&dir);

        api.add_component(ComponentDefinition::new("SENSOR", "ABC123"))
            .unwrap();
        api.update_component(
            "SENSOR",
            ComponentDefinition::new("SENSOR-V2", "")
                .with_index_policy(IndexPolicy::FixedOffset(3)),
        )
        .unwrap();

        let def = api.get_component("SENSOR-V2").unwrap();
        assert_eq!(def.part_code, "ABC123");
        assert_eq!(def.index_policy, IndexPolicy::FixedOffset(3));
        assert!(matches!(
            api.get_component("SENSOR"),
            Err(ApiError::ComponentNotFound(_))
        ));

        api.remove_component("SENSOR-V2").unwrap();
        assert!(matches!(
            api.remove_component("SENSOR-V2"),
            Err(ApiError::ComponentNotFound(_))
        ));
    }

    #[test]
    fn test_set_resume_serial() {
        let dir = TempDir::new().unwrap();
        let api = api(&dir);

        api.add_component(ComponentDefinition::new("SENSOR", "ABC123"))
            .unwrap();
        api.set_resume_serial("SENSOR", 40).unwrap();
        assert_eq!(api.get_component("SENSOR").unwrap().resume_serial, Some(40));

        assert!(matches!(
            api.set_resume_serial("SENSOR", -2),
            Err(ApiError::InvalidOverride(_))
        ));
        assert!(matches!(
            api.set_resume_serial("MISSING", 1),
            Err(ApiError::ComponentNotFound(_))
        ));
    }
}

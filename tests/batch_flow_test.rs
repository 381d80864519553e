// ==========================================
// 批次执行端到端测试
// ==========================================
// 场景: 注册组件 → 执行批次 → 检查记录顺序、序列号、卡型标签、回写结果
// ==========================================


use chrono::NaiveDate;
use serial_label_engine::{
    ApiError, BatchRequest, ComponentDefinition, ComponentRequest, IndexPolicy, PolicyWriteBack,
};
use tempfile::TempDir;
use test_helpers::*;

fn serials(result: &serial_label_engine::BatchResult) -> Vec<String> {
    result.records.iter().map(|r| r.serial.clone()).collect()
}

fn labels(result: &serial_label_engine::BatchResult) -> Vec<String> {
    result.records.iter().map(|r| r.card_type.clone()).collect()
}

#[test]
fn test_two_buses_single_sensor() {
    let (_dir, state) = create_test_state(june_2025());
    state.component_api.add_component(sensor()).unwrap();

    let request = BatchRequest::new(2, 5, vec![ComponentRequest::new("SENSOR", 1)]);
    let result = state.batch_api.run_batch(&request).unwrap();

    assert_eq!(result.records.len(), 2);
    assert_eq!(result.records[0].bus, 5);
    assert_eq!(result.records[1].bus, 6);
    assert_eq!(serials(&result), vec!["F25 00000", "F25 00001"]);
    assert_eq!(labels(&result), vec!["SU1", "SU1"]);
    assert!(result.records.iter().all(|r| r.part_code == "ABC123"));

    let def = state.component_api.get_component("SENSOR").unwrap();
    assert_eq!(def.resume_serial, Some(2));
    assert_eq!(state.serial_api.get_last("SENSOR").unwrap(), 1);

    assert_eq!(result.summaries.len(), 1);
    let summary = &result.summaries[0];
    assert_eq!(summary.first_counter, 0);
    assert_eq!(summary.last_counter, 1);
    assert_eq!(summary.allocated, 2);
    assert_eq!(summary.next_resume, 2);
}

#[test]
fn test_bus_major_order_and_position_reset() {
    let (_dir, state) = create_test_state(june_2025());
    state.component_api.add_component(cpu()).unwrap();
    state.component_api.add_component(sensor()).unwrap();

    let request = BatchRequest::new(
        2,
        1,
        vec![
            ComponentRequest::new("CPU", 3),
            ComponentRequest::new("SENSOR", 1),
        ],
    );
    let result = state.batch_api.run_batch(&request).unwrap();

    let order: Vec<(u32, &str)> = result
        .records
        .iter()
        .map(|r| (r.bus, r.component.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![
            (1, "CPU"),
            (1, "CPU"),
            (1, "CPU"),
            (1, "SENSOR"),
            (2, "CPU"),
            (2, "CPU"),
            (2, "CPU"),
            (2, "SENSOR"),
        ]
    );

    // 计数器按组件独立递增，跨总线连续
    assert_eq!(
        serials(&result),
        vec![
            "F25 00000", "F25 00001", "F25 00002", "F25 00000", "F25 00003", "F25 00004",
            "F25 00005", "F25 00001",
        ]
    );
    // 循环索引每条总线从位置 0 重新开始
    assert_eq!(
        labels(&result),
        vec!["CPU1", "CPU3", "CPU1", "SU1", "CPU1", "CPU3", "CPU1", "SU1"]
    );
}

#[test]
fn test_second_run_resumes() {
    let (_dir, state) = create_test_state(june_2025());
    state.component_api.add_component(sensor()).unwrap();

    let request = BatchRequest::new(2, 1, vec![ComponentRequest::new("SENSOR", 1)]);
    state.batch_api.run_batch(&request).unwrap();
    let result = state.batch_api.run_batch(&request).unwrap();

    assert_eq!(serials(&result), vec!["F25 00002", "F25 00003"]);
    assert_eq!(
        state.component_api.get_component("SENSOR").unwrap().resume_serial,
        Some(4)
    );
}

#[test]
fn test_start_counter_resolution() {
    let (_dir, state) = create_test_state(june_2025());
    state.component_api.add_component(sensor()).unwrap();

    // 注册表 resume_serial 优先于 last_serial + 1
    state.component_api.set_resume_serial("SENSOR", 50).unwrap();
    let result = state
        .batch_api
        .run_batch(&BatchRequest::new(1, 1, vec![ComponentRequest::new("SENSOR", 2)]))
        .unwrap();
    assert_eq!(serials(&result), vec!["F25 00050", "F25 00051"]);

    // 调用方覆写优先于注册表，覆写只作用于第一次分配
    let result = state
        .batch_api
        .run_batch(&BatchRequest::new(
            2,
            1,
            vec![ComponentRequest::new("SENSOR", 1).with_override(137)],
        ))
        .unwrap();
    assert_eq!(serials(&result), vec!["F25 00137", "F25 00138"]);
    assert_eq!(
        state.component_api.get_component("SENSOR").unwrap().resume_serial,
        Some(139)
    );
}

#[test]
fn test_override_may_move_counter_backwards() {
    let (_dir, state) = create_test_state(june_2025());
    state.component_api.add_component(sensor()).unwrap();

    let request = BatchRequest::new(1, 1, vec![ComponentRequest::new("SENSOR", 1).with_override(500)]);
    state.batch_api.run_batch(&request).unwrap();

    let request = BatchRequest::new(1, 1, vec![ComponentRequest::new("SENSOR", 1).with_override(3)]);
    let result = state.batch_api.run_batch(&request).unwrap();
    assert_eq!(serials(&result), vec!["F25 00003"]);
    assert_eq!(state.serial_api.get_last("SENSOR").unwrap(), 3);
}

#[test]
fn test_missing_part_code_aborts_without_changes() {
    let (dir, state) = create_test_state(june_2025());
    state.component_api.add_component(sensor()).unwrap();

    // SENSOR 合法，GHOST 未登记且无编码无历史 → 整个批次在分配前失败
    let request = BatchRequest::new(
        2,
        1,
        vec![
            ComponentRequest::new("SENSOR", 1),
            ComponentRequest::new("GHOST", 1),
        ],
    );
    let err = state.batch_api.run_batch(&request).unwrap_err();
    assert!(matches!(err, ApiError::MissingPartCode(ref c) if c == "GHOST"));

    assert_eq!(state.serial_api.get_last("SENSOR").unwrap(), -1);
    assert!(state.serial_api.list_states().unwrap().is_empty());
    assert_eq!(
        state.component_api.get_component("SENSOR").unwrap().resume_serial,
        None
    );
    assert!(!state.config.serial_state_path().exists());
    assert!(dir.path().join("components.json").exists());
}

#[test]
fn test_invalid_requests_rejected() {
    let (_dir, state) = create_test_state(june_2025());
    state.component_api.add_component(sensor()).unwrap();

    let zero_buses = BatchRequest::new(0, 1, vec![ComponentRequest::new("SENSOR", 1)]);
    assert!(matches!(
        state.batch_api.run_batch(&zero_buses),
        Err(ApiError::InvalidInput(_))
    ));

    let negative = BatchRequest::new(1, 1, vec![ComponentRequest::new("SENSOR", 1).with_override(-5)]);
    assert!(matches!(
        state.batch_api.run_batch(&negative),
        Err(ApiError::InvalidOverride(_))
    ));

    assert!(state.serial_api.list_states().unwrap().is_empty());
}

#[test]
fn test_unregistered_component_with_code() {
    let (_dir, state) = create_test_state(june_2025());

    let request = BatchRequest::new(
        2,
        1,
        vec![ComponentRequest::new("LOOSE", 1).with_part_code("L-77")],
    );
    let result = state.batch_api.run_batch(&request).unwrap();

    assert_eq!(serials(&result), vec!["F25 00000", "F25 00001"]);
    assert_eq!(labels(&result), vec!["", ""]);
    assert!(result.records.iter().all(|r| r.part_code == "L-77"));
    assert!(state.component_api.list_components().unwrap().is_empty());

    // 有历史状态后无需再提供编码
    let request = BatchRequest::new(1, 1, vec![ComponentRequest::new("LOOSE", 1)]);
    let result = state.batch_api.run_batch(&request).unwrap();
    assert_eq!(result.records[0].serial, "F25 00002");
    assert_eq!(result.records[0].part_code, "L-77");
}

#[test]
fn test_label_without_indexing_or_prefix() {
    let (_dir, state) = create_test_state(june_2025());
    state
        .component_api
        .add_component(
            ComponentDefinition::new("PSU", "P-1")
                .with_card_prefix("PWR")
                .without_indexing(),
        )
        .unwrap();
    state
        .component_api
        .add_component(ComponentDefinition::new("CABLE", "C-1"))
        .unwrap();

    let request = BatchRequest::new(
        1,
        1,
        vec![
            ComponentRequest::new("PSU", 2),
            ComponentRequest::new("CABLE", 1),
        ],
    );
    let result = state.batch_api.run_batch(&request).unwrap();
    assert_eq!(labels(&result), vec!["PWR", "PWR", ""]);
}

#[test]
fn test_policy_preserved_unless_supplied() {
    let (_dir, state) = create_test_state(june_2025());
    state
        .component_api
        .add_component(sensor().with_index_policy(IndexPolicy::FixedOffset(7)))
        .unwrap();

    let request = BatchRequest::new(1, 1, vec![ComponentRequest::new("SENSOR", 2)]);
    let result = state.batch_api.run_batch(&request).unwrap();
    assert_eq!(labels(&result), vec!["SU7", "SU8"]);
    assert_eq!(
        state.component_api.get_component("SENSOR").unwrap().index_policy,
        IndexPolicy::FixedOffset(7)
    );

    let request = BatchRequest::new(
        1,
        1,
        vec![ComponentRequest::new("SENSOR", 3).with_index_policy(IndexPolicy::Cyclic(vec![2, 4]))],
    );
    let result = state.batch_api.run_batch(&request).unwrap();
    assert_eq!(labels(&result), vec!["SU2", "SU4", "SU2"]);
    assert_eq!(
        state.component_api.get_component("SENSOR").unwrap().index_policy,
        IndexPolicy::Cyclic(vec![2, 4])
    );
}

#[test]
fn test_policy_always_overwrite() {
    let dir = TempDir::new().unwrap();
    let state = open_state(&dir, june_2025(), PolicyWriteBack::AlwaysOverwrite);
    state
        .component_api
        .add_component(sensor().with_index_policy(IndexPolicy::FixedOffset(7)))
        .unwrap();

    let request = BatchRequest::new(1, 1, vec![ComponentRequest::new("SENSOR", 1)]);
    let result = state.batch_api.run_batch(&request).unwrap();

    // 本次仍按已存储策略生成标签，结束后被清空为未设置
    assert_eq!(labels(&result), vec!["SU7"]);
    assert_eq!(
        state.component_api.get_component("SENSOR").unwrap().index_policy,
        IndexPolicy::Sequential
    );
}

#[test]
fn test_part_code_follows_registry() {
    let (_dir, state) = create_test_state(june_2025());
    state.component_api.add_component(sensor()).unwrap();

    let request = BatchRequest::new(1, 1, vec![ComponentRequest::new("SENSOR", 1)]);
    state.batch_api.run_batch(&request).unwrap();

    state
        .component_api
        .update_component("SENSOR", ComponentDefinition::new("SENSOR", "XYZ789").with_card_prefix("SU"))
        .unwrap();
    let result = state.batch_api.run_batch(&request).unwrap();

    assert_eq!(result.records[0].part_code, "XYZ789");
    let states = state.serial_api.list_states().unwrap();
    assert_eq!(states[0].associated_code.as_deref(), Some("XYZ789"));
}

#[test]
fn test_serial_uses_allocation_month() {
    let dir = TempDir::new().unwrap();
    let october = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();

    let state = open_state(&dir, june_2025(), PolicyWriteBack::default());
    state.component_api.add_component(sensor()).unwrap();
    let request = BatchRequest::new(1, 1, vec![ComponentRequest::new("SENSOR", 1)]);
    state.batch_api.run_batch(&request).unwrap();
    drop(state);

    let state = open_state(&dir, october, PolicyWriteBack::default());
    let result = state.batch_api.run_batch(&request).unwrap();
    assert_eq!(result.records[0].serial, "J25 00001");
}

#[test]
fn test_run_ids_are_unique() {
    let (_dir, state) = create_test_state(june_2025());
    state.component_api.add_component(sensor()).unwrap();

    let request = BatchRequest::new(1, 1, vec![ComponentRequest::new("SENSOR", 1)]);
    let a = state.batch_api.run_batch(&request).unwrap();
    let b = state.batch_api.run_batch(&request).unwrap();
    assert_ne!(a.run_id, b.run_id);
}

#[test]
fn test_counter_range_overflow_rejected() {
    let (_dir, state) = create_test_state(june_2025());
    state.component_api.add_component(sensor()).unwrap();

    let request = BatchRequest::new(
        2,
        1,
        vec![ComponentRequest::new("SENSOR", 1).with_override(i64::MAX)],
    );
    assert!(matches!(
        state.batch_api.run_batch(&request),
        Err(ApiError::InvalidOverride(_))
    ));

    // 区间正好到上限: 回写值 i64::MAX 仍可表示
    let request = BatchRequest::new(
        1,
        1,
        vec![ComponentRequest::new("SENSOR", 1).with_override(i64::MAX - 1)],
    );
    state.batch_api.run_batch(&request).unwrap();
    assert_eq!(state.serial_api.get_last("SENSOR").unwrap(), i64::MAX - 1);
    assert_eq!(
        state.component_api.get_component("SENSOR").unwrap().resume_serial,
        Some(i64::MAX)
    );

    // 计数器已到顶，不带覆写的批次被拒绝且状态不变
    let request = BatchRequest::new(1, 1, vec![ComponentRequest::new("SENSOR", 1)]);
    assert!(matches!(
        state.batch_api.run_batch(&request),
        Err(ApiError::InvalidOverride(_))
    ));
    assert_eq!(state.serial_api.get_last("SENSOR").unwrap(), i64::MAX - 1);

    // 锁未被毒化，后续调用照常
    let request = BatchRequest::new(1, 1, vec![ComponentRequest::new("SENSOR", 1).with_override(0)]);
    let result = state.batch_api.run_batch(&request).unwrap();
    assert_eq!(serials(&result), vec!["F25 00000"]);
}

#[test]
fn test_fixed_offset_overflow_rejected() {
    let (_dir, state) = create_test_state(june_2025());
    state
        .component_api
        .add_component(sensor().with_index_policy(IndexPolicy::FixedOffset(i64::MAX)))
        .unwrap();

    let request = BatchRequest::new(1, 1, vec![ComponentRequest::new("SENSOR", 2)]);
    assert!(matches!(
        state.batch_api.run_batch(&request),
        Err(ApiError::InvalidOverride(_))
    ));
    assert!(state.serial_api.list_states().unwrap().is_empty());

    let request = BatchRequest::new(1, 1, vec![ComponentRequest::new("SENSOR", 1)]);
    let result = state.batch_api.run_batch(&request).unwrap();
    assert_eq!(labels(&result), vec![format!("SU{}", i64::MAX)]);
}

#[test]
fn test_auto_policy_in_request_clears_stored_policy() {
    let (_dir, state) = create_test_state(june_2025());
    state
        .component_api
        .add_component(sensor().with_index_policy(IndexPolicy::FixedOffset(7)))
        .unwrap();

    let components: Vec<ComponentRequest> = serde_json::from_str(
        r#"[{"name": "SENSOR", "quantity_per_bus": 2, "index_policy": "AUTO"}]"#,
    )
    .unwrap();
    let result = state
        .batch_api
        .run_batch(&BatchRequest::new(1, 1, components))
        .unwrap();

    assert_eq!(labels(&result), vec!["SU1", "SU2"]);
    assert_eq!(
        state.component_api.get_component("SENSOR").unwrap().index_policy,
        IndexPolicy::Sequential
    );
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::Utc;
use schedrs::domain::models::recurrence::{
    CrontabRule, CrontabSpec, IntervalRule, Recurrence, RecurrencePeriod, RecurrenceSpec,
};
use schedrs::domain::models::schedule_entry::{NewScheduleEntry, ScheduleEntry};
use serde_json::{json, Map};
use validator::Validate;

fn entry_fixture() -> ScheduleEntry {
    ScheduleEntry {
        id: 1,
        name: "nightly-report".to_string(),
        task: "reports.generate".to_string(),
        interval: None,
        crontab: None,
        arguments: "[]".to_string(),
        keyword_arguments: "{}".to_string(),
        queue: None,
        exchange: None,
        routing_key: None,
        expires: None,
        enabled: true,
        last_run_at: None,
        total_run_count: 0,
        date_changed: Utc::now().into(),
    }
}

/// 测试位置参数解码
#[test]
fn test_args_decode() {
    let mut entry = entry_fixture();
    entry.arguments = r#"[1,"two",3.5]"#.to_string();

    let args = entry.args().unwrap();
    assert_eq!(args, vec![json!(1), json!("two"), json!(3.5)]);
}

/// 测试关键字参数解码
#[test]
fn test_kwargs_decode() {
    let mut entry = entry_fixture();
    entry.keyword_arguments = r#"{"retries":3,"queue":"low"}"#.to_string();

    let kwargs = entry.kwargs().unwrap();
    assert_eq!(kwargs.get("retries"), Some(&json!(3)));
    assert_eq!(kwargs.get("queue"), Some(&json!("low")));
}

/// 测试损坏的序列化参数被当作硬错误
///
/// 参数文本无法解码属于数据完整性故障，读取方必须拿到错误而不是空值。
#[test]
fn test_malformed_arguments_surface_as_error() {
    let mut entry = entry_fixture();
    entry.arguments = "{not json".to_string();
    entry.keyword_arguments = "[wrong shape".to_string();

    assert!(entry.args().is_err());
    assert!(entry.kwargs().is_err());
}

/// 测试周期解析优先取间隔规则
///
/// 两种规则同时设置属于建模歧义，实现上以先检查的间隔规则为准。
#[test]
fn test_schedule_prefers_interval_over_crontab() {
    let mut entry = entry_fixture();
    entry.interval = Some(IntervalRule {
        id: 10,
        every: 60,
        period: RecurrencePeriod::Seconds,
    });
    entry.crontab = Some(CrontabRule {
        id: 20,
        spec: CrontabSpec::default(),
    });

    match entry.schedule().unwrap() {
        Some(Recurrence::Interval(d)) => assert_eq!(d, chrono::Duration::seconds(60)),
        other => panic!("expected interval recurrence, got {:?}", other),
    }
}

/// 测试仅设置 crontab 规则时的周期解析
#[test]
fn test_schedule_uses_crontab_when_interval_absent() {
    let mut entry = entry_fixture();
    entry.crontab = Some(CrontabRule {
        id: 20,
        spec: CrontabSpec {
            minute: "0".to_string(),
            hour: "3".to_string(),
            ..Default::default()
        },
    });

    assert!(matches!(
        entry.schedule().unwrap(),
        Some(Recurrence::Crontab(_))
    ));
}

/// 测试无规则条目解析为"无调度"
///
/// 执行引擎必须跳过这类条目而不是报错。
#[test]
fn test_schedule_none_when_unscheduled() {
    let entry = entry_fixture();
    assert!(entry.schedule().unwrap().is_none());
}

/// 测试人类可读的条目摘要
#[test]
fn test_display_contains_identity() {
    let entry = entry_fixture();
    let dump = entry.to_string();

    assert!(dump.contains("[ScheduleEntry]"));
    assert!(dump.contains("name: nightly-report"));
    assert!(dump.contains("task: reports.generate"));
}

/// 测试创建草稿的参数编码往返
#[test]
fn test_draft_encoding_round_trip() {
    let mut draft = NewScheduleEntry::new(
        "sync-users",
        "users.sync",
        RecurrenceSpec::Interval {
            run_every: chrono::Duration::seconds(300),
            period: None,
        },
    );
    draft.args = vec![json!("eu-west"), json!(50)];
    let mut kwargs = Map::new();
    kwargs.insert("dry_run".to_string(), json!(false));
    draft.kwargs = kwargs.clone();

    let decoded_args: Vec<serde_json::Value> =
        serde_json::from_str(&draft.encoded_args().unwrap()).unwrap();
    assert_eq!(decoded_args, draft.args);

    let decoded_kwargs: Map<String, serde_json::Value> =
        serde_json::from_str(&draft.encoded_kwargs().unwrap()).unwrap();
    assert_eq!(decoded_kwargs, kwargs);
}

/// 测试创建草稿的校验规则
#[test]
fn test_draft_validation() {
    let valid = NewScheduleEntry::new(
        "ok",
        "tasks.noop",
        RecurrenceSpec::Crontab(CrontabSpec::default()),
    );
    assert!(valid.validate().is_ok());

    let empty_name = NewScheduleEntry::new(
        "",
        "tasks.noop",
        RecurrenceSpec::Crontab(CrontabSpec::default()),
    );
    assert!(empty_name.validate().is_err());

    let empty_task = NewScheduleEntry::new(
        "ok",
        "",
        RecurrenceSpec::Crontab(CrontabSpec::default()),
    );
    assert!(empty_task.validate().is_err());
}

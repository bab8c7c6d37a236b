// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::super::helpers::{create_test_app, TestProject, TestProjectResolver};
use chrono::{Duration, TimeZone, Utc};
use schedrs::domain::models::owner::{OwnerAssociation, ScheduleOwner};
use schedrs::domain::models::recurrence::RecurrenceSpec;
use schedrs::domain::models::schedule_entry::NewScheduleEntry;
use schedrs::domain::repositories::schedule_task_repository::ScheduleTaskRepository;
use schedrs::infrastructure::database::entities::{schedule_entry, schedule_task_association};
use schedrs::infrastructure::registry::OwnerRegistry;
use schedrs::infrastructure::repositories::schedule_task_repo_impl::ScheduleTaskRepositoryImpl;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use serde_json::json;
use std::sync::Arc;

fn hourly_draft(name: &str) -> NewScheduleEntry {
    NewScheduleEntry::new(
        name,
        "tasks.heartbeat",
        RecurrenceSpec::Interval {
            run_every: Duration::seconds(3600),
            period: None,
        },
    )
}

/// 测试关联的往返查询
///
/// 创建后按属性标签过滤查询应命中同一条目，其他标签应为空。
#[tokio::test]
async fn test_association_round_trip() {
    let app = create_test_app().await;
    let repo = ScheduleTaskRepositoryImpl::new(app.db.clone());
    let owner = TestProject { id: 7 };

    let created = owner
        .create_schedule_tasks(&repo, hourly_draft("sync"), "foo", Some("nightly sync".into()))
        .await
        .unwrap();

    let tagged = owner.get_schedule_tasks(&repo, Some("foo")).await.unwrap();
    assert_eq!(tagged.len(), 1);
    assert_eq!(tagged[0].id, created.id);
    assert_eq!(tagged[0].name, "sync");

    let other_tag = owner.get_schedule_tasks(&repo, Some("bar")).await.unwrap();
    assert!(other_tag.is_empty());

    let all = owner.schedule_tasks(&repo).await.unwrap();
    assert_eq!(all.len(), 1);

    // A different owner sees nothing
    let stranger = TestProject { id: 8 };
    assert!(stranger.schedule_tasks(&repo).await.unwrap().is_empty());
}

/// 测试参数的编码解码往返
#[tokio::test]
async fn test_args_kwargs_round_trip() {
    let app = create_test_app().await;
    let repo = ScheduleTaskRepositoryImpl::new(app.db.clone());
    let owner = TestProject { id: 7 };

    let mut draft = hourly_draft("with-args");
    draft.args = vec![json!("eu-west"), json!(50), json!(null)];
    draft
        .kwargs
        .insert("dry_run".to_string(), json!(false));
    draft.queue = Some("reports".to_string());
    draft.routing_key = Some("reports.low".to_string());

    let created = owner
        .create_schedule_tasks(&repo, draft.clone(), "args", None)
        .await
        .unwrap();

    let found = repo.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(found.args().unwrap(), draft.args);
    assert_eq!(found.kwargs().unwrap(), draft.kwargs);
    assert_eq!(found.queue.as_deref(), Some("reports"));
    assert_eq!(found.routing_key.as_deref(), Some("reports.low"));
}

/// 测试创建路径复用去重后的周期规则
///
/// 两个条目使用相同的间隔说明时必须指向同一条规则行。
#[tokio::test]
async fn test_recurrence_shared_between_entries() {
    let app = create_test_app().await;
    let repo = ScheduleTaskRepositoryImpl::new(app.db.clone());
    let owner = TestProject { id: 7 };

    let first = owner
        .create_schedule_tasks(&repo, hourly_draft("a"), "", None)
        .await
        .unwrap();
    let second = owner
        .create_schedule_tasks(&repo, hourly_draft("b"), "", None)
        .await
        .unwrap();

    let first_rule = first.interval.expect("interval rule set");
    let second_rule = second.interval.expect("interval rule set");
    assert_eq!(first_rule.id, second_rule.id);
}

/// 测试 date_changed 由存储层强制维护
///
/// 插入与更新时调用方写入的值都会被当前时间覆盖。
#[tokio::test]
async fn test_date_changed_is_store_maintained() {
    let app = create_test_app().await;

    let stale = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap().fixed_offset();

    // Insert with a caller-supplied timestamp
    let inserted = schedule_entry::ActiveModel {
        name: Set("manual".to_string()),
        task: Set("tasks.noop".to_string()),
        arguments: Set("[]".to_string()),
        keyword_arguments: Set("{}".to_string()),
        enabled: Set(true),
        total_run_count: Set(0),
        date_changed: Set(stale),
        ..Default::default()
    }
    .insert(app.db.as_ref())
    .await
    .unwrap();
    assert!(inserted.date_changed > stale);

    let after_insert = inserted.date_changed;

    // Update with another stale timestamp
    let mut active: schedule_entry::ActiveModel = inserted.into();
    active.enabled = Set(false);
    active.date_changed = Set(stale);
    let updated = active.update(app.db.as_ref()).await.unwrap();

    assert!(updated.date_changed > stale);
    assert!(updated.date_changed >= after_insert);
    assert!(!updated.enabled);
}

/// 测试启用操作
///
/// 启用恢复 enabled 标志、返回受影响条目，且不触碰任何关联。
#[tokio::test]
async fn test_enable_task_restores_entries_without_touching_associations() {
    let app = create_test_app().await;
    let repo = ScheduleTaskRepositoryImpl::new(app.db.clone());
    let owner = TestProject { id: 7 };

    owner
        .create_schedule_tasks(&repo, hourly_draft("one"), "x", None)
        .await
        .unwrap();
    owner
        .create_schedule_tasks(&repo, hourly_draft("two"), "x", None)
        .await
        .unwrap();

    // Knock both entries down without going through disable_task
    for entry in owner.schedule_tasks(&repo).await.unwrap() {
        let model = schedule_entry::Entity::find_by_id(entry.id)
            .one(app.db.as_ref())
            .await
            .unwrap()
            .unwrap();
        let mut active: schedule_entry::ActiveModel = model.into();
        active.enabled = Set(false);
        active.update(app.db.as_ref()).await.unwrap();
    }

    let affected = owner.enable_task(&repo, Some("x")).await.unwrap();
    assert_eq!(affected.len(), 2);
    assert!(affected.iter().all(|e| e.enabled));

    let assoc_count = schedule_task_association::Entity::find()
        .count(app.db.as_ref())
        .await
        .unwrap();
    assert_eq!(assoc_count, 2);
}

/// 测试停用操作
///
/// 停用将匹配条目置为禁用，并逐条删除本所有者的一条关联；
/// 不匹配属性标签的条目不受影响。
#[tokio::test]
async fn test_disable_task_removes_one_association_per_entry() {
    let app = create_test_app().await;
    let repo = ScheduleTaskRepositoryImpl::new(app.db.clone());
    let owner = TestProject { id: 7 };

    owner
        .create_schedule_tasks(&repo, hourly_draft("one"), "x", None)
        .await
        .unwrap();
    owner
        .create_schedule_tasks(&repo, hourly_draft("two"), "x", None)
        .await
        .unwrap();
    let keeper = owner
        .create_schedule_tasks(&repo, hourly_draft("keep"), "y", None)
        .await
        .unwrap();

    let affected = owner.disable_task(&repo, Some("x")).await.unwrap();
    assert_eq!(affected.len(), 2);
    assert!(affected.iter().all(|e| !e.enabled));

    // Only the "y" association survives
    let remaining = owner.schedule_tasks(&repo).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, keeper.id);
    assert!(remaining[0].enabled);

    // The disabled entries themselves are still stored
    let disabled = schedule_entry::Entity::find()
        .filter(schedule_entry::Column::Enabled.eq(false))
        .count(app.db.as_ref())
        .await
        .unwrap();
    assert_eq!(disabled, 2);
}

/// 测试停用只解除本所有者的关联
///
/// 同一条目被多个所有者共享时，其他所有者的关联保持不动。
#[tokio::test]
async fn test_disable_only_detaches_this_owners_association() {
    let app = create_test_app().await;
    let repo = ScheduleTaskRepositoryImpl::new(app.db.clone());
    let owner = TestProject { id: 7 };

    let entry = owner
        .create_schedule_tasks(&repo, hourly_draft("shared"), "x", None)
        .await
        .unwrap();

    // A second owner links to the same entry
    schedule_task_association::ActiveModel {
        task_id: Set(entry.id),
        discriminator: Set("TestProject".to_string()),
        discriminator_id: Set(99),
        attribute: Set("x".to_string()),
        description: Set(None),
        ..Default::default()
    }
    .insert(app.db.as_ref())
    .await
    .unwrap();

    owner.disable_task(&repo, Some("x")).await.unwrap();

    let survivors = repo.associations_for_entry(entry.id).await.unwrap();
    assert_eq!(survivors.len(), 1);
    assert_eq!(survivors[0].discriminator_id, 99);
}

/// 测试执行记录的回写
#[tokio::test]
async fn test_record_run_updates_bookkeeping() {
    let app = create_test_app().await;
    let repo = ScheduleTaskRepositoryImpl::new(app.db.clone());
    let owner = TestProject { id: 7 };

    let entry = owner
        .create_schedule_tasks(&repo, hourly_draft("runner"), "", None)
        .await
        .unwrap();
    assert_eq!(entry.total_run_count, 0);
    assert!(entry.last_run_at.is_none());

    let once = repo.record_run(entry.id).await.unwrap();
    assert_eq!(once.total_run_count, 1);
    assert!(once.last_run_at.is_some());

    let twice = repo.record_run(entry.id).await.unwrap();
    assert_eq!(twice.total_run_count, 2);
}

/// 测试执行引擎的条目枚举
///
/// 只返回启用且设置了周期规则的条目。
#[tokio::test]
async fn test_find_enabled_filters_disabled_and_unscheduled() {
    let app = create_test_app().await;
    let repo = ScheduleTaskRepositoryImpl::new(app.db.clone());
    let owner = TestProject { id: 7 };

    let active = owner
        .create_schedule_tasks(&repo, hourly_draft("active"), "", None)
        .await
        .unwrap();

    owner
        .create_schedule_tasks(&repo, hourly_draft("dormant"), "off", None)
        .await
        .unwrap();
    owner.disable_task(&repo, Some("off")).await.unwrap();

    // Enabled but without any recurrence rule
    schedule_entry::ActiveModel {
        name: Set("unscheduled".to_string()),
        task: Set("tasks.noop".to_string()),
        arguments: Set("[]".to_string()),
        keyword_arguments: Set("{}".to_string()),
        enabled: Set(true),
        total_run_count: Set(0),
        date_changed: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(app.db.as_ref())
    .await
    .unwrap();

    let enabled = repo.find_enabled().await.unwrap();
    assert_eq!(enabled.len(), 1);
    assert_eq!(enabled[0].id, active.id);
    assert!(enabled[0].interval.is_some());
}

/// 测试父级所有者的动态解析
///
/// 已注册类型按主键取回；未注册类型与消失的行都解析为未找到。
#[tokio::test]
async fn test_resolve_parent_via_registry() {
    let app = create_test_app().await;
    let registry = Arc::new(OwnerRegistry::new());
    registry.register(
        "TestProject",
        Arc::new(TestProjectResolver { known: vec![7] }),
    );
    let repo = ScheduleTaskRepositoryImpl::with_registry(app.db.clone(), registry);
    let owner = TestProject { id: 7 };

    let entry = owner
        .create_schedule_tasks(&repo, hourly_draft("owned"), "", None)
        .await
        .unwrap();

    let assocs = repo.associations_for_entry(entry.id).await.unwrap();
    assert_eq!(assocs.len(), 1);
    assert_eq!(assocs[0].owner_identity().to_string(), "TestProject:7");

    let parent = repo.resolve_parent(&assocs[0]).await.unwrap();
    let handle = parent.expect("registered owner should resolve");
    assert_eq!(handle.downcast_ref::<TestProject>().unwrap().id, 7);

    // Unregistered discriminator resolves to none, not an error
    let ghost = OwnerAssociation {
        id: 0,
        task_id: entry.id,
        discriminator: "Ghost".to_string(),
        discriminator_id: 7,
        attribute: String::new(),
        description: None,
    };
    assert!(repo.resolve_parent(&ghost).await.unwrap().is_none());

    // Registered discriminator whose row is gone resolves to none
    let vanished = OwnerAssociation {
        id: 0,
        task_id: entry.id,
        discriminator: "TestProject".to_string(),
        discriminator_id: 404,
        attribute: String::new(),
        description: None,
    };
    assert!(repo.resolve_parent(&vanished).await.unwrap().is_none());
}

/// 测试调用方管理的事务边界
///
/// 批量创建在同一个外部事务内执行，提交后整体可见。
#[tokio::test]
async fn test_create_in_caller_owned_transaction() {
    let app = create_test_app().await;
    let repo = ScheduleTaskRepositoryImpl::new(app.db.clone());
    let owner = TestProject { id: 7 };

    let txn = app.db.begin().await.unwrap();
    owner
        .create_schedule_tasks_in(&repo, &txn, hourly_draft("batch-a"), "batch", None)
        .await
        .unwrap();
    owner
        .create_schedule_tasks_in(&repo, &txn, hourly_draft("batch-b"), "batch", None)
        .await
        .unwrap();
    txn.commit().await.unwrap();

    let entries = owner.get_schedule_tasks(&repo, Some("batch")).await.unwrap();
    assert_eq!(entries.len(), 2);
}

/// 测试草稿校验在落库前生效
#[tokio::test]
async fn test_invalid_draft_is_rejected() {
    let app = create_test_app().await;
    let repo = ScheduleTaskRepositoryImpl::new(app.db.clone());
    let owner = TestProject { id: 7 };

    let result = owner
        .create_schedule_tasks(&repo, hourly_draft(""), "", None)
        .await;
    assert!(result.is_err());

    let count = schedule_entry::Entity::find()
        .count(app.db.as_ref())
        .await
        .unwrap();
    assert_eq!(count, 0);
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::domain::models::owner::{OwnerAssociation, OwnerIdentity};
use crate::domain::models::recurrence::RecurrenceSpec;
use crate::domain::models::schedule_entry::{NewScheduleEntry, ScheduleEntry};
use crate::domain::repositories::schedule_task_repository::{
    OwnerHandle, RepositoryError, ScheduleTaskRepository,
};
use crate::infrastructure::database::entities::{
    schedule_entry, schedule_task_association,
};
use crate::infrastructure::registry::OwnerRegistry;
use crate::infrastructure::repositories::recurrence_repo_impl::{
    resolve_crontab_on, resolve_interval_on,
};

/// 调度条目仓库实现
///
/// 基于SeaORM实现的调度条目与所有者关联数据访问层。
/// 所有变更操作在单个事务内完成读改写；带 `_in` 后缀的入口
/// 在调用方事务内执行，由调用方决定提交边界。
#[derive(Clone)]
pub struct ScheduleTaskRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
    /// 所有者类型注册表
    registry: Arc<OwnerRegistry>,
}

impl ScheduleTaskRepositoryImpl {
    /// 创建新的调度条目仓库实例，使用进程级注册表
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            registry: OwnerRegistry::global(),
        }
    }

    /// 创建使用指定注册表的仓库实例
    pub fn with_registry(db: Arc<DatabaseConnection>, registry: Arc<OwnerRegistry>) -> Self {
        Self { db, registry }
    }
}

impl From<schedule_task_association::Model> for OwnerAssociation {
    fn from(model: schedule_task_association::Model) -> Self {
        Self {
            id: model.id,
            task_id: model.task_id,
            discriminator: model.discriminator,
            discriminator_id: model.discriminator_id,
            attribute: model.attribute,
            description: model.description,
        }
    }
}

/// 装配条目的周期规则外键
async fn hydrate<C: ConnectionTrait>(
    conn: &C,
    model: schedule_entry::Model,
) -> Result<ScheduleEntry, RepositoryError> {
    use crate::infrastructure::database::entities::{crontab_schedule, interval_schedule};

    let interval = match model.interval_id {
        Some(id) => interval_schedule::Entity::find_by_id(id)
            .one(conn)
            .await?
            .map(Into::into),
        None => None,
    };
    let crontab = match model.crontab_id {
        Some(id) => crontab_schedule::Entity::find_by_id(id)
            .one(conn)
            .await?
            .map(Into::into),
        None => None,
    };

    Ok(ScheduleEntry {
        id: model.id,
        name: model.name,
        task: model.task,
        interval,
        crontab,
        arguments: model.arguments,
        keyword_arguments: model.keyword_arguments,
        queue: model.queue,
        exchange: model.exchange,
        routing_key: model.routing_key,
        expires: model.expires,
        enabled: model.enabled,
        last_run_at: model.last_run_at,
        total_run_count: model.total_run_count,
        date_changed: model.date_changed,
    })
}

/// 某所有者的关联查询，可按属性标签精确过滤
fn owner_query(
    owner: &OwnerIdentity,
    attribute: Option<&str>,
) -> sea_orm::Select<schedule_task_association::Entity> {
    let mut query = schedule_task_association::Entity::find()
        .filter(schedule_task_association::Column::Discriminator.eq(&owner.discriminator))
        .filter(schedule_task_association::Column::DiscriminatorId.eq(owner.discriminator_id));
    if let Some(attr) = attribute {
        query = query.filter(schedule_task_association::Column::Attribute.eq(attr));
    }
    query
}

/// 在给定连接上创建条目与关联
async fn create_on<C: ConnectionTrait>(
    conn: &C,
    owner: &OwnerIdentity,
    draft: NewScheduleEntry,
    attribute: &str,
    description: Option<String>,
) -> Result<ScheduleEntry, RepositoryError> {
    draft.validate()?;

    // Resolve the recurrence first so the rule row shares this transaction
    let (interval_id, crontab_id, interval, crontab) = match &draft.rule {
        RecurrenceSpec::Interval { run_every, period } => {
            let model = resolve_interval_on(conn, *run_every, *period).await?;
            (Some(model.id), None, Some(model.into()), None)
        }
        RecurrenceSpec::Crontab(spec) => {
            let model = resolve_crontab_on(conn, spec).await?;
            (None, Some(model.id), None, Some(model.into()))
        }
    };

    let arguments = draft.encoded_args()?;
    let keyword_arguments = draft.encoded_kwargs()?;

    let entry = schedule_entry::ActiveModel {
        name: Set(draft.name),
        task: Set(draft.task),
        interval_id: Set(interval_id),
        crontab_id: Set(crontab_id),
        arguments: Set(arguments),
        keyword_arguments: Set(keyword_arguments),
        queue: Set(draft.queue),
        exchange: Set(draft.exchange),
        routing_key: Set(draft.routing_key),
        expires: Set(draft.expires),
        enabled: Set(true),
        last_run_at: Set(None),
        total_run_count: Set(0),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    schedule_task_association::ActiveModel {
        task_id: Set(entry.id),
        discriminator: Set(owner.discriminator.clone()),
        discriminator_id: Set(owner.discriminator_id),
        attribute: Set(attribute.to_string()),
        description: Set(description),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    info!(entry_id = entry.id, owner = %owner, attribute, "schedule entry created");
    metrics::counter!("schedrs_schedule_entries_created_total").increment(1);

    Ok(ScheduleEntry {
        id: entry.id,
        name: entry.name,
        task: entry.task,
        interval,
        crontab,
        arguments: entry.arguments,
        keyword_arguments: entry.keyword_arguments,
        queue: entry.queue,
        exchange: entry.exchange,
        routing_key: entry.routing_key,
        expires: entry.expires,
        enabled: entry.enabled,
        last_run_at: entry.last_run_at,
        total_run_count: entry.total_run_count,
        date_changed: entry.date_changed,
    })
}

#[async_trait]
impl ScheduleTaskRepository for ScheduleTaskRepositoryImpl {
    async fn create_for_owner(
        &self,
        owner: &OwnerIdentity,
        draft: NewScheduleEntry,
        attribute: &str,
        description: Option<String>,
    ) -> Result<ScheduleEntry, RepositoryError> {
        let txn = self.db.begin().await?;
        let entry = create_on(&txn, owner, draft, attribute, description).await?;
        txn.commit().await?;
        Ok(entry)
    }

    async fn create_for_owner_in(
        &self,
        txn: &DatabaseTransaction,
        owner: &OwnerIdentity,
        draft: NewScheduleEntry,
        attribute: &str,
        description: Option<String>,
    ) -> Result<ScheduleEntry, RepositoryError> {
        create_on(txn, owner, draft, attribute, description).await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<ScheduleEntry>, RepositoryError> {
        let model = schedule_entry::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        match model {
            Some(model) => Ok(Some(hydrate(self.db.as_ref(), model).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_owner(
        &self,
        owner: &OwnerIdentity,
        attribute: Option<&str>,
    ) -> Result<Vec<ScheduleEntry>, RepositoryError> {
        let pairs = owner_query(owner, attribute)
            .find_also_related(schedule_entry::Entity)
            .order_by_asc(schedule_task_association::Column::Id)
            .all(self.db.as_ref())
            .await?;

        let mut entries = Vec::with_capacity(pairs.len());
        for (_assoc, entry) in pairs {
            if let Some(model) = entry {
                entries.push(hydrate(self.db.as_ref(), model).await?);
            }
        }
        Ok(entries)
    }

    async fn find_enabled(&self) -> Result<Vec<ScheduleEntry>, RepositoryError> {
        let models = schedule_entry::Entity::find()
            .filter(schedule_entry::Column::Enabled.eq(true))
            .filter(
                Condition::any()
                    .add(schedule_entry::Column::IntervalId.is_not_null())
                    .add(schedule_entry::Column::CrontabId.is_not_null()),
            )
            .order_by_asc(schedule_entry::Column::Id)
            .all(self.db.as_ref())
            .await?;

        let mut entries = Vec::with_capacity(models.len());
        for model in models {
            entries.push(hydrate(self.db.as_ref(), model).await?);
        }
        Ok(entries)
    }

    async fn enable_for_owner(
        &self,
        owner: &OwnerIdentity,
        attribute: Option<&str>,
    ) -> Result<Vec<ScheduleEntry>, RepositoryError> {
        let txn = self.db.begin().await?;

        let pairs = owner_query(owner, attribute)
            .find_also_related(schedule_entry::Entity)
            .order_by_asc(schedule_task_association::Column::Id)
            .all(&txn)
            .await?;

        let mut affected = Vec::with_capacity(pairs.len());
        for (_assoc, entry) in pairs {
            if let Some(model) = entry {
                let mut active: schedule_entry::ActiveModel = model.into();
                active.enabled = Set(true);
                let updated = active.update(&txn).await?;
                affected.push(hydrate(&txn, updated).await?);
            }
        }

        txn.commit().await?;
        info!(count = affected.len(), owner = %owner, "schedule tasks enabled");
        Ok(affected)
    }

    async fn disable_for_owner(
        &self,
        owner: &OwnerIdentity,
        attribute: Option<&str>,
    ) -> Result<Vec<ScheduleEntry>, RepositoryError> {
        let txn = self.db.begin().await?;

        let pairs = owner_query(owner, attribute)
            .find_also_related(schedule_entry::Entity)
            .order_by_asc(schedule_task_association::Column::Id)
            .all(&txn)
            .await?;

        let mut affected = Vec::with_capacity(pairs.len());
        for (assoc, entry) in pairs {
            if let Some(model) = entry {
                let mut active: schedule_entry::ActiveModel = model.into();
                active.enabled = Set(false);
                let updated = active.update(&txn).await?;

                // 只解除本所有者指向该条目的这条关联；
                // 其他所有者的关联保持不动
                assoc.delete(&txn).await?;

                affected.push(hydrate(&txn, updated).await?);
            }
        }

        txn.commit().await?;
        info!(count = affected.len(), owner = %owner, "schedule tasks disabled");
        Ok(affected)
    }

    async fn record_run(&self, id: i32) -> Result<ScheduleEntry, RepositoryError> {
        let model = schedule_entry::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let run_count = model.total_run_count;
        let mut active: schedule_entry::ActiveModel = model.into();
        active.last_run_at = Set(Some(Utc::now().into()));
        active.total_run_count = Set(run_count + 1);

        let updated = active.update(self.db.as_ref()).await?;
        hydrate(self.db.as_ref(), updated).await
    }

    async fn associations_for_entry(
        &self,
        entry_id: i32,
    ) -> Result<Vec<OwnerAssociation>, RepositoryError> {
        let models = schedule_task_association::Entity::find()
            .filter(schedule_task_association::Column::TaskId.eq(entry_id))
            .order_by_asc(schedule_task_association::Column::Id)
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn resolve_parent(
        &self,
        assoc: &OwnerAssociation,
    ) -> Result<Option<OwnerHandle>, RepositoryError> {
        self.registry
            .resolve(
                self.db.as_ref(),
                &assoc.discriminator,
                assoc.discriminator_id,
            )
            .await
    }
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::Duration;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

use crate::domain::models::recurrence::{CrontabRule, CrontabSpec, IntervalRule, RecurrencePeriod};
use crate::domain::repositories::recurrence_repository::RecurrenceRepository;
use crate::domain::repositories::schedule_task_repository::RepositoryError;
use crate::infrastructure::database::entities::{crontab_schedule, interval_schedule};

/// 周期规则仓库实现
///
/// 基于SeaORM实现的周期规则数据访问层。
/// 查找或创建在单个事务内完成，关闭先查后插的竞争窗口；
/// 既有重复行（完整性异常）在解析时被整体清除并重建一行。
#[derive(Clone)]
pub struct RecurrenceRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl RecurrenceRepositoryImpl {
    /// 创建新的周期规则仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<interval_schedule::Model> for IntervalRule {
    fn from(model: interval_schedule::Model) -> Self {
        Self {
            id: model.id,
            every: model.every,
            period: RecurrencePeriod::from_str(&model.period).unwrap_or_default(),
        }
    }
}

impl From<crontab_schedule::Model> for CrontabRule {
    fn from(model: crontab_schedule::Model) -> Self {
        Self {
            id: model.id,
            spec: CrontabSpec {
                minute: model.minute,
                hour: model.hour,
                day_of_week: model.day_of_week,
                day_of_month: model.day_of_month,
                month_of_year: model.month_of_year,
            },
        }
    }
}

/// 在给定连接上解析间隔型规则
///
/// 条目创建在自己的事务里复用此函数，保证规则与条目同事务落库。
pub(crate) async fn resolve_interval_on<C: ConnectionTrait>(
    conn: &C,
    run_every: Duration,
    period: Option<RecurrencePeriod>,
) -> Result<interval_schedule::Model, RepositoryError> {
    // Normalize: seconds, floored at zero; period defaults to seconds
    let every = run_every.num_seconds().max(0);
    let period = period.unwrap_or_default();

    let mut existing = interval_schedule::Entity::find()
        .filter(interval_schedule::Column::Every.eq(every))
        .filter(interval_schedule::Column::Period.eq(period.to_string()))
        .all(conn)
        .await?;

    if existing.len() == 1 {
        return Ok(existing.remove(0));
    }

    if existing.len() > 1 {
        // Should not happen under the uniqueness invariant; sweep and recreate
        warn!(
            count = existing.len(),
            every,
            period = %period,
            "duplicate interval schedules found, repairing"
        );
        metrics::counter!("schedrs_recurrence_repairs_total").increment(1);
        interval_schedule::Entity::delete_many()
            .filter(interval_schedule::Column::Every.eq(every))
            .filter(interval_schedule::Column::Period.eq(period.to_string()))
            .exec(conn)
            .await?;
    }

    let model = interval_schedule::ActiveModel {
        every: Set(every),
        period: Set(period.to_string()),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    Ok(model)
}

/// 在给定连接上解析 crontab 型规则，五字段逐字匹配
pub(crate) async fn resolve_crontab_on<C: ConnectionTrait>(
    conn: &C,
    spec: &CrontabSpec,
) -> Result<crontab_schedule::Model, RepositoryError> {
    let mut existing = crontab_schedule::Entity::find()
        .filter(crontab_schedule::Column::Minute.eq(&spec.minute))
        .filter(crontab_schedule::Column::Hour.eq(&spec.hour))
        .filter(crontab_schedule::Column::DayOfWeek.eq(&spec.day_of_week))
        .filter(crontab_schedule::Column::DayOfMonth.eq(&spec.day_of_month))
        .filter(crontab_schedule::Column::MonthOfYear.eq(&spec.month_of_year))
        .all(conn)
        .await?;

    if existing.len() == 1 {
        return Ok(existing.remove(0));
    }

    if existing.len() > 1 {
        warn!(
            count = existing.len(),
            expression = %spec.cron_expression(),
            "duplicate crontab schedules found, repairing"
        );
        metrics::counter!("schedrs_recurrence_repairs_total").increment(1);
        crontab_schedule::Entity::delete_many()
            .filter(crontab_schedule::Column::Minute.eq(&spec.minute))
            .filter(crontab_schedule::Column::Hour.eq(&spec.hour))
            .filter(crontab_schedule::Column::DayOfWeek.eq(&spec.day_of_week))
            .filter(crontab_schedule::Column::DayOfMonth.eq(&spec.day_of_month))
            .filter(crontab_schedule::Column::MonthOfYear.eq(&spec.month_of_year))
            .exec(conn)
            .await?;
    }

    let model = crontab_schedule::ActiveModel {
        minute: Set(spec.minute.clone()),
        hour: Set(spec.hour.clone()),
        day_of_week: Set(spec.day_of_week.clone()),
        day_of_month: Set(spec.day_of_month.clone()),
        month_of_year: Set(spec.month_of_year.clone()),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    Ok(model)
}

#[async_trait]
impl RecurrenceRepository for RecurrenceRepositoryImpl {
    async fn resolve_interval(
        &self,
        run_every: Duration,
        period: Option<RecurrencePeriod>,
    ) -> Result<IntervalRule, RepositoryError> {
        let txn = self.db.begin().await?;
        let model = resolve_interval_on(&txn, run_every, period).await?;
        txn.commit().await?;

        metrics::counter!("schedrs_recurrence_resolutions_total").increment(1);
        Ok(model.into())
    }

    async fn resolve_crontab(&self, spec: CrontabSpec) -> Result<CrontabRule, RepositoryError> {
        let txn = self.db.begin().await?;
        let model = resolve_crontab_on(&txn, &spec).await?;
        txn.commit().await?;

        metrics::counter!("schedrs_recurrence_resolutions_total").increment(1);
        Ok(model.into())
    }
}

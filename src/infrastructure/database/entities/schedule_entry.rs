// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, Set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "schedule_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub task: String,
    pub interval_id: Option<i32>,
    pub crontab_id: Option<i32>,
    pub arguments: String,
    pub keyword_arguments: String,
    pub queue: Option<String>,
    pub exchange: Option<String>,
    pub routing_key: Option<String>,
    pub expires: Option<DateTimeWithTimeZone>,
    pub enabled: bool,
    pub last_run_at: Option<DateTimeWithTimeZone>,
    pub total_run_count: i32,
    pub date_changed: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::interval_schedule::Entity",
        from = "Column::IntervalId",
        to = "super::interval_schedule::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    IntervalSchedule,
    #[sea_orm(
        belongs_to = "super::crontab_schedule::Entity",
        from = "Column::CrontabId",
        to = "super::crontab_schedule::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    CrontabSchedule,
    #[sea_orm(has_many = "super::schedule_task_association::Entity")]
    Associations,
}

impl Related<super::interval_schedule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IntervalSchedule.def()
    }
}

impl Related<super::crontab_schedule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CrontabSchedule.def()
    }
}

impl Related<super::schedule_task_association::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Associations.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    /// 每次插入与更新前强制刷新 date_changed
    ///
    /// 这是存储层维护的审计时间戳，调用方写入的值一律被覆盖。
    async fn before_save<C>(mut self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        self.date_changed = Set(Utc::now().into());
        Ok(self)
    }
}

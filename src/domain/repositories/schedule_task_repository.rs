// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use sea_orm::{DatabaseTransaction, DbErr};
use std::any::Any;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::models::owner::{OwnerAssociation, OwnerIdentity};
use crate::domain::models::schedule_entry::{NewScheduleEntry, ScheduleEntry};

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
    /// 草稿校验失败
    #[error("Invalid schedule entry: {0}")]
    Validation(#[from] validator::ValidationErrors),
    /// 参数序列化或反序列化失败
    #[error("Malformed arguments payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 类型擦除的所有者句柄，由调用方向下转型
pub type OwnerHandle = Arc<dyn Any + Send + Sync>;

/// 调度条目仓库特质
///
/// 定义调度条目与所有者关联的数据访问接口。
/// 带 `_in` 后缀的方法在调用方持有的事务内执行且不提交，
/// 其余变更方法各自包裹一个事务并提交。
#[async_trait]
pub trait ScheduleTaskRepository: Send + Sync {
    /// 创建调度条目及本所有者的关联，独立事务内提交
    async fn create_for_owner(
        &self,
        owner: &OwnerIdentity,
        draft: NewScheduleEntry,
        attribute: &str,
        description: Option<String>,
    ) -> Result<ScheduleEntry, RepositoryError>;

    /// 在调用方事务内创建调度条目及关联，不提交
    async fn create_for_owner_in(
        &self,
        txn: &DatabaseTransaction,
        owner: &OwnerIdentity,
        draft: NewScheduleEntry,
        attribute: &str,
        description: Option<String>,
    ) -> Result<ScheduleEntry, RepositoryError>;

    /// 根据ID查找条目，规则外键已装配
    async fn find_by_id(&self, id: i32) -> Result<Option<ScheduleEntry>, RepositoryError>;

    /// 枚举某所有者的条目，可按属性标签精确过滤
    async fn find_by_owner(
        &self,
        owner: &OwnerIdentity,
        attribute: Option<&str>,
    ) -> Result<Vec<ScheduleEntry>, RepositoryError>;

    /// 枚举已启用且设置了周期规则的条目，供执行引擎消费
    async fn find_enabled(&self) -> Result<Vec<ScheduleEntry>, RepositoryError>;

    /// 启用某所有者的匹配条目，返回受影响的列表
    async fn enable_for_owner(
        &self,
        owner: &OwnerIdentity,
        attribute: Option<&str>,
    ) -> Result<Vec<ScheduleEntry>, RepositoryError>;

    /// 停用某所有者的匹配条目，并逐条删除该所有者的一条关联
    async fn disable_for_owner(
        &self,
        owner: &OwnerIdentity,
        attribute: Option<&str>,
    ) -> Result<Vec<ScheduleEntry>, RepositoryError>;

    /// 记录一次执行：刷新 last_run_at 并累加 total_run_count
    async fn record_run(&self, id: i32) -> Result<ScheduleEntry, RepositoryError>;

    /// 枚举某条目的全部所有者关联
    async fn associations_for_entry(
        &self,
        entry_id: i32,
    ) -> Result<Vec<OwnerAssociation>, RepositoryError>;

    /// 解析关联的父级所有者
    ///
    /// 类型未注册或所有者行已不存在时返回 `Ok(None)`，不视为错误。
    async fn resolve_parent(
        &self,
        assoc: &OwnerAssociation,
    ) -> Result<Option<OwnerHandle>, RepositoryError>;
}

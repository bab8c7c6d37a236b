// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use sea_orm::DatabaseTransaction;
use std::fmt;

use crate::domain::models::schedule_entry::{NewScheduleEntry, ScheduleEntry};
use crate::domain::repositories::schedule_task_repository::{
    RepositoryError, ScheduleTaskRepository,
};

/// 所有者身份
///
/// 由类型标签与主键值构成，是关联查询的唯一键。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerIdentity {
    /// 所有者类型标签
    pub discriminator: String,
    /// 所有者主键值
    pub discriminator_id: i64,
}

impl OwnerIdentity {
    pub fn new(discriminator: impl Into<String>, discriminator_id: i64) -> Self {
        Self {
            discriminator: discriminator.into(),
            discriminator_id,
        }
    }
}

impl fmt::Display for OwnerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.discriminator, self.discriminator_id)
    }
}

/// 所有者关联
///
/// 记录哪个外部实体创建了某个调度条目。这是弱引用：所有者被删除后
/// 关联仍可能存在，父级解析此时返回"未找到"而不是错误。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerAssociation {
    /// 关联主键
    pub id: i32,
    /// 指向的调度条目
    pub task_id: i32,
    /// 所有者类型标签
    pub discriminator: String,
    /// 所有者主键值
    pub discriminator_id: i64,
    /// 属性子分类标签，默认为空串
    pub attribute: String,
    /// 自由文本描述
    pub description: Option<String>,
}

impl OwnerAssociation {
    /// 提取所有者身份
    pub fn owner_identity(&self) -> OwnerIdentity {
        OwnerIdentity::new(self.discriminator.clone(), self.discriminator_id)
    }
}

/// 调度所有者能力特质
///
/// 任何实体类型实现 `discriminator` 与 `discriminator_id` 后，
/// 即获得创建、枚举、启用和停用自身调度条目的能力。
/// 所有默认方法都委托给调度条目仓库。
#[async_trait]
pub trait ScheduleOwner: Send + Sync {
    /// 所有者类型标签，须与注册表中登记的名称一致
    fn discriminator(&self) -> &'static str;

    /// 所有者主键值
    fn discriminator_id(&self) -> i64;

    /// 组合成关联查询用的身份
    fn owner_identity(&self) -> OwnerIdentity {
        OwnerIdentity::new(self.discriminator(), self.discriminator_id())
    }

    /// 枚举本所有者的全部调度条目，不过滤属性标签
    async fn schedule_tasks(
        &self,
        repo: &dyn ScheduleTaskRepository,
    ) -> Result<Vec<ScheduleEntry>, RepositoryError> {
        repo.find_by_owner(&self.owner_identity(), None).await
    }

    /// 创建调度条目并挂接一条本所有者的关联，独立事务内提交
    async fn create_schedule_tasks(
        &self,
        repo: &dyn ScheduleTaskRepository,
        draft: NewScheduleEntry,
        attribute: &str,
        description: Option<String>,
    ) -> Result<ScheduleEntry, RepositoryError> {
        repo.create_for_owner(&self.owner_identity(), draft, attribute, description)
            .await
    }

    /// 在调用方持有的事务内创建，调用方负责提交边界
    async fn create_schedule_tasks_in(
        &self,
        repo: &dyn ScheduleTaskRepository,
        txn: &DatabaseTransaction,
        draft: NewScheduleEntry,
        attribute: &str,
        description: Option<String>,
    ) -> Result<ScheduleEntry, RepositoryError> {
        repo.create_for_owner_in(txn, &self.owner_identity(), draft, attribute, description)
            .await
    }

    /// 枚举本所有者的调度条目，可按属性标签精确过滤
    async fn get_schedule_tasks(
        &self,
        repo: &dyn ScheduleTaskRepository,
        attribute: Option<&str>,
    ) -> Result<Vec<ScheduleEntry>, RepositoryError> {
        repo.find_by_owner(&self.owner_identity(), attribute).await
    }

    /// 启用匹配的调度条目，返回受影响的列表，不触碰关联
    async fn enable_task(
        &self,
        repo: &dyn ScheduleTaskRepository,
        attribute: Option<&str>,
    ) -> Result<Vec<ScheduleEntry>, RepositoryError> {
        repo.enable_for_owner(&self.owner_identity(), attribute).await
    }

    /// 停用匹配的调度条目，并逐条解除本所有者的一条关联
    async fn disable_task(
        &self,
        repo: &dyn ScheduleTaskRepository,
        attribute: Option<&str>,
    ) -> Result<Vec<ScheduleEntry>, RepositoryError> {
        repo.disable_for_owner(&self.owner_identity(), attribute).await
    }
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::Duration;

use crate::domain::models::recurrence::{CrontabRule, CrontabSpec, IntervalRule, RecurrencePeriod};
use crate::domain::repositories::schedule_task_repository::RepositoryError;

/// 周期规则仓库特质
///
/// 周期规则是不可变的值对象，"创建"一律实现为查找或创建：
/// 完全相同的定义字段复用既有行，避免功能等价的行无限增长。
#[async_trait]
pub trait RecurrenceRepository: Send + Sync {
    /// 解析间隔型规则
    ///
    /// 输入间隔先换算为秒数并在零处截断（零或负间隔归一为 0），
    /// `period` 未指定时默认为秒。随后按 (every, period) 查找或创建。
    async fn resolve_interval(
        &self,
        run_every: Duration,
        period: Option<RecurrencePeriod>,
    ) -> Result<IntervalRule, RepositoryError>;

    /// 解析 crontab 型规则
    ///
    /// 五个模式字段逐字匹配，不做规范化。
    async fn resolve_crontab(&self, spec: CrontabSpec) -> Result<CrontabRule, RepositoryError>;
}

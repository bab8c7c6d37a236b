// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};
use std::fmt;
use validator::Validate;

use crate::domain::models::recurrence::{
    CrontabRule, IntervalRule, Recurrence, RecurrenceError, RecurrenceSpec,
};

/// 调度条目实体
///
/// 表示一个可调度的工作单元：引用至多一条周期规则，携带调用参数、
/// 路由元数据和运行状态。条目本身不感知所有者，所有权通过关联表表达。
#[derive(Debug, Clone)]
pub struct ScheduleEntry {
    /// 条目主键
    pub id: i32,
    /// 条目名称
    pub name: String,
    /// 待执行工作的不透明标识
    pub task: String,
    /// 间隔型规则，解析时优先于 crontab
    pub interval: Option<IntervalRule>,
    /// crontab 型规则
    pub crontab: Option<CrontabRule>,
    /// 位置参数的序列化文本
    pub arguments: String,
    /// 关键字参数的序列化文本
    pub keyword_arguments: String,
    /// 目标队列
    pub queue: Option<String>,
    /// 交换机
    pub exchange: Option<String>,
    /// 路由键
    pub routing_key: Option<String>,
    /// 过期时间，错过的触发在此之后被丢弃而非重试
    pub expires: Option<DateTime<FixedOffset>>,
    /// 是否启用
    pub enabled: bool,
    /// 最近一次执行时间
    pub last_run_at: Option<DateTime<FixedOffset>>,
    /// 累计执行次数
    pub total_run_count: i32,
    /// 最后修改时间，由存储层在每次写入时强制刷新
    pub date_changed: DateTime<FixedOffset>,
}

impl ScheduleEntry {
    /// 解码位置参数
    ///
    /// 序列化文本损坏时返回错误，调用方必须将其视为数据完整性故障。
    pub fn args(&self) -> Result<Vec<Value>, serde_json::Error> {
        serde_json::from_str(&self.arguments)
    }

    /// 解码关键字参数
    pub fn kwargs(&self) -> Result<Map<String, Value>, serde_json::Error> {
        serde_json::from_str(&self.keyword_arguments)
    }

    /// 解析条目的周期描述
    ///
    /// 间隔规则优先；两者都未设置时返回 `None`，执行引擎应跳过该条目。
    pub fn schedule(&self) -> Result<Option<Recurrence>, RecurrenceError> {
        if let Some(interval) = &self.interval {
            return Ok(Some(interval.recurrence()));
        }
        if let Some(crontab) = &self.crontab {
            return Ok(Some(crontab.recurrence()?));
        }
        Ok(None)
    }
}

impl fmt::Display for ScheduleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[ScheduleEntry] {{ \n    id: {} \n    name: {} \n    task: {} \n    date_changed: {} \n}}",
            self.id, self.name, self.task, self.date_changed
        )
    }
}

/// 调度条目创建草稿
///
/// 经 `ScheduleOwner::create_schedule_tasks` 落库；周期说明由仓库层
/// 查重后转换为规则行外键。
#[derive(Debug, Clone, Validate)]
pub struct NewScheduleEntry {
    /// 条目名称
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// 待执行工作的标识
    #[validate(length(min = 1, max = 255))]
    pub task: String,
    /// 周期说明
    pub rule: RecurrenceSpec,
    /// 位置参数
    pub args: Vec<Value>,
    /// 关键字参数
    pub kwargs: Map<String, Value>,
    /// 目标队列
    pub queue: Option<String>,
    /// 交换机
    pub exchange: Option<String>,
    /// 路由键
    pub routing_key: Option<String>,
    /// 过期时间
    pub expires: Option<DateTime<FixedOffset>>,
}

impl NewScheduleEntry {
    /// 创建最小草稿，参数与路由元数据留空
    pub fn new(name: impl Into<String>, task: impl Into<String>, rule: RecurrenceSpec) -> Self {
        Self {
            name: name.into(),
            task: task.into(),
            rule,
            args: Vec::new(),
            kwargs: Map::new(),
            queue: None,
            exchange: None,
            routing_key: None,
            expires: None,
        }
    }

    /// 编码位置参数，写入与读取必须精确往返
    pub fn encoded_args(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.args)
    }

    /// 编码关键字参数
    pub fn encoded_kwargs(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.kwargs)
    }
}

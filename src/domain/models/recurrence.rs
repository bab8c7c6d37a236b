// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::Duration;
use cron::Schedule as CronSchedule;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 周期单位枚举
///
/// 定义间隔型调度规则支持的时间单位。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecurrencePeriod {
    /// 天
    Days,
    /// 小时
    Hours,
    /// 分钟
    Minutes,
    /// 秒
    #[default]
    Seconds,
    /// 微秒
    Microseconds,
}

impl fmt::Display for RecurrencePeriod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RecurrencePeriod::Days => write!(f, "days"),
            RecurrencePeriod::Hours => write!(f, "hours"),
            RecurrencePeriod::Minutes => write!(f, "minutes"),
            RecurrencePeriod::Seconds => write!(f, "seconds"),
            RecurrencePeriod::Microseconds => write!(f, "microseconds"),
        }
    }
}

impl FromStr for RecurrencePeriod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "days" => Ok(RecurrencePeriod::Days),
            "hours" => Ok(RecurrencePeriod::Hours),
            "minutes" => Ok(RecurrencePeriod::Minutes),
            "seconds" => Ok(RecurrencePeriod::Seconds),
            "microseconds" => Ok(RecurrencePeriod::Microseconds),
            _ => Err(()),
        }
    }
}

/// 间隔型调度规则
///
/// 表示"每 every 个 period 执行一次"的固定周期，已持久化且去重。
/// 同一组 (every, period) 在存储中只保留一行。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalRule {
    /// 规则行主键
    pub id: i32,
    /// 周期数量
    pub every: i64,
    /// 周期单位
    pub period: RecurrencePeriod,
}

impl IntervalRule {
    /// 将规则换算为时间间隔
    pub fn run_every(&self) -> Duration {
        match self.period {
            RecurrencePeriod::Days => Duration::days(self.every),
            RecurrencePeriod::Hours => Duration::hours(self.every),
            RecurrencePeriod::Minutes => Duration::minutes(self.every),
            RecurrencePeriod::Seconds => Duration::seconds(self.every),
            RecurrencePeriod::Microseconds => Duration::microseconds(self.every),
        }
    }

    /// 生成执行引擎消费的周期描述
    pub fn recurrence(&self) -> Recurrence {
        Recurrence::Interval(self.run_every())
    }
}

/// crontab 模式字段组
///
/// 五个字段均为 crontab 模式串，默认全部为 `"*"`。
/// 字段值在查重时逐字比较，不做任何规范化。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrontabSpec {
    /// 分钟模式
    pub minute: String,
    /// 小时模式
    pub hour: String,
    /// 星期模式
    pub day_of_week: String,
    /// 日期模式
    pub day_of_month: String,
    /// 月份模式
    pub month_of_year: String,
}

impl Default for CrontabSpec {
    fn default() -> Self {
        Self {
            minute: "*".to_string(),
            hour: "*".to_string(),
            day_of_week: "*".to_string(),
            day_of_month: "*".to_string(),
            month_of_year: "*".to_string(),
        }
    }
}

impl CrontabSpec {
    /// 拼接成 cron 库可解析的六字段表达式
    ///
    /// cron 库的字段顺序为：秒 分 时 日 月 星期，秒位固定为 0。
    pub fn cron_expression(&self) -> String {
        format!(
            "0 {} {} {} {} {}",
            self.minute, self.hour, self.day_of_month, self.month_of_year, self.day_of_week
        )
    }
}

/// crontab 型调度规则
///
/// 已持久化且去重的 crontab 周期，同一组五字段在存储中只保留一行。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrontabRule {
    /// 规则行主键
    pub id: i32,
    /// 五字段模式组
    pub spec: CrontabSpec,
}

impl CrontabRule {
    /// 生成执行引擎消费的周期描述
    ///
    /// 模式串非法时返回错误，由读取方处理。
    pub fn recurrence(&self) -> Result<Recurrence, RecurrenceError> {
        let schedule = CronSchedule::from_str(&self.spec.cron_expression())?;
        Ok(Recurrence::Crontab(schedule))
    }
}

/// 周期描述
///
/// 执行引擎据此计算下一次触发时间；本子系统只负责产出该形状。
#[derive(Debug, Clone)]
pub enum Recurrence {
    /// 固定间隔
    Interval(Duration),
    /// crontab 表达式
    Crontab(CronSchedule),
}

/// 创建侧的周期说明
///
/// 由调用方在创建调度条目时提供，仓库层负责查重并落库。
#[derive(Debug, Clone)]
pub enum RecurrenceSpec {
    /// 固定间隔：间隔会被规范化为秒数并在零处截断，
    /// period 未指定时默认为秒
    Interval {
        run_every: Duration,
        period: Option<RecurrencePeriod>,
    },
    /// crontab 模式组，逐字匹配
    Crontab(CrontabSpec),
}

/// 周期解析错误类型
#[derive(Error, Debug)]
pub enum RecurrenceError {
    /// crontab 模式串无法解析
    #[error("Invalid crontab expression: {0}")]
    Crontab(#[from] cron::error::Error),
}

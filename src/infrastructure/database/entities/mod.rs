// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 数据库实体模块
///
/// 定义数据库表对应的实体结构
/// 使用SeaORM框架进行对象关系映射
/// 包含周期规则、调度条目与所有者关联四张表的实体
pub mod crontab_schedule;
pub mod interval_schedule;
pub mod schedule_entry;
pub mod schedule_task_association;

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 周期规则（recurrence）：间隔型与 crontab 型的去重周期定义
/// - 调度条目（schedule_entry）：绑定周期规则的可调度工作单元
/// - 所有者（owner）：所有者身份、关联记录与调度所有者能力特质
///
/// 这些模型构成了系统的数据基础，定义了业务概念的
/// 结构和行为，是领域驱动设计的核心组成部分。
pub mod owner;
pub mod recurrence;
pub mod schedule_entry;

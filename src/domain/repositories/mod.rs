// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 定义数据持久化的抽象接口
/// 周期规则仓库负责查找或创建式的去重解析
/// 调度条目仓库负责条目与所有者关联的全部读写
pub mod recurrence_repository;
pub mod schedule_task_repository;

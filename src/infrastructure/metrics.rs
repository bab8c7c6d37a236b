// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use tracing::info;

/// 预注册核心计数指标
///
/// 指标通过全局 recorder 导出，未安装 recorder 时计数调用是空操作。
pub fn init_metrics() {
    metrics::describe_counter!(
        "schedrs_recurrence_resolutions_total",
        "Total lookup-or-create resolutions of recurrence rules"
    );
    metrics::describe_counter!(
        "schedrs_recurrence_repairs_total",
        "Duplicate recurrence rows swept and recreated"
    );
    metrics::describe_counter!(
        "schedrs_schedule_entries_created_total",
        "Schedule entries created through owner associations"
    );

    info!("Metrics registered");
}

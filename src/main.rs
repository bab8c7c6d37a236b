// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use migration::{Migrator, MigratorTrait};
use schedrs::config::settings::Settings;
use schedrs::domain::repositories::schedule_task_repository::ScheduleTaskRepository;
use schedrs::infrastructure::database::connection;
use schedrs::infrastructure::repositories::schedule_task_repo_impl::ScheduleTaskRepositoryImpl;
use schedrs::utils::telemetry;
use std::sync::Arc;
use tracing::{info, warn};

/// 主函数
///
/// 运维入口：应用迁移后打印执行引擎将看到的启用条目。
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting schedrs...");

    schedrs::infrastructure::metrics::init_metrics();

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    // 3. Connect to database
    let db = Arc::new(connection::create_pool(&settings.database).await?);
    info!("Database connection established");

    // Run database migrations
    info!("Running database migrations...");
    Migrator::up(db.as_ref(), None).await?;
    info!("Database migrations applied");

    // 4. Dump the enabled schedule entries
    let repo = ScheduleTaskRepositoryImpl::new(db.clone());
    let entries = repo.find_enabled().await?;
    info!(count = entries.len(), "Enabled schedule entries");

    for entry in &entries {
        match entry.schedule() {
            Ok(Some(recurrence)) => {
                info!(entry_id = entry.id, name = %entry.name, task = %entry.task, recurrence = ?recurrence, "entry")
            }
            Ok(None) => {
                // find_enabled 只返回设置了规则外键的条目
                warn!(entry_id = entry.id, "entry has no resolvable schedule")
            }
            Err(e) => warn!(entry_id = entry.id, "bad crontab pattern: {}", e),
        }
    }

    Ok(())
}

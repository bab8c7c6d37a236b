use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Owner lookups always filter on (discriminator, discriminator_id)
        manager
            .create_index(
                Index::create()
                    .name("idx_associations_owner")
                    .table(ScheduleTaskAssociations::Table)
                    .col(ScheduleTaskAssociations::Discriminator)
                    .col(ScheduleTaskAssociations::DiscriminatorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_associations_task_id")
                    .table(ScheduleTaskAssociations::Table)
                    .col(ScheduleTaskAssociations::TaskId)
                    .to_owned(),
            )
            .await?;

        // The execution engine enumerates enabled entries on every beat
        manager
            .create_index(
                Index::create()
                    .name("idx_schedule_entries_enabled")
                    .table(ScheduleEntries::Table)
                    .col(ScheduleEntries::Enabled)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_interval_schedules_every_period")
                    .table(IntervalSchedules::Table)
                    .col(IntervalSchedules::Every)
                    .col(IntervalSchedules::Period)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_associations_owner")
                    .table(ScheduleTaskAssociations::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_associations_task_id")
                    .table(ScheduleTaskAssociations::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_schedule_entries_enabled")
                    .table(ScheduleEntries::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_interval_schedules_every_period")
                    .table(IntervalSchedules::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum IntervalSchedules {
    Table,
    Every,
    Period,
}

#[derive(DeriveIden)]
enum ScheduleEntries {
    Table,
    Enabled,
}

#[derive(DeriveIden)]
enum ScheduleTaskAssociations {
    Table,
    TaskId,
    Discriminator,
    DiscriminatorId,
}

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create interval_schedules table
        manager
            .create_table(
                Table::create()
                    .table(IntervalSchedules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IntervalSchedules::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(IntervalSchedules::Every)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(IntervalSchedules::Period).string().not_null())
                    .to_owned(),
            )
            .await?;

        // Create crontab_schedules table
        manager
            .create_table(
                Table::create()
                    .table(CrontabSchedules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CrontabSchedules::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CrontabSchedules::Minute)
                            .string()
                            .not_null()
                            .default("*"),
                    )
                    .col(
                        ColumnDef::new(CrontabSchedules::Hour)
                            .string()
                            .not_null()
                            .default("*"),
                    )
                    .col(
                        ColumnDef::new(CrontabSchedules::DayOfWeek)
                            .string()
                            .not_null()
                            .default("*"),
                    )
                    .col(
                        ColumnDef::new(CrontabSchedules::DayOfMonth)
                            .string()
                            .not_null()
                            .default("*"),
                    )
                    .col(
                        ColumnDef::new(CrontabSchedules::MonthOfYear)
                            .string()
                            .not_null()
                            .default("*"),
                    )
                    .to_owned(),
            )
            .await?;

        // Create schedule_entries table
        manager
            .create_table(
                Table::create()
                    .table(ScheduleEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ScheduleEntries::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ScheduleEntries::Name).string().not_null())
                    .col(ColumnDef::new(ScheduleEntries::Task).string().not_null())
                    .col(ColumnDef::new(ScheduleEntries::IntervalId).integer())
                    .col(ColumnDef::new(ScheduleEntries::CrontabId).integer())
                    .col(
                        ColumnDef::new(ScheduleEntries::Arguments)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(ScheduleEntries::KeywordArguments)
                            .text()
                            .not_null()
                            .default("{}"),
                    )
                    .col(ColumnDef::new(ScheduleEntries::Queue).string())
                    .col(ColumnDef::new(ScheduleEntries::Exchange).string())
                    .col(ColumnDef::new(ScheduleEntries::RoutingKey).string())
                    .col(ColumnDef::new(ScheduleEntries::Expires).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(ScheduleEntries::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(ScheduleEntries::LastRunAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(ScheduleEntries::TotalRunCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ScheduleEntries::DateChanged)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_schedule_entries_interval_id")
                            .from(ScheduleEntries::Table, ScheduleEntries::IntervalId)
                            .to(IntervalSchedules::Table, IntervalSchedules::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_schedule_entries_crontab_id")
                            .from(ScheduleEntries::Table, ScheduleEntries::CrontabId)
                            .to(CrontabSchedules::Table, CrontabSchedules::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create schedule_task_associations table
        manager
            .create_table(
                Table::create()
                    .table(ScheduleTaskAssociations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ScheduleTaskAssociations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ScheduleTaskAssociations::TaskId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ScheduleTaskAssociations::Discriminator)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ScheduleTaskAssociations::DiscriminatorId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ScheduleTaskAssociations::Attribute)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(ScheduleTaskAssociations::Description).text())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_schedule_task_associations_task_id")
                            .from(
                                ScheduleTaskAssociations::Table,
                                ScheduleTaskAssociations::TaskId,
                            )
                            .to(ScheduleEntries::Table, ScheduleEntries::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ScheduleTaskAssociations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ScheduleEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CrontabSchedules::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(IntervalSchedules::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum IntervalSchedules {
    Table,
    Id,
    Every,
    Period,
}

#[derive(DeriveIden)]
enum CrontabSchedules {
    Table,
    Id,
    Minute,
    Hour,
    DayOfWeek,
    DayOfMonth,
    MonthOfYear,
}

#[derive(DeriveIden)]
enum ScheduleEntries {
    Table,
    Id,
    Name,
    Task,
    IntervalId,
    CrontabId,
    Arguments,
    KeywordArguments,
    Queue,
    Exchange,
    RoutingKey,
    Expires,
    Enabled,
    LastRunAt,
    TotalRunCount,
    DateChanged,
}

#[derive(DeriveIden)]
enum ScheduleTaskAssociations {
    Table,
    Id,
    TaskId,
    Discriminator,
    DiscriminatorId,
    Attribute,
    Description,
}
